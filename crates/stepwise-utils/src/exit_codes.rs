//! Exit code constants for the stepwise CLI.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Every task completed or was skipped |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `PIPELINE_INVALID` | Pipeline file missing or malformed |
//! | 4 | `TASK_FAILED` | A task reported failure |

/// Exit codes matching the documented exit code table.
///
/// ```rust
/// use stepwise_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::TASK_FAILED.as_i32(), 4);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - every task completed or was skipped
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Pipeline file could not be loaded or failed validation
    pub const PIPELINE_INVALID: ExitCode = ExitCode(3);

    /// A task reported failure and aborted the run
    pub const TASK_FAILED: ExitCode = ExitCode(4);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::PIPELINE_INVALID.as_i32(), 3);
        assert_eq!(ExitCode::TASK_FAILED.as_i32(), 4);
        assert_eq!(i32::from(ExitCode::TASK_FAILED), 4);
    }
}
