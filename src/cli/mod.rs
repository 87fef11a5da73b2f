//! Command-line interface for stepwise
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point, configuration discovery and command dispatch
//! - `commands`: command implementations
//! - `tests`: test module (cfg(test) only)

pub mod args;
mod commands;
mod run;


pub use args::{Cli, Commands, build_cli};
pub use run::run;
