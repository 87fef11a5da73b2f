//! Configuration management for stepwise
//!
//! Hierarchical configuration with discovery and precedence: CLI > file > defaults.
//! Configuration files are TOML with `[display]` and `[pipeline]` sections.

mod config;

pub use config::*;
