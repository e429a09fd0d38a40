//! CLI layer for `LLMPress`.
//!
//! Provides the command-line interface using clap, with `compress` and
//! `decompress` subcommands.

pub mod commands;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands};
