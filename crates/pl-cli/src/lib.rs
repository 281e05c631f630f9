//! Play log CLI library.
//!
//! This crate provides the CLI interface for the play log viewer.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
