//! CLI subcommand implementations.

pub mod sessions;
pub mod stats;
pub mod status;
pub mod titles;
pub mod util;
