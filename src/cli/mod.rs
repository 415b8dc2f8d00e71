//! CLI module
//!
//! Command-line interface for running a single query.
//!
//! # Commands
//!
//! - `popular` - Currently most popular videos
//! - `search` - Search, optionally restricted to related videos
//! - `videos` - Look up videos by id

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
