//! CLI command implementations

pub mod credentials;
pub mod download;
pub mod error;
pub mod progress;

pub use download::{Cli, Commands};
pub use error::CliError;
