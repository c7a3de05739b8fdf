//! CLI error types and conversions

use crate::client::ClientError;
use crate::downloader::DownloadError;
use crate::output::OutputError;
use crate::params::ParamsError;
use crate::planner::PlannerError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Client error
    #[error("client error: {0}")]
    ClientError(#[from] ClientError),

    /// Download error
    #[error("download error: {0}")]
    DownloadError(#[from] DownloadError),

    /// Planner error
    #[error("planner error: {0}")]
    PlannerError(#[from] PlannerError),

    /// Parameter parsing error
    #[error("parameter error: {0}")]
    ParamsError(#[from] ParamsError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}
