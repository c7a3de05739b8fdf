//! Download orchestration
//!
//! This module provides the orchestration engine that turns a planned
//! segment sequence into one merged result table.
//!
//! # Overview
//!
//! 1. **Planning**: a [`crate::planner`] produces the ordered segments
//! 2. **Dispatch**: [`executor::QueryExecutor`] runs one job state machine
//!    per segment under a bounded concurrency cap
//! 3. **Merge**: [`assembler::TableAssembler`] appends per-segment tables in
//!    segment order, whatever the completion order
//! 4. **Progress**: [`progress::ProgressReporter`] observes segment starts,
//!    completions, and the terminal summary
//!
//! # Error Handling
//!
//! Any segment error aborts the whole operation (fail-fast): no further
//! segments are dispatched, in-flight work is dropped, and the first error
//! in segment order is surfaced. There are no automatic retries; polling a
//! pending job is the protocol's waiting mechanism, not a retry.

pub mod assembler;
pub mod config;
pub mod executor;
pub mod progress;

pub use assembler::TableAssembler;
pub use executor::QueryExecutor;
pub use progress::{NullProgress, ProgressEvent, ProgressReporter, TracingProgress};

use crate::client::ClientError;
use crate::planner::PlannerError;

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Error from the query client
    #[error("client error: {0}")]
    ClientError(#[from] ClientError),

    /// Invalid decomposition input, detected before any network call
    #[error("invalid input: {0}")]
    InvalidInput(#[from] PlannerError),
}
