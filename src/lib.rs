//! # Query Data Downloader Library
//!
//! A library for downloading tabular results from an asynchronous
//! query-execution service. Queries are submitted over HTTP, tracked as
//! server-side jobs until they complete, and their result sets are fetched
//! and merged into a single table suitable for CSV export.
//!
//! ## Features
//!
//! - **Async Job Protocol**: Handles both immediately cached results and
//!   submit/poll/fetch job execution transparently
//! - **Segmented Extraction**: Split one large extraction into offset/limit
//!   pages or calendar date periods
//! - **Bounded Concurrency**: Run up to 5 segments in flight while always
//!   merging results in segment order
//! - **Progress Reporting**: Pluggable reporter with cumulative row counts
//!   and remaining-time estimates
//! - **CSV Output**: Buffered writer with proper field escaping
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use query_data_downloader::client::HttpTransport;
//! use query_data_downloader::downloader::QueryExecutor;
//! use query_data_downloader::QueryRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("https://reports.example.com/api", "secret-key")?;
//! let executor = QueryExecutor::new(Arc::new(transport)).with_concurrency(3);
//!
//! let request = QueryRequest::new(42);
//! let table = executor.execute_paginated(&request, 10_000, 500).await?;
//! println!("{} rows", table.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several core modules:
//!
//! - [`client`] - Transport seam, job state machine, and response parsing
//! - [`planner`] - Pure segment planners (pagination and calendar periods)
//! - [`downloader`] - Orchestration: bounded concurrency, ordered merge,
//!   progress reporting
//! - [`params`] - Caller-supplied JSON parameter parsing
//! - [`output`] - Result table output writers (CSV)
//! - [`cli`] - Command implementations for the binary

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transport seam, job state machine, and response parsing
pub mod client;

/// CLI command implementations
pub mod cli;

/// Download orchestration
pub mod downloader;

/// Result table output writers
pub mod output;

/// Query parameter parsing
pub mod params;

/// Segment planners
pub mod planner;

// Re-export commonly used types
pub use downloader::QueryExecutor;
pub use planner::Segment;

/// One query execution request against the remote service.
///
/// Immutable once constructed; planners derive per-segment requests by
/// cloning and injecting extra parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Numeric id of the saved query on the remote service
    pub query_id: i64,
    /// Query parameters, already normalized to string key/value pairs
    pub parameters: BTreeMap<String, String>,
    /// Cache-freshness hint in seconds; 0 forces a fresh execution
    pub max_age: u64,
}

impl QueryRequest {
    /// Create a request for a query with no parameters and `max_age = 0`.
    pub fn new(query_id: i64) -> Self {
        Self {
            query_id,
            parameters: BTreeMap::new(),
            max_age: 0,
        }
    }

    /// Create a request with explicit parameters.
    pub fn with_parameters(query_id: i64, parameters: BTreeMap<String, String>) -> Self {
        Self {
            query_id,
            parameters,
            max_age: 0,
        }
    }

    /// Set the cache-freshness hint.
    pub fn with_max_age(mut self, max_age: u64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Validate request parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.query_id <= 0 {
            return Err(format!("Query id must be positive, got {}", self.query_id));
        }
        Ok(())
    }
}

/// A materialized tabular result.
///
/// Rows hold string-rendered scalars only; once `headers` is non-empty every
/// row has the same length as `headers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Ordered column names; may be empty before any data is observed
    pub headers: Vec<String>,
    /// Data rows in original order, one cell per header
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Number of data rows (headers excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds neither headers nor rows.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_defaults() {
        let request = QueryRequest::new(42);
        assert_eq!(request.query_id, 42);
        assert!(request.parameters.is_empty());
        assert_eq!(request.max_age, 0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_query_request_validation() {
        assert!(QueryRequest::new(0).validate().is_err());
        assert!(QueryRequest::new(-7).validate().is_err());
        assert!(QueryRequest::new(1).validate().is_ok());
    }

    #[test]
    fn test_result_table_empty() {
        let table = ResultTable::default();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);

        let table = ResultTable {
            headers: vec!["id".to_string()],
            rows: vec![],
        };
        assert!(!table.is_empty());
        assert_eq!(table.row_count(), 0);
    }
}
