//! Segment planners
//!
//! A segment is one independently executable sub-query: an offset/limit
//! page, a calendar date range, or the whole query unmodified. Planners are
//! pure functions from inputs to an ordered, finite segment sequence; they
//! perform no I/O and make no decision about termination under pagination
//! (that belongs to the executor, which sees the returned row counts).

use chrono::NaiveDate;

use crate::QueryRequest;

pub mod pagination;
pub mod period;

pub use pagination::page_segments;
pub use period::{period_segments, PeriodUnit};

/// Date format used for period parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Planner errors
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Date string does not match the expected format
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input
        input: String,
    },

    /// Unknown period unit
    #[error("invalid period unit: {0}. Valid options: day, week, month, quarter, year")]
    InvalidUnit(String),

    /// Period multiple below the allowed minimum
    #[error("period multiple must be at least 1, got {0}")]
    InvalidMultiple(u32),
}

/// One independently executable sub-query.
///
/// Segments form a totally ordered sequence; the executor uses the planner
/// index to keep merged output in segment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// The unmodified base request (degenerate single-shot mode)
    Whole,
    /// An offset/limit page
    Page {
        /// Row offset of this page
        offset_rows: u64,
        /// Maximum rows requested for this page
        limit_rows: u64,
    },
    /// An inclusive calendar date range
    Period {
        /// First day covered by this segment
        start_date: NaiveDate,
        /// Last day covered by this segment
        end_date: NaiveDate,
    },
}

impl Segment {
    /// Derive the per-segment request by injecting this segment's
    /// parameters into a copy of the base request.
    pub fn apply(&self, base: &QueryRequest) -> QueryRequest {
        let mut request = base.clone();
        match self {
            Segment::Whole => {}
            Segment::Page {
                offset_rows,
                limit_rows,
            } => {
                request
                    .parameters
                    .insert("offset_rows".to_string(), offset_rows.to_string());
                request
                    .parameters
                    .insert("limit_rows".to_string(), limit_rows.to_string());
            }
            Segment::Period {
                start_date,
                end_date,
            } => {
                request.parameters.insert(
                    "start_date".to_string(),
                    start_date.format(DATE_FORMAT).to_string(),
                );
                request.parameters.insert(
                    "end_date".to_string(),
                    end_date.format(DATE_FORMAT).to_string(),
                );
            }
        }
        request
    }

    /// Short human-readable label for progress display.
    pub fn label(&self) -> String {
        match self {
            Segment::Whole => "full query".to_string(),
            Segment::Page {
                offset_rows,
                limit_rows,
            } => format!("rows {}..{}", offset_rows, offset_rows + limit_rows),
            Segment::Period {
                start_date,
                end_date,
            } => format!(
                "{}..{}",
                start_date.format(DATE_FORMAT),
                end_date.format(DATE_FORMAT)
            ),
        }
    }
}
