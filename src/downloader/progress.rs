//! Progress reporting for segmented downloads.
//!
//! The executor emits lifecycle events as segments start and complete; a
//! [`ProgressReporter`] renders them. Reporting is purely observational:
//! implementations must never fail or block the pipeline, and the null
//! reporter drops everything.

use std::time::Duration;
use tracing::info;

/// One progress observation.
///
/// Transient; consumed by the reporter and discarded.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Zero-based index of the segment this event concerns
    pub segment_index: usize,
    /// Number of planned segments
    pub total_segments: usize,
    /// Rows merged into the final result so far
    pub rows_so_far: u64,
    /// Time elapsed since the operation started
    pub elapsed: Duration,
    /// Human-readable segment label (page range or date range)
    pub label: String,
    /// Estimated remaining time, when computable
    pub eta: Option<Duration>,
}

/// Receives lifecycle events from the executor.
///
/// All methods default to no-ops so implementations only override what
/// they render.
pub trait ProgressReporter: Send + Sync {
    /// A segment's job has been dispatched.
    fn segment_started(&self, _event: &ProgressEvent) {}

    /// A segment's rows have been merged into the result.
    fn segment_completed(&self, _event: &ProgressEvent) {}

    /// The whole operation finished successfully.
    fn finished(&self, _total_rows: u64, _elapsed: Duration) {}
}

/// Reporter that drops all events, disabling display.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {}

/// Reporter that logs progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn segment_started(&self, event: &ProgressEvent) {
        info!(
            segment = event.segment_index + 1,
            total = event.total_segments,
            label = %event.label,
            "Segment started"
        );
    }

    fn segment_completed(&self, event: &ProgressEvent) {
        match event.eta {
            Some(eta) => info!(
                segment = event.segment_index + 1,
                total = event.total_segments,
                rows = event.rows_so_far,
                label = %event.label,
                eta = %format_duration(eta),
                "Segment completed"
            ),
            None => info!(
                segment = event.segment_index + 1,
                total = event.total_segments,
                rows = event.rows_so_far,
                label = %event.label,
                "Segment completed"
            ),
        }
    }

    fn finished(&self, total_rows: u64, elapsed: Duration) {
        info!(
            rows = total_rows,
            elapsed = %format_duration(elapsed),
            "Download finished"
        );
    }
}

/// Estimate remaining time from the completed-segment fraction.
///
/// Extrapolates total duration as `elapsed / fraction` and returns what is
/// left of it. Unavailable until at least one segment completed.
pub fn estimate_remaining(
    elapsed: Duration,
    completed_segments: usize,
    total_segments: usize,
) -> Option<Duration> {
    if completed_segments == 0 || total_segments == 0 {
        return None;
    }
    if completed_segments >= total_segments {
        return Some(Duration::ZERO);
    }

    let fraction = completed_segments as f64 / total_segments as f64;
    let total_secs = elapsed.as_secs_f64() / fraction;
    let remaining = (total_secs - elapsed.as_secs_f64()).max(0.0);
    Some(Duration::from_secs_f64(remaining))
}

/// Human-readable duration for logging.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}h", secs as f64 / 3600.0)
    }
}
