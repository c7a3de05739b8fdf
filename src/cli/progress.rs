//! Terminal progress bar reporter

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::downloader::progress::{format_duration, ProgressEvent, ProgressReporter};

/// Progress reporter rendering an indicatif bar.
///
/// The bar length is learned from the first event, so one reporter works
/// for any segment count. Completion events arrive in segment order, which
/// makes `segment_index + 1` the completed count.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Create a bar reporter; the bar stays empty until the first event.
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments {msg}")
                .expect("hardcoded template is valid")
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    /// Finish and clear the bar; call before printing results to stdout.
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn segment_started(&self, event: &ProgressEvent) {
        if self.bar.length() != Some(event.total_segments as u64) {
            self.bar.set_length(event.total_segments as u64);
        }
        self.bar.set_message(event.label.clone());
    }

    fn segment_completed(&self, event: &ProgressEvent) {
        if self.bar.length() != Some(event.total_segments as u64) {
            self.bar.set_length(event.total_segments as u64);
        }
        self.bar.set_position(event.segment_index as u64 + 1);

        let mut message = format!("{} rows", event.rows_so_far);
        if let Some(eta) = event.eta {
            message.push_str(&format!(", ~{} left", format_duration(eta)));
        }
        self.bar.set_message(message);
    }

    fn finished(&self, total_rows: u64, elapsed: Duration) {
        self.bar.finish_with_message(format!(
            "{total_rows} rows in {}",
            format_duration(elapsed)
        ));
    }
}
