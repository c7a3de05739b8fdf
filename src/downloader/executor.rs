//! Query executor: bounded-concurrency segment dispatch with ordered merge.

use futures_util::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::client::{ClientError, QueryJob, Transport};
use crate::downloader::assembler::TableAssembler;
use crate::downloader::config::{
    DEFAULT_CONCURRENCY, DEFAULT_QUERY_TIMEOUT, MAX_CONCURRENCY, POLL_INTERVAL,
};
use crate::downloader::progress::{
    estimate_remaining, NullProgress, ProgressEvent, ProgressReporter,
};
use crate::downloader::DownloadError;
use crate::planner::{page_segments, period_segments, PeriodUnit, Segment};
use crate::{QueryRequest, ResultTable};

/// Executes queries against the remote service, optionally decomposed into
/// segments run under a bounded concurrency cap.
///
/// Results are always merged in segment order: the executor pulls an ordered
/// buffered stream, so completion order never leaks into the output even
/// when several segments are in flight. With a concurrency of 1 execution is
/// strictly sequential.
pub struct QueryExecutor {
    transport: Arc<dyn Transport>,
    concurrency: usize,
    poll_interval: Duration,
    query_timeout: Duration,
    reporter: Arc<dyn ProgressReporter>,
}

impl QueryExecutor {
    /// Create an executor with sequential execution and no progress display.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            concurrency: DEFAULT_CONCURRENCY,
            poll_interval: POLL_INTERVAL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            reporter: Arc::new(NullProgress),
        }
    }

    /// Set the number of segments in flight.
    ///
    /// Values above the hard ceiling of 5 are clamped with a logged
    /// warning; zero is raised to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = if concurrency > MAX_CONCURRENCY {
            warn!(
                requested = concurrency,
                effective = MAX_CONCURRENCY,
                "Concurrency above ceiling, clamping"
            );
            MAX_CONCURRENCY
        } else {
            concurrency.max(1)
        };
        self
    }

    /// Override the per-segment polling interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Override the per-segment deadline, measured from that segment's
    /// submission.
    pub fn with_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// Attach a progress reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Effective concurrency after clamping.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Execute the request as a single direct query.
    pub async fn execute(&self, request: &QueryRequest) -> Result<ResultTable, DownloadError> {
        let table = self.run_job(request).await?;
        Ok(table)
    }

    /// Execute the request split into offset/limit pages.
    ///
    /// Pages are scheduled until one returns fewer rows than `limit` (the
    /// data set is exhausted) or `max_pages` is reached. A non-positive
    /// `limit` degrades to a single direct query.
    pub async fn execute_paginated(
        &self,
        request: &QueryRequest,
        limit: i64,
        max_pages: usize,
    ) -> Result<ResultTable, DownloadError> {
        if limit <= 0 {
            debug!(limit, "Non-positive page limit, running direct query");
            return self.execute(request).await;
        }

        info!(
            query_id = request.query_id,
            limit, max_pages, "Starting paginated download"
        );
        let segments = page_segments(limit, max_pages);
        self.run_segments(request, segments, Some(limit as u64))
            .await
    }

    /// Execute the request split into calendar date segments.
    ///
    /// `start` and `end` are inclusive `YYYY-MM-DD` dates; every segment
    /// covers `multiple` units. Invalid dates or a zero multiple fail
    /// before any network call.
    pub async fn execute_period(
        &self,
        request: &QueryRequest,
        start: &str,
        end: &str,
        unit: PeriodUnit,
        multiple: u32,
    ) -> Result<ResultTable, DownloadError> {
        let segments = period_segments(start, end, unit, multiple)?;
        info!(
            query_id = request.query_id,
            segments = segments.len(),
            %unit,
            multiple,
            "Starting period download"
        );
        self.run_segments(request, segments, None).await
    }

    /// Run one job state machine with this executor's configuration.
    async fn run_job(&self, request: &QueryRequest) -> Result<ResultTable, ClientError> {
        QueryJob::new(self.transport.as_ref())
            .with_poll_interval(self.poll_interval)
            .with_timeout(self.query_timeout)
            .run(request)
            .await
    }

    /// Dispatch segments under the concurrency cap and merge in order.
    ///
    /// `page_limit` enables pagination early termination: the first segment
    /// returning fewer rows is the last one merged, and speculatively
    /// dispatched later segments are dropped unmerged.
    async fn run_segments(
        &self,
        base: &QueryRequest,
        segments: Vec<Segment>,
        page_limit: Option<u64>,
    ) -> Result<ResultTable, DownloadError> {
        let total = segments.len();
        let started = Instant::now();
        // Single writer (the merge loop below); segment-start events read it.
        let rows_counter = Arc::new(AtomicU64::new(0));

        let jobs = segments.into_iter().enumerate().map(|(index, segment)| {
            let request = segment.apply(base);
            let label = segment.label();
            let transport = Arc::clone(&self.transport);
            let reporter = Arc::clone(&self.reporter);
            let rows_counter = Arc::clone(&rows_counter);
            let poll_interval = self.poll_interval;
            let query_timeout = self.query_timeout;

            async move {
                reporter.segment_started(&ProgressEvent {
                    segment_index: index,
                    total_segments: total,
                    rows_so_far: rows_counter.load(Ordering::Relaxed),
                    elapsed: started.elapsed(),
                    label: label.clone(),
                    eta: None,
                });

                let table = QueryJob::new(transport.as_ref())
                    .with_poll_interval(poll_interval)
                    .with_timeout(query_timeout)
                    .run(&request)
                    .await?;
                Ok::<_, ClientError>((index, label, table))
            }
        });

        // `buffered` keeps up to `concurrency` jobs in flight but yields
        // completions in segment order; dropping the stream cancels
        // whatever is still in flight.
        let mut results = stream::iter(jobs).buffered(self.concurrency);

        let mut assembler = TableAssembler::new();
        let mut completed = 0usize;

        while let Some(outcome) = results.next().await {
            let (index, label, table) = outcome?;
            let fetched = table.row_count() as u64;
            assembler.push(table);
            completed += 1;

            let rows_so_far = assembler.rows_merged() as u64;
            rows_counter.store(rows_so_far, Ordering::Relaxed);

            let elapsed = started.elapsed();
            self.reporter.segment_completed(&ProgressEvent {
                segment_index: index,
                total_segments: total,
                rows_so_far,
                elapsed,
                label,
                eta: estimate_remaining(elapsed, completed, total),
            });

            if let Some(limit) = page_limit {
                if fetched < limit {
                    debug!(
                        page = index,
                        rows = fetched,
                        limit,
                        "Short page, data set exhausted"
                    );
                    break;
                }
            }
        }
        drop(results);

        let merged = assembler.finish();
        self.reporter
            .finished(merged.row_count() as u64, started.elapsed());
        Ok(merged)
    }
}
