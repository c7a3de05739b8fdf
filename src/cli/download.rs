//! Download command implementation

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cli::credentials;
use crate::cli::progress::BarProgress;
use crate::client::HttpTransport;
use crate::downloader::config::DEFAULT_MAX_PAGES;
use crate::downloader::{DownloadError, NullProgress, ProgressReporter, QueryExecutor, TracingProgress};
use crate::output::{CsvTableWriter, TableWriter};
use crate::params::parse_parameters;
use crate::planner::PeriodUnit;
use crate::{QueryRequest, ResultTable};

use super::CliError;

/// Query Data Downloader CLI
#[derive(Parser, Debug)]
#[command(name = "query-data-downloader")]
#[command(about = "Download tabular results from an asynchronous query-execution API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a query once and download its result
    Query(QueryArgs),

    /// Download a query split into offset/limit pages
    Paginated(PaginatedArgs),

    /// Download a query split into calendar periods
    Period(PeriodArgs),
}

/// Connection settings shared by all commands
#[derive(Parser, Debug)]
pub struct ConnectionArgs {
    /// Base URL of the query service API (e.g. https://reports.example.com/api)
    #[arg(long)]
    pub base_url: String,

    /// API key sent with every request
    #[arg(long)]
    pub api_key: Option<String>,

    /// File containing the API key on its first line
    #[arg(long)]
    pub api_key_file: Option<PathBuf>,
}

/// Query settings shared by all commands
#[derive(Parser, Debug)]
pub struct CommonArgs {
    /// Numeric id of the saved query to execute
    #[arg(long)]
    pub query_id: i64,

    /// Query parameters as a JSON object string (e.g. '{"region": "emea"}')
    #[arg(long, default_value = "")]
    pub params: String,

    /// Accept cached results up to this many seconds old (0 always runs fresh)
    #[arg(long, default_value_t = 0)]
    pub max_age: u64,

    /// Per-query timeout in seconds, measured from submission
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Number of segments in flight (max 5; higher values are clamped)
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Output CSV file (stdout when omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Disable progress reporting
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

/// Arguments for a direct single-query download
#[derive(Parser, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    common: CommonArgs,
}

/// Arguments for a paginated download
#[derive(Parser, Debug)]
pub struct PaginatedArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    common: CommonArgs,

    /// Rows per page; 0 or less disables splitting
    #[arg(long, default_value_t = 1000)]
    pub limit: i64,

    /// Upper bound on pages to fetch
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,
}

/// Arguments for a calendar-period download
#[derive(Parser, Debug)]
pub struct PeriodArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    common: CommonArgs,

    /// First day of the range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub start_date: String,

    /// Last day of the range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub end_date: String,

    /// Period unit: day, week, month, quarter, or year
    #[arg(long)]
    pub unit: String,

    /// Units per segment
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub multiple: u32,
}

/// Everything a command needs to run: the configured executor, the base
/// request, and where the merged table goes.
struct ExecutionContext {
    executor: QueryExecutor,
    request: QueryRequest,
    output: Option<PathBuf>,
    progress: Option<Arc<BarProgress>>,
}

impl ExecutionContext {
    fn prepare(connection: &ConnectionArgs, common: &CommonArgs) -> Result<Self, CliError> {
        let api_key =
            credentials::resolve_api_key(connection.api_key.as_deref(), connection.api_key_file.as_ref())?;
        let transport = HttpTransport::new(&connection.base_url, api_key)?;

        let parameters = parse_parameters(&common.params)?;
        let request = QueryRequest::with_parameters(common.query_id, parameters)
            .with_max_age(common.max_age);
        request.validate().map_err(CliError::InvalidArgument)?;

        // A bar only makes sense on an interactive terminal; piped or
        // redirected stderr gets log lines instead.
        let mut progress = None;
        let reporter: Arc<dyn ProgressReporter> = if common.quiet {
            Arc::new(NullProgress)
        } else if std::io::stderr().is_terminal() {
            let bar = Arc::new(BarProgress::new());
            progress = Some(Arc::clone(&bar));
            bar
        } else {
            Arc::new(TracingProgress)
        };

        let executor = QueryExecutor::new(Arc::new(transport))
            .with_concurrency(common.concurrency)
            .with_timeout(Duration::from_secs(common.timeout_secs))
            .with_reporter(reporter);

        Ok(Self {
            executor,
            request,
            output: common.output.clone(),
            progress,
        })
    }

    /// Clear the progress display, then write the table on success.
    fn finish(self, result: Result<ResultTable, DownloadError>) -> Result<(), CliError> {
        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }

        let table = result?;
        match &self.output {
            Some(path) => {
                let mut writer = CsvTableWriter::from_path(path)?;
                writer.write_table(&table)?;
                writer.close()?;
                println!("Download completed successfully!");
                println!("Output: {}", path.display());
                println!("Rows: {}", table.row_count());
            }
            None => {
                let mut writer = CsvTableWriter::stdout();
                writer.write_table(&table)?;
                writer.close()?;
                info!(rows = table.row_count(), "Result written to stdout");
            }
        }
        Ok(())
    }
}

impl QueryArgs {
    /// Execute a direct single-query download.
    pub async fn execute(&self) -> Result<(), CliError> {
        let ctx = ExecutionContext::prepare(&self.connection, &self.common)?;
        let result = ctx.executor.execute(&ctx.request).await;
        ctx.finish(result)
    }
}

impl PaginatedArgs {
    /// Execute a paginated download.
    pub async fn execute(&self) -> Result<(), CliError> {
        let ctx = ExecutionContext::prepare(&self.connection, &self.common)?;
        let result = ctx
            .executor
            .execute_paginated(&ctx.request, self.limit, self.max_pages)
            .await;
        ctx.finish(result)
    }
}

impl PeriodArgs {
    /// Execute a calendar-period download.
    pub async fn execute(&self) -> Result<(), CliError> {
        let unit = PeriodUnit::from_str(&self.unit)?;
        let ctx = ExecutionContext::prepare(&self.connection, &self.common)?;
        let result = ctx
            .executor
            .execute_period(&ctx.request, &self.start_date, &self.end_date, unit, self.multiple)
            .await;
        ctx.finish(result)
    }
}
