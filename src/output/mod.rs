//! Result table output writers

use crate::ResultTable;

pub mod csv;

pub use csv::CsvTableWriter;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writer for a fully assembled result table.
///
/// Callers hand over the table only after assembly succeeded; a failed
/// download never reaches a writer.
pub trait TableWriter {
    /// Write headers and all rows.
    fn write_table(&mut self, table: &ResultTable) -> OutputResult<()>;

    /// Flush any buffered data.
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output.
    fn close(self) -> OutputResult<()>;
}
