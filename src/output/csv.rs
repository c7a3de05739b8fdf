//! CSV output writer implementation

use csv::Writer;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use super::{OutputError, OutputResult, TableWriter};
use crate::ResultTable;

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// CSV writer for result tables.
///
/// Field escaping (commas, quotes, embedded newlines) is delegated to the
/// `csv` crate; a conforming reader reproduces the original cells exactly.
pub struct CsvTableWriter<W: Write> {
    writer: Writer<W>,
    rows_written: u64,
}

impl CsvTableWriter<BufWriter<File>> {
    /// Create a writer targeting a file, creating parent directories as
    /// needed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        Self::from_path_with_buffer_size(path, DEFAULT_BUFFER_SIZE)
    }

    /// Create a file writer with a custom buffer size.
    pub fn from_path_with_buffer_size<P: AsRef<Path>>(
        path: P,
        buffer_size: usize,
    ) -> OutputResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Creating CSV writer");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;

        Ok(Self::from_writer(BufWriter::with_capacity(buffer_size, file)))
    }
}

impl CsvTableWriter<io::Stdout> {
    /// Create a writer targeting standard output.
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }
}

impl<W: Write> CsvTableWriter<W> {
    /// Wrap an arbitrary writer.
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: Writer::from_writer(writer),
            rows_written: 0,
        }
    }

    /// Number of data rows written so far (headers excluded).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl<W: Write> TableWriter for CsvTableWriter<W> {
    fn write_table(&mut self, table: &ResultTable) -> OutputResult<()> {
        if !table.headers.is_empty() {
            self.writer
                .write_record(&table.headers)
                .map_err(|e| OutputError::CsvError(format!("Failed to write headers: {e}")))?;
        }

        for row in &table.rows {
            self.writer
                .write_record(row)
                .map_err(|e| OutputError::CsvError(format!("Failed to write row: {e}")))?;
            self.rows_written += 1;
        }

        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
    }

    fn close(mut self) -> OutputResult<()> {
        debug!(rows = self.rows_written, "Closing CSV writer");
        self.flush()?;

        let mut inner = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {e}")))?;
        inner
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush inner writer: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ResultTable {
        ResultTable {
            headers: vec!["id".to_string(), "name".to_string()],
            rows: vec![
                vec!["1".to_string(), "alpha".to_string()],
                vec!["2".to_string(), "beta".to_string()],
            ],
        }
    }

    #[test]
    fn test_write_table_to_buffer() {
        let mut writer = CsvTableWriter::from_writer(Vec::new());
        writer.write_table(&sample_table()).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.rows_written(), 2);
    }

    #[test]
    fn test_headerless_table_writes_rows_only() {
        let table = ResultTable {
            headers: vec![],
            rows: vec![vec!["x".to_string()]],
        };
        let mut writer = CsvTableWriter::from_writer(Vec::new());
        writer.write_table(&table).unwrap();
        assert_eq!(writer.rows_written(), 1);
    }

    #[test]
    fn test_from_path_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let mut writer = CsvTableWriter::from_path(&path).unwrap();
        writer.write_table(&sample_table()).unwrap();
        writer.close().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("id,name\n"));
    }
}
