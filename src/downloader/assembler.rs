//! Merging per-segment tables into one result.

use crate::ResultTable;

/// Accumulates per-segment tables in segment order.
///
/// The first non-empty headers win; later segments are assumed homogeneous
/// and their headers are not re-validated. Rows are appended in push order,
/// preserving intra-segment ordering.
#[derive(Debug, Default)]
pub struct TableAssembler {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one segment's table. Must be called in segment order.
    pub fn push(&mut self, table: ResultTable) {
        if self.headers.is_empty() && !table.headers.is_empty() {
            self.headers = table.headers;
        }
        self.rows.extend(table.rows);
    }

    /// Rows merged so far.
    pub fn rows_merged(&self) -> usize {
        self.rows.len()
    }

    /// Finalize into the merged table.
    pub fn finish(self) -> ResultTable {
        ResultTable {
            headers: self.headers,
            rows: self.rows,
        }
    }
}
