//! Bulk device import models.

use serde::Serialize;

/// Maximum data rows accepted in one import.
pub const MAX_IMPORT_ROWS: usize = 5000;

/// A decoded spreadsheet: the first row is the header.
#[derive(Debug, Clone, Default)]
pub struct TabularSheet {
    pub rows: Vec<Vec<String>>,
}

impl TabularSheet {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Data rows paired with their 1-based sheet row number.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, row)| (i + 1, row.as_slice()))
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// A problem attached to one sheet row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportIssue {
    /// Sheet row number, header is row 1.
    pub row: usize,
    /// Device name or serial, when the row had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub message: String,
}

/// Outcome of a whole import run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success_count: u32,
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: Vec<ImportIssue>,
    pub warnings: Vec<ImportIssue>,
}
