//! Flattening of projected records into a spreadsheet-style table, and back.
//!
//! Column names are field paths below the root element joined by a separator, so
//! `<tags><tag language="en"/></tags>` under the default separator lands in `tags_tag_language`.
//! Repeated fields expand into one row per item with the enclosing record's cells replicated.

mod flatten;
mod layout;
mod unflatten;

use serde::Serialize;
use thiserror::Error;

use crate::projection::ProjectError;

pub use flatten::{flatten, flatten_typed, flatten_with_schema};
pub use unflatten::{unflatten, unflatten_typed};

/// Errors raised while mapping between records and table columns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaInferenceError {
    /// Two field paths produce the same column name, or a header repeats a column.
    #[error("column '{column}' is ambiguous between {}", paths.join(" and "))]
    AmbiguousColumn { column: String, paths: Vec<String> },
    /// A header names no declared field.
    #[error("column '{column}' does not match any field")]
    UnknownColumn { column: String },
    /// A required field has no column.
    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },
    /// A data row carries more cells than the header declares.
    #[error("row {row} has {found} cells but the header declares {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Records passed together do not share one schema.
    #[error("cannot flatten <{found}> records together with <{expected}> records")]
    MixedSchemas { expected: String, found: String },
    #[error(transparent)]
    Record(#[from] ProjectError),
}

/// Options for flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Joins path segments into column names.
    pub separator: String,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
        }
    }
}

impl FlattenOptions {
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

/// Header of a flattened table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub separator: String,
    pub columns: Vec<String>,
}

impl TableSchema {
    pub fn new(separator: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            separator: separator.into(),
            columns,
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }
}

/// One data row. Cells align with [`TableSchema::columns`]; a short row reads as trailing blanks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TableRow {
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Cell text, empty when the row is shorter than `index`.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }
}

impl<S: Into<String>> FromIterator<S> for TableRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
