//! Column-oriented relation — the parsed-input contract of the pipeline.
//!
//! A relation is a named table: column name → sequence of optional cells.
//! Every column has the same length. Cells are raw strings; all typing
//! happens in the normalizer. Blank cells are stored as `None` so that
//! missing-value semantics survive parsing unchanged.

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone)]
pub struct Relation {
    name: String,
    rows: usize,
    columns: Vec<(String, Vec<Option<String>>)>,
}

impl Relation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: 0,
            columns: Vec::new(),
        }
    }

    /// Builder form of [`Relation::push_column`].
    pub fn with_column(
        mut self,
        column: impl Into<String>,
        cells: Vec<Option<String>>,
    ) -> PipelineResult<Self> {
        self.push_column(column, cells)?;
        Ok(self)
    }

    /// Add a column. The first column fixes the row count; every later
    /// column must match it exactly.
    pub fn push_column(
        &mut self,
        column: impl Into<String>,
        cells: Vec<Option<String>>,
    ) -> PipelineResult<()> {
        let column = column.into();
        if self.columns.is_empty() {
            self.rows = cells.len();
        } else if cells.len() != self.rows {
            return Err(PipelineError::ColumnLengthMismatch {
                relation: self.name.clone(),
                column,
                expected: self.rows,
                actual: cells.len(),
            });
        }
        self.columns.push((column, cells));
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of data rows (the header is not a row).
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a column, erroring if the relation does not carry it.
    pub fn column(&self, column: &str) -> PipelineResult<&[Option<String>]> {
        self.column_opt(column)
            .ok_or_else(|| PipelineError::MissingColumn {
                relation: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn column_opt(&self, column: &str) -> Option<&[Option<String>]> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cells)| cells.as_slice())
    }
}

/// A trimmed, non-blank view of one cell. Whitespace-only cells count as
/// missing, matching how the raw exports encode absent values.
pub fn cell(cells: &[Option<String>], row: usize) -> Option<&str> {
    cells
        .get(row)
        .and_then(|c| c.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
