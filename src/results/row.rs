use std::sync::Arc;

use crate::types::SqlValue;

/// A single result row: a fixed-arity ordered tuple of column values,
/// optionally carrying column names for attribute-style access.
///
/// Named rows share one `Arc` of column names per result set, so shaping a
/// large result adds one allocation total, not one per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
    columns: Option<Arc<Vec<String>>>,
}

impl Row {
    /// Build a plain positional row.
    #[must_use]
    pub fn positional(values: Vec<SqlValue>) -> Self {
        Self {
            values,
            columns: None,
        }
    }

    /// Build a named row keyed by `columns`, in cursor-description order.
    #[must_use]
    pub fn named(columns: Arc<Vec<String>>, values: Vec<SqlValue>) -> Self {
        Self {
            values,
            columns: Some(columns),
        }
    }

    /// Attach column names to a positional row; a no-op if the row is
    /// already named.
    #[must_use]
    pub fn with_columns(mut self, columns: Arc<Vec<String>>) -> Self {
        if self.columns.is_none() {
            self.columns = Some(columns);
        }
        self
    }

    /// Whether this row supports access by column name.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.columns.is_some()
    }

    /// Get a value by column name. Returns `None` for positional rows and
    /// for unknown columns.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        let columns = self.columns.as_ref()?;
        let idx = columns.iter().position(|c| c == column_name)?;
        self.values.get(idx)
    }

    /// Get a value by position.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// The column names, when this row is named.
    #[must_use]
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref().map(Vec::as_slice)
    }

    /// All values in column order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Consume the row, keeping only the values.
    #[must_use]
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Convert positional rows to the named shape using one shared column-name
/// mapping, so all rows of a result set expose the same record shape.
#[must_use]
pub fn shape_rows_by_name(columns: &Arc<Vec<String>>, rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter()
        .map(|row| row.with_columns(Arc::clone(columns)))
        .collect()
}
