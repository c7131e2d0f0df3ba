use crate::driver::ColumnDescriptor;

use super::row::Row;

/// The row payload of an [`ExecutionResult`].
///
/// Fetch-one yields `One` or `None`; fetch-all always yields `Many` (an
/// empty result set is an empty sequence, not absence); modify always
/// yields `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum RowData {
    None,
    One(Row),
    Many(Vec<Row>),
}

/// The single normalized envelope returned by every non-streaming query
/// method. Callers never branch on operation type to read `row_count`.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub row_data: RowData,
    /// Driver-reported row count; some drivers report -1 when unknown.
    pub row_count: i64,
    /// Post-execute cursor shape. Present only for modify operations.
    pub column_descriptors: Option<Vec<ColumnDescriptor>>,
}

impl ExecutionResult {
    /// The single fetched row, if any. `None` both for empty fetch-one
    /// results and for non-single payloads.
    #[must_use]
    pub fn row(&self) -> Option<&Row> {
        match &self.row_data {
            RowData::One(row) => Some(row),
            _ => None,
        }
    }

    /// All rows as a slice, whatever the payload variant.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match &self.row_data {
            RowData::None => &[],
            RowData::One(row) => std::slice::from_ref(row),
            RowData::Many(rows) => rows,
        }
    }

    /// Consume the envelope, keeping the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self.row_data {
            RowData::None => Vec::new(),
            RowData::One(row) => vec![row],
            RowData::Many(rows) => rows,
        }
    }
}
