//! Boilerplate-eliminating query execution on top of a borrowed connection.
//!
//! ```rust
//! use sql_valet::test_utils::{MockConnection, ScriptedResult};
//! use sql_valet::{RowShape, SqlExecutor, SqlValue};
//!
//! # fn main() -> Result<(), sql_valet::SqlValetError> {
//! let mut conn = MockConnection::new(RowShape::Named);
//! conn.script(ScriptedResult::rows(
//!     &["id", "name"],
//!     vec![vec![SqlValue::Int(1), SqlValue::Text("alice".into())]],
//! ));
//!
//! let mut executor = SqlExecutor::new(&mut conn);
//! let result = executor.fetch_one_row("select id, name from users where id = $1", &[SqlValue::Int(1)])?;
//! let row = result.row().expect("one row");
//! assert_eq!(row.get("name"), Some(&SqlValue::Text("alice".into())));
//! # Ok(())
//! # }
//! ```

mod streaming;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::dataframe;
use crate::driver::{Connection, Cursor};
use crate::error::SqlValetError;
use crate::results::{ExecutionResult, Row, RowData, shape_rows_by_name};
use crate::types::SqlValue;

pub use streaming::StreamingRows;

/// Internal fetch batch size for streaming cursors: rows per round-trip to
/// the driver. A tuning default, not a protocol requirement.
pub const DEFAULT_STREAMING_BATCH_SIZE: usize = 4000;

enum FetchMode {
    One,
    All,
    Modify,
}

/// Convenience methods for commonly used database activities.
///
/// Borrows a [`Connection`] for its lifetime and never closes it. Every
/// operation opens a scoped cursor that is released on all exit paths.
pub struct SqlExecutor<'a, C: Connection> {
    connection: &'a mut C,
    legacy_row_shaping: bool,
    streaming_batch_size: usize,
}

impl<'a, C: Connection> SqlExecutor<'a, C> {
    pub fn new(connection: &'a mut C) -> Self {
        Self {
            connection,
            legacy_row_shaping: false,
            streaming_batch_size: DEFAULT_STREAMING_BATCH_SIZE,
        }
    }

    /// Enable conversion of fetched rows into the named-field shape using
    /// cursor metadata.
    ///
    /// For connections that cannot honor a per-connection row-shape
    /// strategy and always produce positional rows. The caller knows its
    /// own driver context, so this is an explicit capability flag rather
    /// than anything inferred at run time.
    #[must_use]
    pub fn with_legacy_row_shaping(mut self, enabled: bool) -> Self {
        self.legacy_row_shaping = enabled;
        self
    }

    /// Override the streaming fetch batch size.
    #[must_use]
    pub fn with_streaming_batch_size(mut self, batch_size: usize) -> Self {
        self.streaming_batch_size = batch_size.max(1);
        self
    }

    /// Execute a select statement and fetch a single row.
    ///
    /// A query returning zero rows yields `RowData::None`, not an error.
    ///
    /// # Errors
    /// Driver failures propagate unchanged; the cursor is released either
    /// way.
    pub fn fetch_one_row(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<ExecutionResult, SqlValetError> {
        self.run(sql, params, FetchMode::One)
    }

    /// Execute a select statement and fetch the entire result set.
    ///
    /// An empty result set yields an empty sequence, not absence.
    ///
    /// # Errors
    /// Driver failures propagate unchanged; the cursor is released either
    /// way.
    pub fn fetch_all_rows(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<ExecutionResult, SqlValetError> {
        self.run(sql, params, FetchMode::All)
    }

    /// Execute an insert, update, or delete statement.
    ///
    /// `row_data` is always absent; this is the one operation that
    /// surfaces `column_descriptors` (the cursor's post-execute shape).
    ///
    /// # Errors
    /// Driver failures propagate unchanged; the cursor is released either
    /// way.
    pub fn modify_rows(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<ExecutionResult, SqlValetError> {
        self.run(sql, params, FetchMode::Modify)
    }

    fn run(
        &mut self,
        sql: &str,
        params: &[SqlValue],
        mode: FetchMode,
    ) -> Result<ExecutionResult, SqlValetError> {
        let legacy = self.legacy_row_shaping;
        let mut cursor = self.connection.cursor()?;
        cursor.execute(sql, params)?;

        let row_data = match mode {
            FetchMode::One => match cursor.fetch_one()? {
                Some(row) => RowData::One(shape_row(legacy, &cursor, row)),
                None => RowData::None,
            },
            FetchMode::All => {
                let rows = cursor.fetch_all()?;
                RowData::Many(shape_rows(legacy, &cursor, rows))
            }
            FetchMode::Modify => RowData::None,
        };

        let result = ExecutionResult {
            row_count: cursor.row_count(),
            column_descriptors: match mode {
                FetchMode::Modify => cursor.description(),
                _ => None,
            },
            row_data,
        };
        cursor.close()?;
        Ok(result)
    }

    /// Stream the whole result of `sql` through a server-side cursor.
    ///
    /// The returned iterator is lazy, single-pass, forward-only, and
    /// non-restartable; rows are fetched in batches of the configured size
    /// (default 4000) as the caller advances it. Auto-commit is forced off
    /// for the duration and restored afterwards only if it was previously
    /// on. Cleanup (cursor close, transaction release, auto-commit
    /// restore) runs exactly once, whether the iterator is exhausted,
    /// abandoned early, or fails.
    ///
    /// The iterator holds this executor's borrow, so no other operation
    /// can run on the connection while a stream is in progress.
    ///
    /// # Errors
    /// Fails if the transactional scope or cursor cannot be opened.
    pub fn fetch_all_streaming(
        &mut self,
        cursor_name: &str,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<StreamingRows<C::Cursor<'_>>, SqlValetError> {
        let batch_size = self.streaming_batch_size;
        let mut cursor = self.connection.named_cursor(cursor_name)?;
        if let Err(e) = cursor.execute(sql, params) {
            let _ = cursor.close();
            return Err(e);
        }
        Ok(StreamingRows::new(cursor, batch_size))
    }

    /// Stream the contents of a local file into the database via a
    /// driver-native bulk-load statement (e.g. `COPY ... FROM STDIN`).
    ///
    /// # Errors
    /// A missing file propagates the I/O error unchanged; driver failures
    /// propagate unchanged. File and cursor are released on all exit
    /// paths.
    pub fn copy_to_table_from_file(
        &mut self,
        sql: &str,
        dump_file_path: impl AsRef<Path>,
    ) -> Result<(), SqlValetError> {
        let mut cursor = self.connection.cursor()?;
        let mut dump_file = File::open(dump_file_path)?;
        cursor.copy_in(sql, &mut dump_file)?;
        cursor.close()
    }

    /// Execute a query and materialize the result as a typed Arrow
    /// [`RecordBatch`], columns typed from the result values.
    ///
    /// # Errors
    /// Driver failures and Arrow conversion failures propagate.
    pub fn get_dataframe(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<RecordBatch, SqlValetError> {
        debug!(%sql, "materializing query into a record batch");
        let mut cursor = self.connection.cursor()?;
        cursor.execute(sql, params)?;
        let descriptors = cursor.description().unwrap_or_default();
        let rows = cursor.fetch_all()?;
        cursor.close()?;
        dataframe::record_batch_from_rows(&descriptors, &rows)
    }
}

fn shape_row<Cur: Cursor>(legacy: bool, cursor: &Cur, row: Row) -> Row {
    if !legacy || row.is_named() {
        return row;
    }
    match description_columns(cursor) {
        Some(columns) => row.with_columns(columns),
        None => row,
    }
}

fn shape_rows<Cur: Cursor>(legacy: bool, cursor: &Cur, rows: Vec<Row>) -> Vec<Row> {
    if !legacy {
        return rows;
    }
    match description_columns(cursor) {
        Some(columns) => shape_rows_by_name(&columns, rows),
        None => rows,
    }
}

fn description_columns<Cur: Cursor>(cursor: &Cur) -> Option<Arc<Vec<String>>> {
    let descriptors = cursor.description()?;
    Some(Arc::new(
        descriptors.into_iter().map(|d| d.name).collect(),
    ))
}
