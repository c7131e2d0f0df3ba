//! The driver contract consumed by this layer.
//!
//! Everything above these traits is driver-agnostic: the executor and the
//! bulk-copy helpers speak only [`Connection`] and [`Cursor`]. The
//! [`postgres`](crate::postgres) module implements them over a live server;
//! [`test_utils`](crate::test_utils) implements them in memory.

use std::io::{Read, Write};

use crate::error::SqlValetError;
use crate::results::Row;
use crate::types::SqlValue;

/// The chosen representation for fetched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowShape {
    /// Rows carry column names and support attribute-style access by name.
    #[default]
    Named,
    /// Rows are plain positional tuples.
    Positional,
}

/// One entry of a cursor description: the post-execute shape of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_name: String,
}

/// A live database connection with mutable auto-commit state.
///
/// A connection is exclusively owned by whoever holds it; cursors borrow it
/// mutably, so the borrow checker rules out interleaved operations. This
/// layer never closes a connection.
pub trait Connection {
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Open a client-side cursor over this connection.
    ///
    /// # Errors
    /// Fails if the driver cannot provide a cursor.
    fn cursor(&mut self) -> Result<Self::Cursor<'_>, SqlValetError>;

    /// Open a server-side (named) cursor.
    ///
    /// Named cursors require a transaction: the implementation records the
    /// current auto-commit state, forces it off, and restores it when the
    /// cursor closes, but only if it was previously on.
    ///
    /// # Errors
    /// Fails if the transactional scope cannot be established.
    fn named_cursor(&mut self, name: &str) -> Result<Self::Cursor<'_>, SqlValetError>;

    fn autocommit(&self) -> bool;

    /// Flip the connection's auto-commit flag.
    ///
    /// # Errors
    /// Fails when called while a transaction is open.
    fn set_autocommit(&mut self, enabled: bool) -> Result<(), SqlValetError>;

    /// Commit the open transaction, if any.
    ///
    /// # Errors
    /// Fails if the driver rejects the commit.
    fn commit(&mut self) -> Result<(), SqlValetError>;

    /// Roll back the open transaction, if any.
    ///
    /// # Errors
    /// Fails if the driver rejects the rollback.
    fn rollback(&mut self) -> Result<(), SqlValetError>;
}

/// A scoped handle over one executed statement's pending result set.
///
/// Cursors are scoped resources: `close` is idempotent, and dropping an
/// unclosed cursor performs the same cleanup best-effort.
pub trait Cursor {
    /// Execute a statement with bound parameters.
    ///
    /// # Errors
    /// Driver-side failures (syntax errors, constraint violations, type
    /// mismatches) propagate unchanged.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<(), SqlValetError>;

    /// Fetch the next row, or `None` when the result set is exhausted.
    ///
    /// # Errors
    /// Fails if the fetch round-trip fails.
    fn fetch_one(&mut self) -> Result<Option<Row>, SqlValetError>;

    /// Fetch all remaining rows.
    ///
    /// # Errors
    /// Fails if the fetch round-trip fails.
    fn fetch_all(&mut self) -> Result<Vec<Row>, SqlValetError>;

    /// Fetch up to `max_rows` rows; an empty batch signals exhaustion.
    ///
    /// # Errors
    /// Fails if the fetch round-trip fails.
    fn fetch_many(&mut self, max_rows: usize) -> Result<Vec<Row>, SqlValetError>;

    /// Driver-reported row count for the last statement (-1 when unknown).
    fn row_count(&self) -> i64;

    /// Column metadata for the last statement, when available.
    fn description(&self) -> Option<Vec<ColumnDescriptor>>;

    /// Stream `source` into the database via a native bulk-load statement
    /// (e.g. `COPY ... FROM STDIN`). Returns the number of rows loaded.
    ///
    /// # Errors
    /// Fails on driver or I/O errors; partial loads are rolled back by the
    /// driver.
    fn copy_in(&mut self, sql: &str, source: &mut dyn Read) -> Result<u64, SqlValetError>;

    /// Stream a native bulk-export statement (e.g. `COPY ... TO STDOUT`)
    /// into `sink`. Returns the number of bytes written.
    ///
    /// # Errors
    /// Fails on driver or I/O errors.
    fn copy_out(&mut self, sql: &str, sink: &mut dyn Write) -> Result<u64, SqlValetError>;

    /// Release the cursor and any scope it owns. Safe to call twice.
    ///
    /// # Errors
    /// Fails if releasing the server-side scope fails.
    fn close(&mut self) -> Result<(), SqlValetError>;
}
