//! One-call helpers: connect straight from names, and whole-table bulk
//! copy in either direction.

use std::fs::File;
use std::path::Path;

use crate::connector::ConnectionConfig;
use crate::driver::{Connection, Cursor, RowShape};
use crate::error::SqlValetError;
use crate::postgres::PgConnection;

/// Resolve a config and open a connection in one call.
///
/// # Errors
/// Resolution and connection failures propagate unchanged.
pub fn connect_to_db(
    database: &str,
    user: &str,
    environment: Option<&str>,
    row_shape: RowShape,
    auto_commit: bool,
) -> Result<PgConnection, SqlValetError> {
    let config = ConnectionConfig::resolve(database, user, environment, auto_commit)?;
    config.connect_with_shape(row_shape)
}

/// Export an entire table to a flat file via the driver's native bulk-copy
/// mechanism. Cursor and file are scoped resources, released on all exit
/// paths.
///
/// # Errors
/// Driver and I/O failures propagate unchanged.
pub fn copy_table_to_file<C: Connection>(
    connection: &mut C,
    table_name: &str,
    dump_file_path: impl AsRef<Path>,
) -> Result<(), SqlValetError> {
    let mut cursor = connection.cursor()?;
    let mut dump_file = File::create(dump_file_path)?;
    cursor.copy_out(&format!("COPY {table_name} TO STDOUT"), &mut dump_file)?;
    cursor.close()
}

/// Import a flat file into an existing table via the driver's native
/// bulk-copy mechanism.
///
/// # Errors
/// A missing dump file propagates the I/O error unchanged; driver failures
/// propagate unchanged.
pub fn copy_table_from_file<C: Connection>(
    connection: &mut C,
    table_name: &str,
    dump_file_path: impl AsRef<Path>,
) -> Result<(), SqlValetError> {
    let mut cursor = connection.cursor()?;
    let mut dump_file = File::open(dump_file_path)?;
    cursor.copy_in(&format!("COPY {table_name} FROM STDIN"), &mut dump_file)?;
    cursor.close()
}
