//! Boilerplate-eliminating wrappers around a Postgres driver.
//!
//! Connection credentials stay out of source and logs: connections are
//! named by a `service=<db>:<env> user=<user>` alias and resolved from
//! local service configuration. On top of a connection, [`SqlExecutor`]
//! wraps the common cursor dances — fetch one row, fetch all rows, run a
//! DML statement, stream a huge result through a server-side cursor, bulk
//! copy — behind one normalized result envelope.
//!
//! ```rust
//! use sql_valet::test_utils::{MockConnection, ScriptedResult};
//! use sql_valet::{RowShape, SqlExecutor, SqlValue};
//!
//! # fn main() -> Result<(), sql_valet::SqlValetError> {
//! let mut conn = MockConnection::new(RowShape::Named);
//! conn.script(ScriptedResult::rows(
//!     &["device_id"],
//!     vec![vec![SqlValue::Int(42)]],
//! ));
//!
//! let mut executor = SqlExecutor::new(&mut conn);
//! let result = executor.fetch_all_rows("select device_id from devices", &[])?;
//! assert_eq!(result.row_count, 1);
//! # Ok(())
//! # }
//! ```

mod connector;
mod convenience;
mod dataframe;
mod driver;
mod error;
mod executor;
mod postgres;
mod results;
mod sql_files;
mod types;

pub mod test_utils;

pub use connector::{ConnectionConfig, ENV_VAR};
pub use convenience::{connect_to_db, copy_table_from_file, copy_table_to_file};
pub use driver::{ColumnDescriptor, Connection, Cursor, RowShape};
pub use error::SqlValetError;
pub use executor::{DEFAULT_STREAMING_BATCH_SIZE, SqlExecutor, StreamingRows};
pub use postgres::{PgConnection, PgCursor};
pub use results::{ExecutionResult, Row, RowData, shape_rows_by_name};
pub use sql_files::sql_from_file;
pub use types::SqlValue;

/// Convenient imports for common functionality.
pub mod prelude {
    pub use crate::connector::ConnectionConfig;
    pub use crate::convenience::{connect_to_db, copy_table_from_file, copy_table_to_file};
    pub use crate::driver::{Connection, Cursor, RowShape};
    pub use crate::error::SqlValetError;
    pub use crate::executor::SqlExecutor;
    pub use crate::results::{ExecutionResult, Row, RowData};
    pub use crate::types::SqlValue;
}
