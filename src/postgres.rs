//! Driver-contract implementation over the blocking `postgres` crate.
//!
//! Auto-commit is emulated psycopg2-style with explicit `BEGIN`/`COMMIT`
//! statements, and server-side cursors are expressed as
//! `DECLARE ... NO SCROLL CURSOR FOR ...` / `FETCH FORWARD ... FROM ...`
//! inside the transaction that owns them.

mod connection;
mod cursor;
mod extract;
mod interpolate;
mod params;
mod service;

pub use connection::PgConnection;
pub use cursor::PgCursor;

pub(crate) use extract::extract_value;
pub(crate) use interpolate::interpolate;
pub(crate) use params::param_refs;
