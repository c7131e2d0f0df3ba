use tracing::debug;

use crate::connector::ConnectionConfig;
use crate::driver::{Connection, RowShape};
use crate::error::SqlValetError;

use super::cursor::PgCursor;
use super::service;

/// A live Postgres connection implementing the driver contract.
///
/// The underlying client has no auto-commit flag of its own, so psycopg2
/// semantics are emulated: with auto-commit off, a `BEGIN` is issued before
/// the first statement and the transaction stays open until `commit` or
/// `rollback`.
pub struct PgConnection {
    pub(crate) client: postgres::Client,
    pub(crate) autocommit: bool,
    pub(crate) in_transaction: bool,
    pub(crate) row_shape: RowShape,
}

impl PgConnection {
    /// Open a connection for `config`, resolving host/port/credentials from
    /// the service definition named `<db>:<env>`.
    pub(crate) fn open(
        config: &ConnectionConfig,
        row_shape: RowShape,
    ) -> Result<Self, SqlValetError> {
        let service = format!("{}:{}", config.database(), config.environment());
        let entry = service::lookup(&service)?;

        let mut pg = postgres::Config::new();
        pg.user(config.user());
        pg.dbname(entry.get("dbname").map_or(config.database(), String::as_str));
        pg.host(entry.get("host").map_or("localhost", String::as_str));
        if let Some(port) = entry.get("port") {
            let port: u16 = port.parse().map_err(|_| {
                SqlValetError::ConfigError(format!(
                    "service '{service}' has a bad port: {port}"
                ))
            })?;
            pg.port(port);
        }
        if let Some(password) = entry.get("password") {
            pg.password(password);
        }

        let client = pg.connect(postgres::NoTls)?;
        debug!(service = %service, "connection established");

        Ok(Self {
            client,
            autocommit: true,
            in_transaction: false,
            row_shape,
        })
    }

    /// Overwrite the auto-commit flag without transaction checks. Used by
    /// the provider right after open, before any statement has run.
    pub(crate) fn force_autocommit(&mut self, enabled: bool) {
        self.autocommit = enabled;
    }

    /// With auto-commit off, make sure a transaction is open before the
    /// next statement runs.
    pub(crate) fn ensure_transaction(&mut self) -> Result<(), SqlValetError> {
        if !self.autocommit && !self.in_transaction {
            self.client.batch_execute("BEGIN")?;
            self.in_transaction = true;
        }
        Ok(())
    }

    fn finish_transaction(&mut self, statement: &str) -> Result<(), SqlValetError> {
        if self.in_transaction {
            self.client.batch_execute(statement)?;
            self.in_transaction = false;
        }
        Ok(())
    }
}

impl Connection for PgConnection {
    type Cursor<'a> = PgCursor<'a>;

    fn cursor(&mut self) -> Result<PgCursor<'_>, SqlValetError> {
        Ok(PgCursor::plain(self))
    }

    fn named_cursor(&mut self, name: &str) -> Result<PgCursor<'_>, SqlValetError> {
        // Server-side cursors only exist inside a transaction. Remember
        // whether auto-commit was on so the cursor can restore it on close;
        // if the caller already had it off, it stays off afterwards.
        let restore_autocommit = self.autocommit;
        self.autocommit = false;
        Ok(PgCursor::named(self, name, restore_autocommit))
    }

    fn autocommit(&self) -> bool {
        self.autocommit
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), SqlValetError> {
        if self.in_transaction {
            return Err(SqlValetError::ExecutionError(
                "cannot change auto-commit inside an open transaction".to_string(),
            ));
        }
        self.autocommit = enabled;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SqlValetError> {
        self.finish_transaction("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), SqlValetError> {
        self.finish_transaction("ROLLBACK")
    }
}
