use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::Arc;

use tracing::debug;

use crate::driver::{ColumnDescriptor, Connection, Cursor, RowShape};
use crate::error::SqlValetError;
use crate::results::Row;

use super::connection::PgConnection;
use super::interpolate::{interpolate, quote_ident};
use super::{extract_value, param_refs};

const DRAIN_BATCH: usize = 4000;

enum CursorKind {
    Plain,
    Named {
        name: String,
        declared: bool,
        restore_autocommit: bool,
    },
}

/// A scoped cursor over a [`PgConnection`].
///
/// Plain cursors buffer the full result of one statement client-side.
/// Named cursors leave the result buffered on the server and fetch it
/// incrementally; closing one releases the cursor, finishes the
/// transaction it opened, and restores auto-commit when appropriate.
pub struct PgCursor<'a> {
    conn: &'a mut PgConnection,
    kind: CursorKind,
    buffered: VecDeque<Row>,
    row_count: i64,
    description: Option<Vec<ColumnDescriptor>>,
    closed: bool,
    poisoned: bool,
}

impl<'a> PgCursor<'a> {
    pub(crate) fn plain(conn: &'a mut PgConnection) -> Self {
        Self::new(conn, CursorKind::Plain)
    }

    pub(crate) fn named(conn: &'a mut PgConnection, name: &str, restore_autocommit: bool) -> Self {
        Self::new(
            conn,
            CursorKind::Named {
                name: name.to_string(),
                declared: false,
                restore_autocommit,
            },
        )
    }

    fn new(conn: &'a mut PgConnection, kind: CursorKind) -> Self {
        Self {
            conn,
            kind,
            buffered: VecDeque::new(),
            row_count: -1,
            description: None,
            closed: false,
            poisoned: false,
        }
    }

    fn poison_on_err<T>(
        &mut self,
        result: Result<T, postgres::Error>,
    ) -> Result<T, SqlValetError> {
        match result {
            Ok(v) => Ok(v),
            Err(e) => {
                self.poisoned = true;
                Err(SqlValetError::PostgresError(e))
            }
        }
    }

    fn convert_rows(
        rows: &[postgres::Row],
        shape: RowShape,
    ) -> Result<Vec<Row>, SqlValetError> {
        let columns: Option<Arc<Vec<String>>> = match (shape, rows.first()) {
            (RowShape::Named, Some(first)) => Some(Arc::new(
                first
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect(),
            )),
            _ => None,
        };

        rows.iter()
            .map(|row| {
                let values = (0..row.columns().len())
                    .map(|idx| extract_value(row, idx))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match &columns {
                    Some(cols) => Row::named(Arc::clone(cols), values),
                    None => Row::positional(values),
                })
            })
            .collect()
    }

    fn execute_plain(
        &mut self,
        sql: &str,
        params: &[crate::types::SqlValue],
    ) -> Result<(), SqlValetError> {
        self.conn.ensure_transaction()?;
        debug!(%sql, params = params.len(), "executing statement");

        let prepared = self.conn.client.prepare(sql);
        let stmt = self.poison_on_err(prepared)?;
        self.description = Some(
            stmt.columns()
                .iter()
                .map(|c| ColumnDescriptor {
                    name: c.name().to_string(),
                    type_name: c.type_().name().to_string(),
                })
                .collect(),
        );

        let refs = param_refs(params);
        if stmt.columns().is_empty() {
            let executed = self.conn.client.execute(&stmt, &refs);
            let affected = self.poison_on_err(executed)?;
            self.row_count = i64::try_from(affected).unwrap_or(i64::MAX);
            self.buffered.clear();
        } else {
            let queried = self.conn.client.query(&stmt, &refs);
            let rows = self.poison_on_err(queried)?;
            self.row_count = i64::try_from(rows.len()).unwrap_or(i64::MAX);
            let shape = self.conn.row_shape;
            self.buffered = Self::convert_rows(&rows, shape)?.into();
        }
        Ok(())
    }

    fn execute_named(
        &mut self,
        sql: &str,
        params: &[crate::types::SqlValue],
    ) -> Result<(), SqlValetError> {
        let CursorKind::Named { name, .. } = &self.kind else {
            return Err(SqlValetError::ExecutionError(
                "not a named cursor".to_string(),
            ));
        };
        let name = name.clone();

        self.conn.ensure_transaction()?;
        let body = interpolate(sql, params)?;
        let declare = format!(
            "DECLARE {} NO SCROLL CURSOR FOR {body}",
            quote_ident(&name)
        );
        debug!(sql = %declare, "declaring server-side cursor");
        let declared_result = self.conn.client.batch_execute(&declare);
        self.poison_on_err(declared_result)?;

        if let CursorKind::Named { declared, .. } = &mut self.kind {
            *declared = true;
        }
        // Unknown until the result set has been walked.
        self.row_count = -1;
        Ok(())
    }

    fn fetch_batch(&mut self, max_rows: usize) -> Result<Vec<Row>, SqlValetError> {
        let CursorKind::Named { name, .. } = &self.kind else {
            // Plain cursors serve fetches from the client-side buffer.
            let take = max_rows.min(self.buffered.len());
            return Ok(self.buffered.drain(..take).collect());
        };
        let fetch = format!("FETCH FORWARD {max_rows} FROM {}", quote_ident(name));

        let queried = self.conn.client.query(fetch.as_str(), &[]);
        let rows = self.poison_on_err(queried)?;
        if self.description.is_none()
            && let Some(first) = rows.first()
        {
            self.description = Some(
                first
                    .columns()
                    .iter()
                    .map(|c| ColumnDescriptor {
                        name: c.name().to_string(),
                        type_name: c.type_().name().to_string(),
                    })
                    .collect(),
            );
        }
        let shape = self.conn.row_shape;
        let converted = Self::convert_rows(&rows, shape)?;
        if self.row_count < 0 {
            self.row_count = 0;
        }
        self.row_count += i64::try_from(converted.len()).unwrap_or(0);
        Ok(converted)
    }

    fn close_inner(&mut self) -> Result<(), SqlValetError> {
        self.closed = true;
        self.buffered.clear();

        let CursorKind::Named {
            name,
            declared,
            restore_autocommit,
        } = &self.kind
        else {
            return Ok(());
        };
        let name = name.clone();
        let declared = *declared;
        let restore = *restore_autocommit;

        let result = if self.poisoned {
            self.conn.rollback()
        } else {
            let released = if declared {
                self.conn
                    .client
                    .batch_execute(&format!("CLOSE {}", quote_ident(&name)))
                    .map_err(SqlValetError::from)
            } else {
                Ok(())
            };
            match released.and_then(|()| self.conn.commit()) {
                Ok(()) => Ok(()),
                Err(e) => {
                    let _ = self.conn.rollback();
                    Err(e)
                }
            }
        };

        if restore {
            self.conn.autocommit = true;
        }
        result
    }
}

impl Cursor for PgCursor<'_> {
    fn execute(
        &mut self,
        sql: &str,
        params: &[crate::types::SqlValue],
    ) -> Result<(), SqlValetError> {
        match self.kind {
            CursorKind::Plain => self.execute_plain(sql, params),
            CursorKind::Named { .. } => self.execute_named(sql, params),
        }
    }

    fn fetch_one(&mut self) -> Result<Option<Row>, SqlValetError> {
        if let Some(row) = self.buffered.pop_front() {
            return Ok(Some(row));
        }
        match self.kind {
            CursorKind::Plain => Ok(None),
            CursorKind::Named { .. } => Ok(self.fetch_batch(1)?.into_iter().next()),
        }
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>, SqlValetError> {
        match self.kind {
            CursorKind::Plain => Ok(self.buffered.drain(..).collect()),
            CursorKind::Named { .. } => {
                let mut all: Vec<Row> = self.buffered.drain(..).collect();
                loop {
                    let batch = self.fetch_batch(DRAIN_BATCH)?;
                    if batch.is_empty() {
                        break;
                    }
                    all.extend(batch);
                }
                Ok(all)
            }
        }
    }

    fn fetch_many(&mut self, max_rows: usize) -> Result<Vec<Row>, SqlValetError> {
        self.fetch_batch(max_rows)
    }

    fn row_count(&self) -> i64 {
        self.row_count
    }

    fn description(&self) -> Option<Vec<ColumnDescriptor>> {
        self.description.clone()
    }

    fn copy_in(&mut self, sql: &str, source: &mut dyn Read) -> Result<u64, SqlValetError> {
        self.conn.ensure_transaction()?;
        debug!(%sql, "bulk load in");
        let result = (|| {
            let mut writer = self.conn.client.copy_in(sql)?;
            std::io::copy(source, &mut writer)?;
            Ok(writer.finish()?)
        })();
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn copy_out(&mut self, sql: &str, sink: &mut dyn Write) -> Result<u64, SqlValetError> {
        self.conn.ensure_transaction()?;
        debug!(%sql, "bulk copy out");
        let result = (|| {
            let mut reader = self.conn.client.copy_out(sql)?;
            Ok(std::io::copy(&mut reader, sink)?)
        })();
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn close(&mut self) -> Result<(), SqlValetError> {
        if self.closed {
            return Ok(());
        }
        self.close_inner()
    }
}

impl Drop for PgCursor<'_> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.close_inner();
        }
    }
}
