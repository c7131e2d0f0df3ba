use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::connector::ConnectionConfig;
use crate::driver::{ColumnDescriptor, Connection, Cursor, RowShape};
use crate::error::SqlValetError;
use crate::results::Row;
use crate::types::SqlValue;

/// One canned statement result, consumed in script order.
#[derive(Debug, Clone)]
pub struct ScriptedResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
    pub row_count: i64,
}

impl ScriptedResult {
    /// A select-style result; `row_count` is the number of rows.
    #[must_use]
    pub fn rows(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        let row_count = i64::try_from(rows.len()).unwrap_or(i64::MAX);
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows,
            row_count,
        }
    }

    /// An empty select-style result.
    #[must_use]
    pub fn empty(columns: &[&str]) -> Self {
        Self::rows(columns, Vec::new())
    }

    /// A modify-style result: no rows, a driver-reported affected count,
    /// and the post-execute column shape.
    #[must_use]
    pub fn affected(row_count: i64, columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
            row_count,
        }
    }
}

/// Everything observable that happened on a [`MockConnection`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    Execute { sql: String, params: Vec<SqlValue> },
    Begin,
    Commit,
    Rollback,
    AutocommitChanged(bool),
    CursorOpened { name: Option<String> },
    CursorClosed { name: Option<String> },
    CopyIn { sql: String, bytes: Vec<u8> },
    CopyOut { sql: String },
}

/// Scriptable in-memory connection implementing the driver contract with
/// the same auto-commit and transaction discipline as the real backend.
pub struct MockConnection {
    row_shape: RowShape,
    autocommit: bool,
    in_transaction: bool,
    scripted: VecDeque<ScriptedResult>,
    /// Ordered journal of observable events.
    pub events: Vec<MockEvent>,
    /// Bytes served by `copy_out`.
    pub copy_out_source: Vec<u8>,
    /// Bytes captured by `copy_in`.
    pub copy_in_sink: Vec<u8>,
    /// Alias recorded by [`MockConnection::connect`].
    pub connected_alias: Option<String>,
}

impl MockConnection {
    #[must_use]
    pub fn new(row_shape: RowShape) -> Self {
        Self {
            row_shape,
            autocommit: true,
            in_transaction: false,
            scripted: VecDeque::new(),
            events: Vec::new(),
            copy_out_source: Vec::new(),
            copy_in_sink: Vec::new(),
            connected_alias: None,
        }
    }

    /// Mirror of the provider's connect contract: record the alias and set
    /// auto-commit post-open from the config.
    #[must_use]
    pub fn connect(config: &ConnectionConfig, row_shape: RowShape) -> Self {
        let mut conn = Self::new(row_shape);
        conn.connected_alias = Some(config.alias());
        conn.autocommit = config.auto_commit();
        conn
    }

    /// Queue the result for the next executed statement.
    pub fn script(&mut self, result: ScriptedResult) {
        self.scripted.push_back(result);
    }

    fn ensure_transaction(&mut self) {
        if !self.autocommit && !self.in_transaction {
            self.in_transaction = true;
            self.events.push(MockEvent::Begin);
        }
    }
}

impl Connection for MockConnection {
    type Cursor<'a> = MockCursor<'a>;

    fn cursor(&mut self) -> Result<MockCursor<'_>, SqlValetError> {
        self.events.push(MockEvent::CursorOpened { name: None });
        Ok(MockCursor::new(self, None, false))
    }

    fn named_cursor(&mut self, name: &str) -> Result<MockCursor<'_>, SqlValetError> {
        self.events.push(MockEvent::CursorOpened {
            name: Some(name.to_string()),
        });
        let restore_autocommit = self.autocommit;
        self.autocommit = false;
        Ok(MockCursor::new(self, Some(name.to_string()), restore_autocommit))
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
        self.events.push(MockEvent::AutocommitChanged(enabled));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SqlValetError> {
        if self.in_transaction {
            self.in_transaction = false;
            self.events.push(MockEvent::Commit);
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlValetError> {
        if self.in_transaction {
            self.in_transaction = false;
            self.events.push(MockEvent::Rollback);
        }
        Ok(())
    }
}

struct ActiveResult {
    columns: Arc<Vec<String>>,
    pending: VecDeque<Row>,
    row_count: i64,
}

/// Cursor over a [`MockConnection`], serving scripted results.
pub struct MockCursor<'a> {
    conn: &'a mut MockConnection,
    name: Option<String>,
    restore_autocommit: bool,
    result: Option<ActiveResult>,
    closed: bool,
}

impl<'a> MockCursor<'a> {
    fn new(conn: &'a mut MockConnection, name: Option<String>, restore_autocommit: bool) -> Self {
        Self {
            conn,
            name,
            restore_autocommit,
            result: None,
            closed: false,
        }
    }

    fn close_inner(&mut self) -> Result<(), SqlValetError> {
        self.closed = true;
        self.result = None;
        self.conn.events.push(MockEvent::CursorClosed {
            name: self.name.clone(),
        });
        if self.name.is_some() {
            self.conn.commit()?;
            if self.restore_autocommit {
                self.conn.autocommit = true;
            }
        }
        Ok(())
    }
}

impl Cursor for MockCursor<'_> {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<(), SqlValetError> {
        self.conn.ensure_transaction();
        self.conn.events.push(MockEvent::Execute {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        let scripted = self
            .conn
            .scripted
            .pop_front()
            .unwrap_or_else(|| ScriptedResult::affected(0, &[]));
        let columns = Arc::new(scripted.columns);
        let pending = scripted
            .rows
            .into_iter()
            .map(|values| match self.conn.row_shape {
                RowShape::Named => Row::named(Arc::clone(&columns), values),
                RowShape::Positional => Row::positional(values),
            })
            .collect();
        self.result = Some(ActiveResult {
            columns,
            pending,
            row_count: scripted.row_count,
        });
        Ok(())
    }

    fn fetch_one(&mut self) -> Result<Option<Row>, SqlValetError> {
        Ok(self
            .result
            .as_mut()
            .and_then(|result| result.pending.pop_front()))
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>, SqlValetError> {
        Ok(self
            .result
            .as_mut()
            .map(|result| result.pending.drain(..).collect())
            .unwrap_or_default())
    }

    fn fetch_many(&mut self, max_rows: usize) -> Result<Vec<Row>, SqlValetError> {
        Ok(self
            .result
            .as_mut()
            .map(|result| {
                let take = max_rows.min(result.pending.len());
                result.pending.drain(..take).collect()
            })
            .unwrap_or_default())
    }

    fn row_count(&self) -> i64 {
        self.result.as_ref().map_or(-1, |result| result.row_count)
    }

    fn description(&self) -> Option<Vec<ColumnDescriptor>> {
        self.result.as_ref().map(|result| {
            result
                .columns
                .iter()
                .map(|name| ColumnDescriptor {
                    name: name.clone(),
                    type_name: "text".to_string(),
                })
                .collect()
        })
    }

    fn copy_in(&mut self, sql: &str, source: &mut dyn Read) -> Result<u64, SqlValetError> {
        self.conn.ensure_transaction();
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        let count = bytes.len() as u64;
        self.conn.copy_in_sink.extend_from_slice(&bytes);
        self.conn.events.push(MockEvent::CopyIn {
            sql: sql.to_string(),
            bytes,
        });
        Ok(count)
    }

    fn copy_out(&mut self, sql: &str, sink: &mut dyn Write) -> Result<u64, SqlValetError> {
        self.conn.ensure_transaction();
        sink.write_all(&self.conn.copy_out_source)?;
        self.conn.events.push(MockEvent::CopyOut {
            sql: sql.to_string(),
        });
        Ok(self.conn.copy_out_source.len() as u64)
    }

    fn close(&mut self) -> Result<(), SqlValetError> {
        if self.closed {
            return Ok(());
        }
        self.close_inner()
    }
}

impl Drop for MockCursor<'_> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.close_inner();
        }
    }
}
