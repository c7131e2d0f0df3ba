use std::collections::VecDeque;

use crate::driver::Cursor;
use crate::error::SqlValetError;
use crate::results::Row;

/// Lazy, pull-driven sequence of rows over a server-side cursor.
///
/// Rows are produced only as the caller advances the iterator; each empty
/// driver batch signals exhaustion. Termination — normal exhaustion, early
/// abandonment, or an error — triggers the cursor's cleanup (cursor close,
/// transaction release, auto-commit restore) exactly once.
pub struct StreamingRows<Cur: Cursor> {
    cursor: Cur,
    buffer: VecDeque<Row>,
    batch_size: usize,
    finished: bool,
}

impl<Cur: Cursor> StreamingRows<Cur> {
    pub(crate) fn new(cursor: Cur, batch_size: usize) -> Self {
        Self {
            cursor,
            buffer: VecDeque::new(),
            batch_size,
            finished: false,
        }
    }

    /// Release the cursor and its transactional scope early.
    ///
    /// Dropping the iterator does the same best-effort; calling this
    /// surfaces any cleanup error instead of swallowing it.
    ///
    /// # Errors
    /// Fails if releasing the server-side scope fails.
    pub fn close(mut self) -> Result<(), SqlValetError> {
        self.finished = true;
        self.buffer.clear();
        self.cursor.close()
    }
}

impl<Cur: Cursor> Iterator for StreamingRows<Cur> {
    type Item = Result<Row, SqlValetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.buffer.pop_front() {
            return Some(Ok(row));
        }
        if self.finished {
            return None;
        }

        match self.cursor.fetch_many(self.batch_size) {
            Ok(batch) if batch.is_empty() => {
                self.finished = true;
                match self.cursor.close() {
                    Ok(()) => None,
                    Err(e) => Some(Err(e)),
                }
            }
            Ok(batch) => {
                self.buffer.extend(batch);
                self.buffer.pop_front().map(Ok)
            }
            Err(e) => {
                self.finished = true;
                // Cursor cleanup after a failure; the fetch error is the
                // one worth reporting.
                let _ = self.cursor.close();
                Some(Err(e))
            }
        }
    }
}
