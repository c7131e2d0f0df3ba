//! The normalized result envelope returned by every non-streaming query
//! method, and the row representation shared by all operations.

mod envelope;
mod row;

pub use envelope::{ExecutionResult, RowData};
pub use row::{Row, shape_rows_by_name};
