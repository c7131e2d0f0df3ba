//! Materialization of query results into Arrow record batches.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryBuilder, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMicrosecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;

use crate::driver::ColumnDescriptor;
use crate::error::SqlValetError;
use crate::results::Row;
use crate::types::SqlValue;

#[derive(Clone, Copy, PartialEq)]
enum ColumnKind {
    Int,
    Float,
    Text,
    Bool,
    Timestamp,
    Bytes,
}

impl ColumnKind {
    fn of(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int(_) => Some(Self::Int),
            SqlValue::Float(_) => Some(Self::Float),
            SqlValue::Text(_) | SqlValue::Json(_) => Some(Self::Text),
            SqlValue::Bool(_) => Some(Self::Bool),
            SqlValue::Timestamp(_) => Some(Self::Timestamp),
            SqlValue::Bytes(_) => Some(Self::Bytes),
            SqlValue::Null => None,
        }
    }

    fn data_type(self) -> DataType {
        match self {
            Self::Int => DataType::Int64,
            Self::Float => DataType::Float64,
            Self::Text => DataType::Utf8,
            Self::Bool => DataType::Boolean,
            Self::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
            Self::Bytes => DataType::Binary,
        }
    }
}

/// Build a typed [`RecordBatch`] from fetched rows. Column names come from
/// the cursor description; column types are inferred from the first
/// non-null value of each column. All-null columns materialize as nullable
/// Utf8.
pub(crate) fn record_batch_from_rows(
    descriptors: &[ColumnDescriptor],
    rows: &[Row],
) -> Result<RecordBatch, SqlValetError> {
    let column_count = if descriptors.is_empty() {
        rows.first().map_or(0, Row::len)
    } else {
        descriptors.len()
    };
    if column_count == 0 {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    }

    let mut fields = Vec::with_capacity(column_count);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(column_count);

    for idx in 0..column_count {
        let name = descriptors
            .get(idx)
            .map_or_else(|| format!("column_{idx}"), |d| d.name.clone());
        let kind = rows
            .iter()
            .find_map(|row| row.get_by_index(idx).and_then(ColumnKind::of))
            .unwrap_or(ColumnKind::Text);

        fields.push(Field::new(name.as_str(), kind.data_type(), true));
        arrays.push(build_column(&name, kind, idx, rows)?);
    }

    let schema = Arc::new(Schema::new(fields));
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn build_column(
    name: &str,
    kind: ColumnKind,
    idx: usize,
    rows: &[Row],
) -> Result<ArrayRef, SqlValetError> {
    let mismatch = |value: &SqlValue| {
        SqlValetError::ExecutionError(format!(
            "column '{name}' holds mixed types: unexpected {value:?}"
        ))
    };

    let array: ArrayRef = match kind {
        ColumnKind::Int => {
            let mut builder = Int64Builder::with_capacity(rows.len());
            for row in rows {
                match row.get_by_index(idx) {
                    Some(SqlValue::Int(v)) => builder.append_value(*v),
                    Some(SqlValue::Null) | None => builder.append_null(),
                    Some(other) => return Err(mismatch(other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Float => {
            let mut builder = Float64Builder::with_capacity(rows.len());
            for row in rows {
                match row.get_by_index(idx) {
                    Some(SqlValue::Float(v)) => builder.append_value(*v),
                    Some(SqlValue::Int(v)) => builder.append_value(*v as f64),
                    Some(SqlValue::Null) | None => builder.append_null(),
                    Some(other) => return Err(mismatch(other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Text => {
            let mut builder = StringBuilder::new();
            for row in rows {
                match row.get_by_index(idx) {
                    Some(SqlValue::Text(v)) => builder.append_value(v),
                    Some(SqlValue::Json(v)) => builder.append_value(v.to_string()),
                    Some(SqlValue::Null) | None => builder.append_null(),
                    Some(other) => return Err(mismatch(other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Bool => {
            let mut builder = BooleanBuilder::with_capacity(rows.len());
            for row in rows {
                match row.get_by_index(idx) {
                    Some(SqlValue::Bool(v)) => builder.append_value(*v),
                    Some(SqlValue::Null) | None => builder.append_null(),
                    Some(other) => return Err(mismatch(other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Timestamp => {
            let mut builder = TimestampMicrosecondBuilder::with_capacity(rows.len());
            for row in rows {
                match row.get_by_index(idx) {
                    Some(SqlValue::Timestamp(v)) => {
                        builder.append_value(v.and_utc().timestamp_micros());
                    }
                    Some(SqlValue::Null) | None => builder.append_null(),
                    Some(other) => return Err(mismatch(other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Bytes => {
            let mut builder = BinaryBuilder::new();
            for row in rows {
                match row.get_by_index(idx) {
                    Some(SqlValue::Bytes(v)) => builder.append_value(v),
                    Some(SqlValue::Null) | None => builder.append_null(),
                    Some(other) => return Err(mismatch(other)),
                }
            }
            Arc::new(builder.finish())
        }
    };

    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array, StringArray};

    fn descriptor(name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            type_name: String::new(),
        }
    }

    #[test]
    fn typed_columns_from_values() {
        let descriptors = vec![descriptor("id"), descriptor("name")];
        let rows = vec![
            Row::positional(vec![SqlValue::Int(1), SqlValue::Text("a".into())]),
            Row::positional(vec![SqlValue::Int(2), SqlValue::Null]),
        ];
        let batch = record_batch_from_rows(&descriptors, &rows).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).data_type(), &DataType::Int64);

        let ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.value(0), 1);
        let names = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert!(names.is_null(1));
    }

    #[test]
    fn empty_result_is_an_empty_batch() {
        let batch = record_batch_from_rows(&[], &[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 0);
    }

    #[test]
    fn mixed_types_in_one_column_are_rejected() {
        let descriptors = vec![descriptor("v")];
        let rows = vec![
            Row::positional(vec![SqlValue::Int(1)]),
            Row::positional(vec![SqlValue::Text("x".into())]),
        ];
        let err = record_batch_from_rows(&descriptors, &rows).unwrap_err();
        assert!(matches!(err, SqlValetError::ExecutionError(_)));
    }
}
