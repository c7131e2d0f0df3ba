use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

use crate::error::SqlValetError;
use crate::types::SqlValue;

/// Extract one column of a driver row into an [`SqlValue`], dispatching on
/// the column's declared type name.
pub(crate) fn extract_value(
    row: &postgres::Row,
    idx: usize,
) -> Result<SqlValue, SqlValetError> {
    let type_name = row.columns()[idx].type_().name();

    let value = match type_name {
        "int2" => {
            let v: Option<i16> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v)))
        }
        "int4" => {
            let v: Option<i32> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v)))
        }
        "int8" => {
            let v: Option<i64> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, SqlValue::Int)
        }
        "float4" => {
            let v: Option<f32> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, |v| SqlValue::Float(f64::from(v)))
        }
        "float8" => {
            let v: Option<f64> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, SqlValue::Float)
        }
        "bool" => {
            let v: Option<bool> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, SqlValue::Bool)
        }
        "timestamp" => {
            let v: Option<NaiveDateTime> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, SqlValue::Timestamp)
        }
        "timestamptz" => {
            let v: Option<DateTime<Utc>> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, |v| SqlValue::Timestamp(v.naive_utc()))
        }
        "json" | "jsonb" => {
            let v: Option<JsonValue> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, SqlValue::Json)
        }
        "bytea" => {
            let v: Option<Vec<u8>> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, SqlValue::Bytes)
        }
        // text, varchar, char, name, and anything else that reads as text
        _ => {
            let v: Option<String> = row.try_get(idx)?;
            v.map_or(SqlValue::Null, SqlValue::Text)
        }
    };

    Ok(value)
}
