use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sql_valet::test_utils::{MockConnection, ScriptedResult};
use sql_valet::{RowShape, SqlExecutor, SqlValue};

#[test]
fn query_result_becomes_a_typed_record_batch() {
    let taken_at = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    let mut conn = MockConnection::new(RowShape::Named);
    conn.script(ScriptedResult::rows(
        &["id", "reading", "unit", "taken_at"],
        vec![
            vec![
                SqlValue::Int(1),
                SqlValue::Float(21.5),
                SqlValue::Text("celsius".into()),
                SqlValue::Timestamp(taken_at),
            ],
            vec![
                SqlValue::Int(2),
                SqlValue::Null,
                SqlValue::Text("celsius".into()),
                SqlValue::Timestamp(taken_at),
            ],
        ],
    ));

    let mut executor = SqlExecutor::new(&mut conn);
    let batch = executor
        .get_dataframe("select id, reading, unit, taken_at from readings", &[])
        .unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 4);
    let schema = batch.schema();
    assert_eq!(schema.field(0).name(), "id");
    assert_eq!(schema.field(0).data_type(), &DataType::Int64);
    assert_eq!(schema.field(1).data_type(), &DataType::Float64);

    let ids = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(ids.value(1), 2);
    let readings = batch
        .column(1)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!((readings.value(0) - 21.5).abs() < f64::EPSILON);
    assert!(readings.is_null(1));
    let units = batch
        .column(2)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(units.value(0), "celsius");
}

#[test]
fn empty_query_result_becomes_an_empty_batch() {
    let mut conn = MockConnection::new(RowShape::Named);
    conn.script(ScriptedResult::empty(&["id"]));

    let mut executor = SqlExecutor::new(&mut conn);
    let batch = executor.get_dataframe("select id from readings", &[]).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 1);
    assert_eq!(batch.schema().field(0).data_type(), &DataType::Utf8);
}
