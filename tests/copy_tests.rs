use std::fs;
use std::io::Write;

use pretty_assertions::assert_eq;
use sql_valet::test_utils::{MockConnection, MockEvent};
use sql_valet::{RowShape, SqlExecutor, SqlValetError, copy_table_from_file, copy_table_to_file};
use tempfile::tempdir;

const DUMP: &[u8] = b"1\talice\n2\tbob\n";

#[test]
fn copy_table_to_file_writes_the_table_dump() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.tsv");

    let mut conn = MockConnection::new(RowShape::Named);
    conn.copy_out_source = DUMP.to_vec();
    copy_table_to_file(&mut conn, "users", &path).unwrap();

    assert_eq!(fs::read(&path).unwrap(), DUMP);
    assert!(conn.events.iter().any(|e| matches!(
        e,
        MockEvent::CopyOut { sql } if sql == "COPY users TO STDOUT"
    )));
    assert!(conn
        .events
        .iter()
        .any(|e| matches!(e, MockEvent::CursorClosed { .. })));
}

#[test]
fn copy_table_from_file_loads_the_file_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.tsv");
    fs::File::create(&path).unwrap().write_all(DUMP).unwrap();

    let mut conn = MockConnection::new(RowShape::Named);
    copy_table_from_file(&mut conn, "users", &path).unwrap();

    assert_eq!(conn.copy_in_sink, DUMP);
    assert!(conn.events.iter().any(|e| matches!(
        e,
        MockEvent::CopyIn { sql, .. } if sql == "COPY users FROM STDIN"
    )));
}

#[test]
fn table_round_trips_through_a_dump_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roundtrip.tsv");

    let mut source = MockConnection::new(RowShape::Named);
    source.copy_out_source = DUMP.to_vec();
    copy_table_to_file(&mut source, "users", &path).unwrap();

    let mut target = MockConnection::new(RowShape::Named);
    copy_table_from_file(&mut target, "users_copy", &path).unwrap();
    assert_eq!(target.copy_in_sink, DUMP);
}

#[test]
fn executor_copy_accepts_an_arbitrary_copy_statement() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.csv");
    fs::File::create(&path)
        .unwrap()
        .write_all(b"1,alice\n")
        .unwrap();

    let mut conn = MockConnection::new(RowShape::Named);
    let mut executor = SqlExecutor::new(&mut conn);
    executor
        .copy_to_table_from_file("COPY users (id, name) FROM STDIN WITH (FORMAT csv)", &path)
        .unwrap();
    drop(executor);

    assert_eq!(conn.copy_in_sink, b"1,alice\n");
}

#[test]
fn missing_dump_file_surfaces_as_file_not_found() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.tsv");

    let mut conn = MockConnection::new(RowShape::Named);
    let mut executor = SqlExecutor::new(&mut conn);
    let err = executor
        .copy_to_table_from_file("COPY users FROM STDIN", &missing)
        .unwrap_err();
    assert!(err.is_file_not_found());
    assert!(matches!(err, SqlValetError::IoError(_)));
}

#[test]
fn missing_dump_file_in_table_copy_is_also_file_not_found() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.tsv");

    let mut conn = MockConnection::new(RowShape::Named);
    let err = copy_table_from_file(&mut conn, "users", &missing).unwrap_err();
    assert!(err.is_file_not_found());
}
