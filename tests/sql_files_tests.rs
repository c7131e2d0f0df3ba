use std::fs;

use pretty_assertions::assert_eq;
use sql_valet::sql_from_file;
use tempfile::tempdir;

#[test]
fn reads_a_statement_from_the_sql_subdirectory() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sql")).unwrap();
    fs::write(
        dir.path().join("sql/latest_readings.sql"),
        "select * from readings order by taken_at desc limit $1\n",
    )
    .unwrap();

    let sql = sql_from_file(dir.path(), "latest_readings.sql").unwrap();
    assert_eq!(
        sql,
        "select * from readings order by taken_at desc limit $1\n"
    );
}

#[test]
fn missing_file_surfaces_as_file_not_found() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sql")).unwrap();

    let err = sql_from_file(dir.path(), "absent.sql").unwrap_err();
    assert!(err.is_file_not_found());
}

#[test]
fn missing_sql_directory_surfaces_as_file_not_found() {
    let dir = tempdir().unwrap();
    let err = sql_from_file(dir.path(), "anything.sql").unwrap_err();
    assert!(err.is_file_not_found());
}
