use pretty_assertions::assert_eq;
use sql_valet::test_utils::{MockConnection, MockEvent, ScriptedResult};
use sql_valet::{Connection, RowShape, SqlExecutor, SqlValue};

fn scripted_ints(n: i64) -> ScriptedResult {
    ScriptedResult::rows(&["id"], (0..n).map(|i| vec![SqlValue::Int(i)]).collect())
}

#[test]
fn streams_every_row_in_order_across_batches() {
    let mut conn = MockConnection::new(RowShape::Named);
    conn.script(scripted_ints(10_000));

    let mut executor = SqlExecutor::new(&mut conn);
    let stream = executor
        .fetch_all_streaming("events_scan", "select id from events order by id", &[])
        .unwrap();

    let ids: Vec<i64> = stream
        .map(|row| row.unwrap().get("id").and_then(SqlValue::as_int).unwrap())
        .collect();
    assert_eq!(ids.len(), 10_000);
    assert!(ids.iter().copied().eq(0..10_000));
}

#[test]
fn batch_size_is_tunable() {
    let mut conn = MockConnection::new(RowShape::Named);
    conn.script(scripted_ints(7));

    let mut executor = SqlExecutor::new(&mut conn).with_streaming_batch_size(2);
    let stream = executor
        .fetch_all_streaming("small_scan", "select id from events", &[])
        .unwrap();
    assert_eq!(stream.count(), 7);
}

#[test]
fn exhaustion_cleans_up_exactly_once_and_restores_autocommit() {
    let mut conn = MockConnection::new(RowShape::Named);
    assert!(conn.autocommit());
    conn.script(scripted_ints(3));

    let mut executor = SqlExecutor::new(&mut conn);
    let stream = executor
        .fetch_all_streaming("scan", "select id from events", &[])
        .unwrap();
    let rows: Vec<_> = stream.collect();
    assert_eq!(rows.len(), 3);
    drop(executor);

    // Auto-commit was on before, so it comes back on.
    assert!(conn.autocommit());
    let closes = conn
        .events
        .iter()
        .filter(|e| matches!(e, MockEvent::CursorClosed { .. }))
        .count();
    assert_eq!(closes, 1);
    assert!(conn.events.contains(&MockEvent::Commit));
}

#[test]
fn autocommit_stays_off_when_it_was_off_before() {
    let mut conn = MockConnection::new(RowShape::Named);
    conn.set_autocommit(false).unwrap();
    conn.script(scripted_ints(2));

    let mut executor = SqlExecutor::new(&mut conn);
    let stream = executor
        .fetch_all_streaming("scan", "select id from events", &[])
        .unwrap();
    stream.close().unwrap();
    drop(executor);

    assert!(!conn.autocommit());
}

#[test]
fn early_abandonment_still_releases_the_cursor() {
    let mut conn = MockConnection::new(RowShape::Named);
    conn.script(scripted_ints(100));

    let mut executor = SqlExecutor::new(&mut conn);
    let mut stream = executor
        .fetch_all_streaming("scan", "select id from events", &[])
        .unwrap();
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.get("id"), Some(&SqlValue::Int(0)));
    drop(stream);

    // The connection is usable again once the stream is gone.
    conn.script(ScriptedResult::affected(1, &[]));
    let mut executor = SqlExecutor::new(&mut conn);
    executor.modify_rows("delete from events where id = 0", &[]).unwrap();
    drop(executor);

    let closes = conn
        .events
        .iter()
        .filter(|e| matches!(e, MockEvent::CursorClosed { name: Some(_) }))
        .count();
    assert_eq!(closes, 1);
    assert!(conn.autocommit());
}

#[test]
fn explicit_close_surfaces_cleanup_outcome() {
    let mut conn = MockConnection::new(RowShape::Named);
    conn.script(scripted_ints(1));

    let mut executor = SqlExecutor::new(&mut conn);
    let stream = executor
        .fetch_all_streaming("scan", "select id from events", &[])
        .unwrap();
    stream.close().unwrap();
}
