use pretty_assertions::assert_eq;
use sql_valet::test_utils::MockConnection;
use sql_valet::{ConnectionConfig, RowShape, SqlValetError};

#[test]
fn alias_matches_the_service_token_format_exactly() {
    let config = ConnectionConfig::resolve("telemetry", "ingest_rw", Some("dev"), true).unwrap();
    assert_eq!(config.alias(), "service=telemetry:dev user=ingest_rw");
}

#[test]
fn alias_never_contains_credential_material() {
    let config = ConnectionConfig::resolve("billing", "reporting", Some("prod"), true).unwrap();
    let alias = config.alias();
    assert!(!alias.contains("password"));
    assert!(!alias.contains("host"));
}

#[test]
fn empty_environment_label_is_a_config_error() {
    let err = ConnectionConfig::resolve("billing", "reporting", Some(""), true).unwrap_err();
    assert!(matches!(err, SqlValetError::ConfigError(_)));
}

#[test]
fn connect_applies_auto_commit_on() {
    let config = ConnectionConfig::resolve("telemetry", "ingest_rw", Some("dev"), true).unwrap();
    let conn = MockConnection::connect(&config, RowShape::Named);
    assert!(sql_valet::Connection::autocommit(&conn));
    assert_eq!(
        conn.connected_alias.as_deref(),
        Some("service=telemetry:dev user=ingest_rw")
    );
}

#[test]
fn connect_applies_auto_commit_off() {
    let config = ConnectionConfig::resolve("telemetry", "ingest_rw", Some("dev"), false).unwrap();
    let conn = MockConnection::connect(&config, RowShape::Named);
    assert!(!sql_valet::Connection::autocommit(&conn));
}

#[test]
fn config_accessors_round_trip() {
    let config = ConnectionConfig::resolve("billing", "reporting", Some("prod"), false).unwrap();
    assert_eq!(config.database(), "billing");
    assert_eq!(config.user(), "reporting");
    assert_eq!(config.environment(), "prod");
    assert!(!config.auto_commit());
}
