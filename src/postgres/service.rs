//! Lookup of libpq-style service definitions.
//!
//! The connection alias only names a service (`<db>:<env>`); host, port,
//! and password live in a `pg_service.conf` file resolved from the
//! `PGSERVICEFILE` variable or the user's home directory, so no credential
//! material ever appears in code or logs.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::SqlValetError;

fn service_file_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("PGSERVICEFILE") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".pg_service.conf"))
}

/// Find the section named `service` and return its key/value pairs.
pub(crate) fn lookup(service: &str) -> Result<HashMap<String, String>, SqlValetError> {
    let Some(path) = service_file_path() else {
        return Err(SqlValetError::ConfigError(
            "no service file: PGSERVICEFILE unset and home directory unknown".to_string(),
        ));
    };
    let text = fs::read_to_string(&path).map_err(|e| {
        SqlValetError::ConfigError(format!(
            "cannot read service file {}: {e}",
            path.display()
        ))
    })?;
    parse_section(&text, service).ok_or_else(|| {
        SqlValetError::ConfigError(format!(
            "service '{service}' not defined in {}",
            path.display()
        ))
    })
}

fn parse_section(text: &str, service: &str) -> Option<HashMap<String, String>> {
    let mut in_section = false;
    let mut entries = HashMap::new();
    let mut found = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if in_section {
                break;
            }
            in_section = header.trim() == service;
            found |= in_section;
            continue;
        }
        if in_section
            && let Some((key, value)) = line.split_once('=')
        {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    found.then_some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# fleet databases
[telemetry:dev]
host=db.dev.internal
port=5433
dbname=telemetry
password=hunter2

[telemetry:prod]
host=db.prod.internal
";

    #[test]
    fn finds_the_requested_section() {
        let entries = parse_section(SAMPLE, "telemetry:dev").unwrap();
        assert_eq!(entries.get("host").unwrap(), "db.dev.internal");
        assert_eq!(entries.get("port").unwrap(), "5433");
        assert_eq!(entries.get("password").unwrap(), "hunter2");
    }

    #[test]
    fn stops_at_the_next_section() {
        let entries = parse_section(SAMPLE, "telemetry:prod").unwrap();
        assert_eq!(entries.get("host").unwrap(), "db.prod.internal");
        assert!(!entries.contains_key("port"));
    }

    #[test]
    fn unknown_service_is_none() {
        assert!(parse_section(SAMPLE, "telemetry:staging").is_none());
    }
}
