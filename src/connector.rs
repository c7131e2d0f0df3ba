//! Connection provider: resolves a named database + user + environment into
//! a connection, without any credential material appearing in source or
//! logs.
//!
//! Credentials are obfuscated behind a libpq-style service alias: the only
//! thing this layer ever holds is `service=<db>:<env> user=<user>`, and the
//! driver layer resolves host/credentials out-of-band from local service
//! configuration files. The alias format is a stable interface; other
//! systems parse and log it.

use std::env;

use tracing::debug;

use crate::driver::RowShape;
use crate::error::SqlValetError;
use crate::postgres::PgConnection;

/// Process variable consulted when no environment label is given.
pub const ENV_VAR: &str = "ENV";

/// Immutable description of one logical connection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    database: String,
    user: String,
    environment: String,
    auto_commit: bool,
}

impl ConnectionConfig {
    /// Resolve a connection config from explicit input, falling back to the
    /// `ENV` process variable for the environment label.
    ///
    /// # Errors
    /// `MissingEnvironment` when the label is omitted and `ENV` is unset;
    /// `ConfigError` when an explicit label is empty.
    pub fn resolve(
        database: impl Into<String>,
        user: impl Into<String>,
        environment: Option<&str>,
        auto_commit: bool,
    ) -> Result<Self, SqlValetError> {
        let environment = resolve_environment(environment, env::var(ENV_VAR).ok())?;
        Ok(Self {
            database: database.into(),
            user: user.into(),
            environment,
            auto_commit,
        })
    }

    /// The connection alias handed to the driver layer, exactly
    /// `service=<db>:<env> user=<user>`.
    #[must_use]
    pub fn alias(&self) -> String {
        format!(
            "service={}:{} user={}",
            self.database, self.environment, self.user
        )
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    #[must_use]
    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Open a connection with the default (named) row shape.
    ///
    /// # Errors
    /// Connection failures propagate immediately; there is no retry.
    pub fn connect(&self) -> Result<PgConnection, SqlValetError> {
        self.connect_with_shape(RowShape::default())
    }

    /// Open a connection with an explicit row-shape strategy, then set the
    /// connection's auto-commit flag to match this config. The flag is set
    /// post-open because the driver may default it differently.
    ///
    /// # Errors
    /// Connection failures propagate immediately; there is no retry.
    pub fn connect_with_shape(&self, row_shape: RowShape) -> Result<PgConnection, SqlValetError> {
        debug!(alias = %self.alias(), "opening connection");
        let mut connection = PgConnection::open(self, row_shape)?;
        connection.force_autocommit(self.auto_commit);
        Ok(connection)
    }
}

fn resolve_environment(
    explicit: Option<&str>,
    ambient: Option<String>,
) -> Result<String, SqlValetError> {
    match explicit {
        Some(label) if label.is_empty() => Err(SqlValetError::ConfigError(
            "environment label must be non-empty".to_string(),
        )),
        Some(label) => Ok(label.to_string()),
        None => ambient.ok_or(SqlValetError::MissingEnvironment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_environment_wins_over_ambient() {
        let env = resolve_environment(Some("prod"), Some("dev".to_string())).unwrap();
        assert_eq!(env, "prod");
    }

    #[test]
    fn ambient_environment_is_the_fallback() {
        let env = resolve_environment(None, Some("dev".to_string())).unwrap();
        assert_eq!(env, "dev");
    }

    #[test]
    fn missing_environment_is_an_error_not_a_default() {
        let err = resolve_environment(None, None).unwrap_err();
        assert!(matches!(err, SqlValetError::MissingEnvironment));
    }

    #[test]
    fn empty_explicit_environment_is_rejected() {
        let err = resolve_environment(Some(""), Some("dev".to_string())).unwrap_err();
        assert!(matches!(err, SqlValetError::ConfigError(_)));
    }
}
