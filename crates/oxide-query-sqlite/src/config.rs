//! Connection settings.

use std::time::Duration;

use serde::Deserialize;

/// Default database URL: a private in-memory database.
pub const DEFAULT_URL: &str = "sqlite::memory:";

/// Settings for opening a [`SqliteConnection`](crate::SqliteConnection).
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```rust
/// use oxide_query_sqlite::ConnectionConfig;
///
/// let config = ConnectionConfig::new("sqlite:app.db").foreign_keys(false);
/// assert_eq!(config.url, "sqlite:app.db");
/// assert!(config.create_if_missing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Database URL, e.g. `sqlite:db.sqlite3` or `sqlite::memory:`.
    pub url: String,
    /// Create the database file if it doesn't exist.
    pub create_if_missing: bool,
    /// Enforce foreign key constraints.
    pub foreign_keys: bool,
    /// How long to wait on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_URL),
            create_if_missing: true,
            foreign_keys: true,
            busy_timeout_ms: 5_000,
        }
    }
}

impl ConnectionConfig {
    /// Creates a config for `url` with default settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Reads the URL from `DATABASE_URL`, falling back to the in-memory
    /// default.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("DATABASE_URL").map_or_else(|_| Self::default(), Self::new)
    }

    /// Sets whether a missing database file is created.
    #[must_use]
    pub const fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets whether foreign keys are enforced.
    #[must_use]
    pub const fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn busy_timeout_ms(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = millis;
        self
    }

    /// Returns the busy timeout as a [`Duration`].
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
        assert!(config.create_if_missing);
        assert!(config.foreign_keys);
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_deserialize_fills_missing_fields() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"url": "sqlite:blog.db", "foreign_keys": false}"#).unwrap();
        assert_eq!(config.url, "sqlite:blog.db");
        assert!(!config.foreign_keys);
        assert!(config.create_if_missing);
        assert_eq!(config.busy_timeout_ms, 5_000);

        let config: ConnectionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ConnectionConfig::default());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("DATABASE_URL", "sqlite:from-env.db");
        let config = ConnectionConfig::from_env();
        assert_eq!(config.url, "sqlite:from-env.db");
        assert!(config.foreign_keys);

        std::env::remove_var("DATABASE_URL");
        assert_eq!(ConnectionConfig::from_env(), ConnectionConfig::default());
    }

    #[test]
    fn test_builder_methods() {
        let config = ConnectionConfig::new("sqlite:x.db")
            .create_if_missing(false)
            .busy_timeout_ms(250);
        assert!(!config.create_if_missing);
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
    }
}
