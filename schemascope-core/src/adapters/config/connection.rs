//! Database connection configuration.

use std::time::Duration;

/// PostgreSQL default port.
const DEFAULT_PORT: u16 = 5432;

/// Longest statement timeout accepted, one hour.
const MAX_STATEMENT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Configuration for the database connection.
///
/// # Security
/// This struct intentionally does NOT store passwords or credentials.
///
/// # Example
/// ```rust
/// use schemascope_core::adapters::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_port(5432)
///     .with_database("dashboard".to_string())
///     .with_username("postgres".to_string());
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.to_string(), "ConnectionConfig(localhost:5432/dashboard)");
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database name; the server default applies when absent
    pub database: Option<String>,
    /// Username (password handled separately)
    pub username: Option<String>,
    /// How long to wait for the connection to open
    pub connect_timeout: Duration,
    /// Session `statement_timeout`; `None` leaves queries unbounded
    pub statement_timeout: Option<Duration>,
    /// Whether to open the session read-only
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            database: None,
            username: None,
            connect_timeout: Duration::from_secs(30),
            statement_timeout: None,
            read_only: true,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}:{}{})",
            self.host,
            self.port,
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{}", db))
        )
        // Username and credentials are intentionally omitted
    }
}

impl ConnectionConfig {
    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid or unsafe
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::error::InspectorError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == 0 {
            return Err(crate::error::InspectorError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::InspectorError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if let Some(timeout) = self.statement_timeout {
            if timeout.is_zero() {
                return Err(crate::error::InspectorError::configuration(
                    "statement_timeout must be greater than 0 when set",
                ));
            }
            if timeout > MAX_STATEMENT_TIMEOUT {
                return Err(crate::error::InspectorError::configuration(
                    "statement_timeout should not exceed 3600 seconds",
                ));
            }
        }

        Ok(())
    }

    /// Creates a new connection config with safe defaults.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to set username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to bound every statement of the session.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.statement_timeout, None);
        assert!(config.read_only);
    }

    #[test]
    fn test_connection_config_validation() {
        let config = ConnectionConfig::new("localhost".to_string());
        assert!(config.validate().is_ok());

        let config = ConnectionConfig {
            host: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            connect_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig::default().with_statement_timeout(Duration::from_secs(7200));
        assert!(config.validate().is_err());

        let config = ConnectionConfig::default().with_statement_timeout(Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_config_builder() {
        let config = ConnectionConfig::new("db.example.com".to_string())
            .with_port(6543)
            .with_database("dashboard".to_string())
            .with_username("postgres".to_string());

        assert_eq!(config.host, "db.example.com");
        assert_eq!(config.port, 6543);
        assert_eq!(config.database, Some("dashboard".to_string()));
        assert_eq!(config.username, Some("postgres".to_string()));
    }

    #[test]
    fn test_display_omits_username() {
        let config = ConnectionConfig::new("localhost".to_string())
            .with_username("postgres".to_string());
        let display = config.to_string();
        assert_eq!(display, "ConnectionConfig(localhost:5432)");
        assert!(!display.contains("postgres"));
    }
}
