//! Connection setup for [`PostgresCatalog`].
//!
//! The pool is capped at one connection and opened eagerly, so a bad host or
//! bad credentials fail inside [`PostgresCatalog::connect`] rather than on the
//! first catalog query.

use super::{APPLICATION_NAME, ConnectionConfig, PostgresCatalog};
use crate::error::{InspectorError, redact_database_url};
use crate::security::Credentials;
use crate::Result;
use percent_encoding::percent_decode_str;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Role used when neither the URL nor the environment names one.
const DEFAULT_USERNAME: &str = "postgres";

/// Longest identifier PostgreSQL accepts without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

impl PostgresCatalog {
    /// Opens the single connection used for the whole run.
    ///
    /// # Security
    /// - Session is read-only when `config.read_only` is set
    /// - The password is handed to sqlx and not retained here
    ///
    /// # Errors
    /// Returns [`InspectorError::Connection`] if the server is unreachable,
    /// rejects the credentials or does not answer within
    /// `config.connect_timeout`.
    pub async fn connect(config: &ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;

        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(credentials.username())
            .application_name(APPLICATION_NAME);
        if let Some(database) = &config.database {
            options = options.database(database);
        }
        if let Some(password) = credentials.password() {
            options = options.password(password);
        }

        let statement_timeout = config.statement_timeout;
        let read_only = config.read_only;

        info!("Connecting to {}", config);
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(config.connect_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    use sqlx::Executor;

                    if let Some(timeout) = statement_timeout {
                        conn.execute(statement_timeout_sql(timeout).as_str())
                            .await?;
                    }
                    if read_only {
                        conn.execute("SET default_transaction_read_only = on")
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect_with(options)
            .await
            .map_err(|e| InspectorError::connection_failed(config, e))?;

        debug!("Connection established to {}", config);
        Ok(Self {
            pool,
            config: config.clone(),
        })
    }

    /// Closes the pool and its connection. Safe to call more than once.
    pub(super) async fn close_pool(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            debug!("Connection to {} closed", self.config);
        }
    }

    /// Splits a `postgres://` URL into connection settings and credentials.
    ///
    /// Percent-encoded user names and passwords are decoded. The
    /// `connect_timeout` (seconds) and `statement_timeout` (milliseconds)
    /// query parameters are honoured; other parameters are ignored.
    ///
    /// # Errors
    /// Returns [`InspectorError::Configuration`] if the URL is malformed, uses
    /// another scheme, has no host or names an invalid database.
    pub fn parse_connection_url(connection_url: &str) -> Result<(ConnectionConfig, Credentials)> {
        let url = Url::parse(connection_url).map_err(|e| {
            InspectorError::configuration(format!(
                "Invalid PostgreSQL connection string {}: {}",
                redact_database_url(connection_url),
                e
            ))
        })?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(InspectorError::configuration(
                "Connection string must use postgres:// or postgresql:// scheme",
            ));
        }

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| InspectorError::configuration("Connection string must specify a host"))?;

        let mut config = ConnectionConfig::new(host.to_string());
        if let Some(port) = url.port() {
            config = config.with_port(port);
        }

        let database = decode_component(url.path().trim_start_matches('/'), "database name")?;
        if !database.is_empty() {
            if database.chars().count() > MAX_IDENTIFIER_LEN {
                return Err(InspectorError::configuration(
                    "Database name too long: maximum 63 characters",
                ));
            }
            config = config.with_database(database);
        }

        let username = decode_component(url.username(), "username")?;
        let username = if username.is_empty() {
            DEFAULT_USERNAME.to_string()
        } else {
            username
        };
        config = config.with_username(username.clone());

        let password = url
            .password()
            .map(|password| decode_component(password, "password"))
            .transpose()?;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "connect_timeout" => {
                    if let Ok(secs) = value.parse::<u64>()
                        && secs > 0
                    {
                        config = config.with_connect_timeout(Duration::from_secs(secs));
                    }
                }
                "statement_timeout" => {
                    if let Ok(millis) = value.parse::<u64>()
                        && millis > 0
                    {
                        config = config.with_statement_timeout(Duration::from_millis(millis));
                    }
                }
                _ => {}
            }
        }

        config.validate()?;
        Ok((config, Credentials::new(username, password)))
    }
}

fn decode_component(raw: &str, what: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| InspectorError::configuration(format!("{} is not valid UTF-8", what)))
}

/// `SET statement_timeout` for a session, in milliseconds.
pub(super) fn statement_timeout_sql(timeout: Duration) -> String {
    format!("SET statement_timeout = {}", timeout.as_millis())
}
