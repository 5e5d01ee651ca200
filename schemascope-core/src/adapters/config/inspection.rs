//! What a single run inspects.

use super::ConnectionConfig;
use crate::security::Credentials;

/// Schema inspected when none is configured.
pub const DEFAULT_SCHEMA: &str = "playauto_platform";

/// Target tables in report order.
pub const DEFAULT_TARGET_TABLES: [&str; 3] = ["shops", "orders", "products"];

/// Rows sampled per existing target table.
pub const DEFAULT_SAMPLE_LIMIT: u32 = 3;

/// Entries kept in the order name frequency listing.
pub const DEFAULT_FREQUENCY_LIMIT: u32 = 30;

/// Table the product listing reads from.
pub const PRODUCTS_TABLE: &str = "products";

/// Table the order name frequency listing reads from.
pub const ORDERS_TABLE: &str = "orders";

/// Complete, explicit configuration of one inspection run.
///
/// # Example
/// ```rust
/// use schemascope_core::adapters::{ConnectionConfig, InspectionConfig};
/// use schemascope_core::security::Credentials;
///
/// let config = InspectionConfig::new(
///     ConnectionConfig::new("localhost".to_string()),
///     Credentials::new("postgres".to_string(), None),
/// );
/// assert_eq!(config.schema, "playauto_platform");
/// assert_eq!(config.target_tables, vec!["shops", "orders", "products"]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct InspectionConfig {
    pub connection: ConnectionConfig,
    pub credentials: Credentials,
    /// Schema whose tables are inspected
    pub schema: String,
    /// Tables reported on, in order
    pub target_tables: Vec<String>,
    /// Rows sampled per table
    pub sample_limit: u32,
    /// Cap on the order name frequency listing
    pub frequency_limit: u32,
}

impl InspectionConfig {
    /// Creates a config with the default schema, targets and limits.
    pub fn new(connection: ConnectionConfig, credentials: Credentials) -> Self {
        Self {
            connection,
            credentials,
            schema: DEFAULT_SCHEMA.to_string(),
            target_tables: DEFAULT_TARGET_TABLES.iter().map(ToString::to_string).collect(),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            frequency_limit: DEFAULT_FREQUENCY_LIMIT,
        }
    }

    /// Builder method to set the schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Builder method to replace the target tables.
    pub fn with_target_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the per-table sample size.
    pub fn with_sample_limit(mut self, limit: u32) -> Self {
        self.sample_limit = limit;
        self
    }

    /// Builder method to set the frequency listing cap.
    pub fn with_frequency_limit(mut self, limit: u32) -> Self {
        self.frequency_limit = limit;
        self
    }

    /// Validates the run configuration, including the connection part.
    ///
    /// # Errors
    /// Returns error if any value would make the run meaningless
    pub fn validate(&self) -> crate::Result<()> {
        self.connection.validate()?;

        if self.schema.trim().is_empty() {
            return Err(crate::error::InspectorError::configuration(
                "schema cannot be empty",
            ));
        }

        if self.target_tables.is_empty() {
            return Err(crate::error::InspectorError::configuration(
                "at least one target table is required",
            ));
        }

        if self.target_tables.iter().any(|t| t.trim().is_empty()) {
            return Err(crate::error::InspectorError::configuration(
                "target table names cannot be empty",
            ));
        }

        if self.sample_limit == 0 {
            return Err(crate::error::InspectorError::configuration(
                "sample_limit must be greater than 0",
            ));
        }

        if self.frequency_limit == 0 {
            return Err(crate::error::InspectorError::configuration(
                "frequency_limit must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InspectionConfig {
        InspectionConfig::new(
            ConnectionConfig::new("localhost".to_string()),
            Credentials::new("postgres".to_string(), Some("secret".to_string())),
        )
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.schema, DEFAULT_SCHEMA);
        assert_eq!(config.target_tables, DEFAULT_TARGET_TABLES);
        assert_eq!(config.sample_limit, 3);
        assert_eq!(config.frequency_limit, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_values() {
        assert!(config().with_schema(" ").validate().is_err());
        assert!(
            config()
                .with_target_tables(Vec::<String>::new())
                .validate()
                .is_err()
        );
        assert!(config().with_target_tables(["shops", ""]).validate().is_err());
        assert!(config().with_sample_limit(0).validate().is_err());
        assert!(config().with_frequency_limit(0).validate().is_err());
    }

    #[test]
    fn test_debug_does_not_leak_password() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("secret"));
    }
}
