//! Helper utilities shared by the catalog implementations.

use crate::{Result, error::InspectorError};
use sqlx::{Row, postgres::PgRow};

/// Extension trait for extracting typed values from database rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use schemascope_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("column_name", Some("shops"))?;
/// let length: Option<i32> = row.get_field("character_maximum_length", None)?;
/// ```
pub trait RowExt {
    /// Extracts a typed field from the row with proper error context.
    ///
    /// # Arguments
    /// * `field_name` - Name of the column to extract
    /// * `table_context` - Optional table name for error messages
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

impl RowExt for PgRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(field_name)
            .map_err(|e| InspectorError::parse_field(field_name, table_context, e))
    }
}

/// Quotes a PostgreSQL identifier.
///
/// Always quotes, so reserved words like `order` or `user` stay valid, and
/// doubles any embedded double quote.
///
/// # Example
/// ```rust
/// use schemascope_core::adapters::helpers::quote_ident;
///
/// assert_eq!(quote_ident("orders"), "\"orders\"");
/// assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
/// ```
pub fn quote_ident(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len().saturating_add(2));
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push_str("\"\"");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('"');
    quoted
}

/// Schema-qualified, quoted table reference: `"schema"."table"`.
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Converts a non-negative database count to `u64`.
pub(crate) fn count_to_u64(count: i64, what: &str) -> Result<u64> {
    u64::try_from(count).map_err(|e| InspectorError::parse_field(what, None, e))
}
