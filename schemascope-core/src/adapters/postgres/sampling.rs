//! Row counts and sample rows.
//!
//! Samples are fetched as `row_to_json(t)::text` and decoded with
//! `serde_json` (with `preserve_order`), which keeps the table's column order
//! without knowing the column types up front. `arbitrary_precision` keeps
//! number text as the server wrote it, so `numeric` values keep their scale
//! and never pass through `f64`.

use super::PostgresCatalog;
use crate::Result;
use crate::adapters::helpers::{count_to_u64, qualified_name};
use crate::error::InspectorError;
use crate::models::{SampleData, SampleRow};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

impl PostgresCatalog {
    /// Exact `COUNT(*)` of `schema.table`.
    pub(crate) async fn count_rows(&self, schema: &str, table: &str) -> Result<u64> {
        let count_query = format!("SELECT COUNT(*) FROM {}", qualified_name(schema, table));

        let count: i64 = sqlx::query_scalar(&count_query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                InspectorError::from_sqlx(
                    format!("Failed to count rows of table '{}.{}'", schema, table),
                    e,
                )
            })?;

        count_to_u64(count, "count")
    }

    /// Fetches up to `limit` rows of `schema.table` in whatever order the
    /// server returns them.
    pub(crate) async fn sample_table(
        &self,
        schema: &str,
        table: &str,
        limit: u32,
    ) -> Result<SampleData> {
        let sample_query = format!(
            "SELECT row_to_json(t)::text AS row_data FROM (SELECT * FROM {} LIMIT $1) t",
            qualified_name(schema, table)
        );

        debug!(
            "Sampling {}.{} with query: {} (limit: {})",
            schema, table, sample_query, limit
        );

        let rows: Vec<String> = sqlx::query_scalar(&sample_query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                InspectorError::from_sqlx(
                    format!("Failed to sample data from table '{}.{}'", schema, table),
                    e,
                )
            })?;

        decode_sample(&rows, table)
    }
}

/// Turns `row_to_json` output into a [`SampleData`].
///
/// Column names come from the first row; every row of one query has the
/// same keys in the same order.
pub(super) fn decode_sample(rows: &[String], table: &str) -> Result<SampleData> {
    let mut sample = SampleData::default();

    for raw in rows {
        let object: Map<String, JsonValue> = serde_json::from_str(raw)
            .map_err(|e| InspectorError::parse_field("row_data", Some(table), e))?;

        if sample.columns.is_empty() {
            sample.columns = object.keys().cloned().collect();
        }

        let row: SampleRow = object.into_iter().map(|(_, value)| cell_text(value)).collect();
        sample.rows.push(row);
    }

    Ok(sample)
}

/// Display text of one JSON cell; `None` for SQL NULL.
///
/// Numbers print exactly as they appeared in the JSON text.
fn cell_text(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}
