//! Catalog queries: base tables, columns and indexes.

use super::PostgresCatalog;
use crate::Result;
use crate::adapters::helpers::RowExt;
use crate::error::InspectorError;
use crate::models::{ColumnDescriptor, IndexDescriptor, SchemaTableIndex};
use tracing::debug;

impl PostgresCatalog {
    /// Lists every base table (views excluded) in `schema`, sorted by name.
    pub(crate) async fn list_base_tables_in(&self, schema: &str) -> Result<SchemaTableIndex> {
        let tables_query = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = $1
            AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let table_rows = sqlx::query(tables_query)
            .bind(schema)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                InspectorError::from_sqlx(format!("Failed to list tables in schema '{}'", schema), e)
            })?;

        let mut names = Vec::with_capacity(table_rows.len());
        for row in &table_rows {
            let name: String = row.get_field("table_name", None)?;
            names.push(name);
        }

        debug!("Found {} base tables in schema '{}'", names.len(), schema);
        Ok(names.into_iter().collect())
    }

    /// Collects columns of `schema.table` by ordinal position, with primary
    /// key membership.
    pub(crate) async fn collect_table_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        let columns_query = r#"
            SELECT
                c.column_name::text AS column_name,
                c.data_type::text AS data_type,
                c.character_maximum_length::integer AS character_maximum_length,
                c.is_nullable::text AS is_nullable,
                c.column_default::text AS column_default,
                (pk.column_name IS NOT NULL) AS is_primary_key
            FROM information_schema.columns c
            LEFT JOIN (
                SELECT kcu.column_name
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                    AND tc.table_name = kcu.table_name
                WHERE tc.constraint_type = 'PRIMARY KEY'
                AND tc.table_schema = $1
                AND tc.table_name = $2
            ) pk ON c.column_name = pk.column_name
            WHERE c.table_schema = $1
            AND c.table_name = $2
            ORDER BY c.ordinal_position
        "#;

        let column_rows = sqlx::query(columns_query)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                InspectorError::from_sqlx(
                    format!("Failed to collect columns for table '{}.{}'", schema, table),
                    e,
                )
            })?;

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            let name: String = row.get_field("column_name", Some(table))?;
            let data_type: String = row.get_field("data_type", Some(table))?;
            let max_length: Option<i32> = row.get_field("character_maximum_length", Some(table))?;
            let is_nullable: String = row.get_field("is_nullable", Some(table))?;
            let default_expression: Option<String> =
                row.get_field("column_default", Some(table))?;
            let is_primary_key: bool = row.get_field("is_primary_key", Some(table))?;

            columns.push(ColumnDescriptor {
                name,
                declared_type: data_type,
                max_length: max_length.and_then(|len| u32::try_from(len).ok()),
                nullable: is_nullable == "YES",
                default_expression,
                is_primary_key,
            });
        }

        debug!(
            "Collected {} columns for table '{}.{}'",
            columns.len(),
            schema,
            table
        );
        Ok(columns)
    }

    /// Collects index names and definitions of `schema.table` as the catalog
    /// returns them.
    pub(crate) async fn collect_table_indexes(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<IndexDescriptor>> {
        let idx_query = r#"
            SELECT
                indexname::text AS index_name,
                indexdef AS index_definition
            FROM pg_indexes
            WHERE schemaname = $1
            AND tablename = $2
        "#;

        let idx_rows = sqlx::query(idx_query)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                InspectorError::from_sqlx(
                    format!("Failed to collect indexes for table '{}.{}'", schema, table),
                    e,
                )
            })?;

        let mut indexes = Vec::with_capacity(idx_rows.len());
        for row in &idx_rows {
            let name: String = row.get_field("index_name", Some(table))?;
            let definition: String = row.get_field("index_definition", Some(table))?;
            indexes.push(IndexDescriptor { name, definition });
        }

        Ok(indexes)
    }
}
