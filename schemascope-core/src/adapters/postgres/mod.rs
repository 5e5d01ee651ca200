//! PostgreSQL catalog backed by a single-connection sqlx pool.
//!
//! # Module Structure
//! - `connection`: URL parsing, session setup and pool lifecycle
//! - `schema_collection`: table listing, columns with primary key membership, indexes
//! - `sampling`: row counts and sample rows
//! - `listings`: the product and order name frequency listings
//!
//! # Security Guarantees
//! - Sessions are opened read-only unless configured otherwise
//! - Identifiers are quoted, values are bound
//! - Passwords never leave [`crate::security::Credentials`]

mod connection;
mod listings;
mod sampling;
mod schema_collection;


use super::{CatalogSource, ConnectionConfig};
use crate::Result;
use crate::models::{
    ColumnDescriptor, IndexDescriptor, OrderNameFrequency, ProductListing, SampleData,
    SchemaTableIndex,
};
use async_trait::async_trait;
use sqlx::PgPool;

/// `application_name` reported to the server for every session.
pub const APPLICATION_NAME: &str = concat!("schemascope-", env!("CARGO_PKG_VERSION"));

/// Catalog that queries a live PostgreSQL server.
pub struct PostgresCatalog {
    pool: PgPool,
    config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCatalog")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("closed", &self.pool.is_closed())
            .finish()
    }
}

impl PostgresCatalog {
    /// Connection settings this catalog was opened with.
    pub fn connection_config(&self) -> &ConnectionConfig {
        &self.config
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalog {
    async fn list_base_tables(&self, schema: &str) -> Result<SchemaTableIndex> {
        self.list_base_tables_in(schema).await
    }

    async fn columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.collect_table_columns(schema, table).await
    }

    async fn indexes(&self, schema: &str, table: &str) -> Result<Vec<IndexDescriptor>> {
        self.collect_table_indexes(schema, table).await
    }

    async fn row_count(&self, schema: &str, table: &str) -> Result<u64> {
        self.count_rows(schema, table).await
    }

    async fn sample_rows(&self, schema: &str, table: &str, limit: u32) -> Result<SampleData> {
        self.sample_table(schema, table, limit).await
    }

    async fn products(&self, schema: &str) -> Result<ProductListing> {
        self.list_products(schema).await
    }

    async fn order_name_frequencies(
        &self,
        schema: &str,
        limit: u32,
    ) -> Result<OrderNameFrequency> {
        self.list_order_name_frequencies(schema, limit).await
    }

    async fn close(&self) {
        self.close_pool().await;
    }
}
