//! Catalog query layer.
//!
//! [`CatalogSource`] is the seam between the report pipeline and the database.
//! `PostgresCatalog` talks to a live server through sqlx; `InMemoryCatalog`
//! serves fixed tables for tests and dry runs.
//!
//! # Guarantees
//! - All operations are read-only (catalog views and `SELECT` only)
//! - Identifiers are quoted with [`helpers::quote_ident`], values are bound
//! - Credentials are never stored outside [`crate::security::Credentials`]

pub mod config;
pub mod helpers;
pub mod memory;
pub mod postgres;

pub use config::{ConnectionConfig, InspectionConfig};
pub use memory::{CatalogCall, InMemoryCatalog, InMemoryTable};
pub use postgres::PostgresCatalog;

use crate::Result;
use crate::models::{
    ColumnDescriptor, IndexDescriptor, OrderNameFrequency, ProductListing, SampleData,
    SchemaTableIndex,
};
use async_trait::async_trait;

/// Read-only access to one database's catalog and tables.
///
/// Every method returns the raw outcome. Callers decide which failures are
/// fatal: the run treats `list_base_tables` errors as fatal and wraps every
/// other result in [`crate::models::BestEffort`].
///
/// # Object Safety
/// The trait is object-safe, so `Box<dyn CatalogSource>` works.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Names of all base tables (views excluded) in `schema`.
    ///
    /// # Errors
    /// Returns error if the catalog cannot be queried; the run cannot continue.
    async fn list_base_tables(&self, schema: &str) -> Result<SchemaTableIndex>;

    /// Columns of `schema.table` ordered by ordinal position, with primary key
    /// membership. Empty when the table does not exist.
    async fn columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Indexes defined on `schema.table` in catalog order.
    async fn indexes(&self, schema: &str, table: &str) -> Result<Vec<IndexDescriptor>>;

    /// Exact `COUNT(*)` of `schema.table`.
    async fn row_count(&self, schema: &str, table: &str) -> Result<u64>;

    /// Up to `limit` rows of `schema.table`, columns in table order.
    async fn sample_rows(&self, schema: &str, table: &str, limit: u32) -> Result<SampleData>;

    /// Every `(product_code, product_name)` of `schema.products`, code ascending.
    async fn products(&self, schema: &str) -> Result<ProductListing>;

    /// The `limit` most frequent `(shop_sale_name, shop_opt_name)` pairs of
    /// `schema.orders`, ignoring NULL sale names, count descending.
    async fn order_name_frequencies(&self, schema: &str, limit: u32)
    -> Result<OrderNameFrequency>;

    /// Releases the underlying connection. Called exactly once per run.
    async fn close(&self);
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for std::sync::Arc<T> {
    async fn list_base_tables(&self, schema: &str) -> Result<SchemaTableIndex> {
        (**self).list_base_tables(schema).await
    }

    async fn columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        (**self).columns(schema, table).await
    }

    async fn indexes(&self, schema: &str, table: &str) -> Result<Vec<IndexDescriptor>> {
        (**self).indexes(schema, table).await
    }

    async fn row_count(&self, schema: &str, table: &str) -> Result<u64> {
        (**self).row_count(schema, table).await
    }

    async fn sample_rows(&self, schema: &str, table: &str, limit: u32) -> Result<SampleData> {
        (**self).sample_rows(schema, table, limit).await
    }

    async fn products(&self, schema: &str) -> Result<ProductListing> {
        (**self).products(schema).await
    }

    async fn order_name_frequencies(
        &self,
        schema: &str,
        limit: u32,
    ) -> Result<OrderNameFrequency> {
        (**self).order_name_frequencies(schema, limit).await
    }

    async fn close(&self) {
        (**self).close().await;
    }
}
