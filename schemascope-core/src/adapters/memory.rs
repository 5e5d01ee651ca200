//! In-memory catalog for tests and dry runs.
//!
//! Tables are declared up front with their columns, indexes and rows. The two
//! domain listings are computed from the `products` and `orders` rows with
//! the same ordering rules PostgreSQL applies (`NULLS LAST` on ascending
//! sorts). Any call can be made to fail, and every call is recorded.

use super::CatalogSource;
use super::config::{ORDERS_TABLE, PRODUCTS_TABLE};
use crate::error::InspectorError;
use crate::models::{
    ColumnDescriptor, IndexDescriptor, OrderNameCount, OrderNameFrequency, Product,
    ProductListing, SampleData, SampleRow, SchemaTableIndex,
};
use crate::{Result, adapters::helpers::qualified_name};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Mutex, PoisonError};

/// A call made against [`InMemoryCatalog`], used for recording and for
/// failure injection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogCall {
    /// [`CatalogSource::list_base_tables`]
    ListBaseTables,
    /// [`CatalogSource::columns`] for a table
    Columns(String),
    /// [`CatalogSource::indexes`] for a table
    Indexes(String),
    /// [`CatalogSource::row_count`] for a table
    RowCount(String),
    /// [`CatalogSource::sample_rows`] for a table
    SampleRows(String),
    /// [`CatalogSource::products`]
    Products,
    /// [`CatalogSource::order_name_frequencies`]
    OrderNameFrequencies,
    /// [`CatalogSource::close`]
    Close,
}

impl CatalogCall {
    /// Table the call targets, if it targets one.
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Columns(table)
            | Self::Indexes(table)
            | Self::RowCount(table)
            | Self::SampleRows(table) => Some(table),
            Self::Products => Some(PRODUCTS_TABLE),
            Self::OrderNameFrequencies => Some(ORDERS_TABLE),
            Self::ListBaseTables | Self::Close => None,
        }
    }
}

/// One table served by [`InMemoryCatalog`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTable {
    name: String,
    columns: Vec<ColumnDescriptor>,
    indexes: Vec<IndexDescriptor>,
    rows: Vec<SampleRow>,
}

impl InMemoryTable {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Appends a column. Row cells follow column order.
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends an index.
    pub fn index(mut self, name: impl Into<String>, definition: impl Into<String>) -> Self {
        self.indexes.push(IndexDescriptor::new(name, definition));
        self
    }

    /// Appends a row; `None` cells are SQL NULL.
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|cell| cell.map(Into::into)).collect());
        self
    }

    fn column_position(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| {
                InspectorError::query_execution(format!(
                    "column \"{}\" does not exist in \"{}\"",
                    column, self.name
                ))
            })
    }

    fn cell(row: &SampleRow, position: usize) -> Option<String> {
        row.get(position).cloned().flatten()
    }
}

/// [`CatalogSource`] backed by tables held in memory.
///
/// # Example
/// ```rust
/// use schemascope_core::adapters::{CatalogSource, InMemoryCatalog, InMemoryTable};
/// use schemascope_core::models::ColumnDescriptor;
///
/// # async fn example() -> schemascope_core::Result<()> {
/// let catalog = InMemoryCatalog::new("playauto_platform").with_table(
///     InMemoryTable::new("products")
///         .column(ColumnDescriptor::new("product_code", "character varying").primary_key())
///         .column(ColumnDescriptor::new("product_name", "character varying"))
///         .row([Some("A1"), Some("Widget")]),
/// );
///
/// let listing = catalog.products("playauto_platform").await?;
/// assert_eq!(listing.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    schema: String,
    tables: BTreeMap<String, InMemoryTable>,
    failures: HashSet<CatalogCall>,
    calls: Mutex<Vec<CatalogCall>>,
    close_count: AtomicUsize,
}

impl InMemoryCatalog {
    /// Creates a catalog with an empty `schema`.
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Default::default()
        }
    }

    /// Adds a base table to the schema.
    pub fn with_table(mut self, table: InMemoryTable) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Makes `call` fail every time it is made.
    pub fn fail_on(mut self, call: CatalogCall) -> Self {
        self.failures.insert(call);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls that targeted `table`.
    pub fn calls_for(&self, table: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.table() == Some(table))
            .count()
    }

    /// How many times [`CatalogSource::close`] was called.
    pub fn close_count(&self) -> usize {
        self.close_count.load(AtomicOrdering::SeqCst)
    }

    fn record(&self, call: CatalogCall) -> Result<()> {
        let injected = self.failures.contains(&call);
        let description = format!("{:?}", call);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if injected {
            return Err(InspectorError::query_execution(format!(
                "injected failure for {}",
                description
            )));
        }
        Ok(())
    }

    fn table(&self, schema: &str, table: &str) -> Option<&InMemoryTable> {
        if schema == self.schema {
            self.tables.get(table)
        } else {
            None
        }
    }

    fn existing_table(&self, schema: &str, table: &str) -> Result<&InMemoryTable> {
        self.table(schema, table).ok_or_else(|| {
            InspectorError::query_execution(format!(
                "relation {} does not exist",
                qualified_name(schema, table)
            ))
        })
    }
}

/// Ascending order with NULLs last, as PostgreSQL sorts by default.
fn nulls_last(a: Option<&String>, b: Option<&String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn list_base_tables(&self, schema: &str) -> Result<SchemaTableIndex> {
        self.record(CatalogCall::ListBaseTables)?;
        if schema != self.schema {
            return Ok(SchemaTableIndex::default());
        }
        Ok(self.tables.keys().cloned().collect())
    }

    async fn columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.record(CatalogCall::Columns(table.to_string()))?;
        Ok(self
            .table(schema, table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn indexes(&self, schema: &str, table: &str) -> Result<Vec<IndexDescriptor>> {
        self.record(CatalogCall::Indexes(table.to_string()))?;
        Ok(self
            .table(schema, table)
            .map(|t| t.indexes.clone())
            .unwrap_or_default())
    }

    async fn row_count(&self, schema: &str, table: &str) -> Result<u64> {
        self.record(CatalogCall::RowCount(table.to_string()))?;
        let table = self.existing_table(schema, table)?;
        Ok(u64::try_from(table.rows.len()).unwrap_or(u64::MAX))
    }

    async fn sample_rows(&self, schema: &str, table: &str, limit: u32) -> Result<SampleData> {
        self.record(CatalogCall::SampleRows(table.to_string()))?;
        let table = self.existing_table(schema, table)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(SampleData {
            columns: table.columns.iter().map(|c| c.name.clone()).collect(),
            rows: table.rows.iter().take(limit).cloned().collect(),
        })
    }

    async fn products(&self, schema: &str) -> Result<ProductListing> {
        self.record(CatalogCall::Products)?;
        let table = self.existing_table(schema, PRODUCTS_TABLE)?;
        let code_at = table.column_position("product_code")?;
        let name_at = table.column_position("product_name")?;

        let mut products: Vec<Product> = table
            .rows
            .iter()
            .map(|row| Product {
                code: InMemoryTable::cell(row, code_at),
                name: InMemoryTable::cell(row, name_at),
            })
            .collect();
        products.sort_by(|a, b| nulls_last(a.code.as_ref(), b.code.as_ref()));

        Ok(ProductListing { products })
    }

    async fn order_name_frequencies(
        &self,
        schema: &str,
        limit: u32,
    ) -> Result<OrderNameFrequency> {
        self.record(CatalogCall::OrderNameFrequencies)?;
        let table = self.existing_table(schema, ORDERS_TABLE)?;
        let sale_at = table.column_position("shop_sale_name")?;
        let option_at = table.column_position("shop_opt_name")?;

        let mut counts: BTreeMap<(String, Option<String>), u64> = BTreeMap::new();
        for row in &table.rows {
            if let Some(sale_name) = InMemoryTable::cell(row, sale_at) {
                let option_name = InMemoryTable::cell(row, option_at);
                let count = counts.entry((sale_name, option_name)).or_insert(0);
                *count = count.saturating_add(1);
            }
        }

        let mut entries: Vec<OrderNameCount> = counts
            .into_iter()
            .map(|((sale_name, option_name), count)| OrderNameCount {
                sale_name,
                option_name,
                count,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.sale_name.cmp(&b.sale_name))
                .then_with(|| nulls_last(a.option_name.as_ref(), b.option_name.as_ref()))
        });
        entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(OrderNameFrequency { entries })
    }

    async fn close(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CatalogCall::Close);
        self.close_count.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "playauto_platform";

    fn products_table() -> InMemoryTable {
        InMemoryTable::new("products")
            .column(ColumnDescriptor::new("product_code", "character varying").primary_key())
            .column(ColumnDescriptor::new("product_name", "character varying"))
    }

    fn orders_table() -> InMemoryTable {
        InMemoryTable::new("orders")
            .column(ColumnDescriptor::new("id", "integer").primary_key())
            .column(ColumnDescriptor::new("shop_sale_name", "text"))
            .column(ColumnDescriptor::new("shop_opt_name", "text"))
    }

    #[tokio::test]
    async fn test_list_base_tables_only_for_own_schema() {
        let catalog = InMemoryCatalog::new(SCHEMA).with_table(products_table());

        let index = catalog.list_base_tables(SCHEMA).await.unwrap();
        assert!(index.contains("products"));

        let other = catalog.list_base_tables("public").await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_products_sorted_with_nulls_last() {
        let catalog = InMemoryCatalog::new(SCHEMA).with_table(
            products_table()
                .row([Some("C3"), Some("Gizmo")])
                .row([None, Some("Orphan")])
                .row([Some("A1"), Some("Widget")]),
        );

        let listing = catalog.products(SCHEMA).await.unwrap();
        let codes: Vec<Option<&str>> = listing
            .products
            .iter()
            .map(|p| p.code.as_deref())
            .collect();
        assert_eq!(codes, vec![Some("A1"), Some("C3"), None]);
    }

    #[tokio::test]
    async fn test_order_frequencies_group_count_and_cap() {
        let mut table = orders_table();
        for id in 0..5 {
            table = table.row([Some(id.to_string()), Some("Coffee".to_string()), None]);
        }
        for id in 5..8 {
            table = table.row([
                Some(id.to_string()),
                Some("Tea".to_string()),
                Some("Large".to_string()),
            ]);
        }
        table = table.row([Some("8".to_string()), None, Some("Ignored".to_string())]);
        let catalog = InMemoryCatalog::new(SCHEMA).with_table(table);

        let frequency = catalog.order_name_frequencies(SCHEMA, 30).await.unwrap();
        assert_eq!(frequency.len(), 2);
        assert_eq!(frequency.entries[0].sale_name, "Coffee");
        assert_eq!(frequency.entries[0].count, 5);
        assert_eq!(frequency.entries[1].option_name.as_deref(), Some("Large"));

        let capped = catalog.order_name_frequencies(SCHEMA, 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_table_count_fails_like_postgres() {
        let catalog = InMemoryCatalog::new(SCHEMA);
        let error = catalog.row_count(SCHEMA, "shops").await.unwrap_err();
        assert!(error.to_string().contains("does not exist"));
        assert!(catalog.columns(SCHEMA, "shops").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let catalog = InMemoryCatalog::new(SCHEMA)
            .with_table(products_table())
            .fail_on(CatalogCall::RowCount("products".to_string()));

        assert!(catalog.row_count(SCHEMA, "products").await.is_err());
        assert_eq!(
            catalog.calls(),
            vec![CatalogCall::RowCount("products".to_string())]
        );
        assert_eq!(catalog.calls_for("products"), 1);
    }

    #[tokio::test]
    async fn test_close_is_counted() {
        let catalog = InMemoryCatalog::new(SCHEMA);
        catalog.close().await;
        assert_eq!(catalog.close_count(), 1);
        assert_eq!(catalog.calls(), vec![CatalogCall::Close]);
    }
}
