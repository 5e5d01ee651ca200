//! Per-table aggregation.
//!
//! [`inspect_table`] turns the four informational queries for one table into
//! a [`TableReport`]. Failures are absorbed as [`BestEffort::Unavailable`];
//! nothing here propagates an error.

use crate::adapters::CatalogSource;
use crate::models::{BestEffort, SchemaTableIndex, TableReport};
use tracing::{debug, info};

/// Builds the report section data for one target table.
///
/// A table missing from `index` yields [`TableReport::missing`] without
/// touching the catalog. Otherwise the row count, columns, indexes and
/// sample are queried one after another.
///
/// # Example
/// ```rust
/// use schemascope_core::adapters::{InMemoryCatalog, InMemoryTable};
/// use schemascope_core::inspect::inspect_table;
/// use schemascope_core::models::SchemaTableIndex;
///
/// # async fn example() {
/// let catalog = InMemoryCatalog::new("playauto_platform")
///     .with_table(InMemoryTable::new("orders"));
/// let index: SchemaTableIndex = ["orders"].into_iter().collect();
///
/// let report = inspect_table(&catalog, "playauto_platform", &index, "shops", 3).await;
/// assert!(!report.exists);
/// # }
/// ```
pub async fn inspect_table<C>(
    catalog: &C,
    schema: &str,
    index: &SchemaTableIndex,
    table: &str,
    sample_limit: u32,
) -> TableReport
where
    C: CatalogSource + ?Sized,
{
    if !index.contains(table) {
        info!("Table {}.{} does not exist", schema, table);
        return TableReport::missing(table);
    }

    debug!("Inspecting table {}.{}", schema, table);

    let row_count = BestEffort::from_result(
        catalog.row_count(schema, table).await,
        &format!("row count for {}", table),
    );
    let columns = BestEffort::from_result(
        catalog.columns(schema, table).await,
        &format!("columns of {}", table),
    );
    let indexes = BestEffort::from_result(
        catalog.indexes(schema, table).await,
        &format!("indexes of {}", table),
    );
    if let Some(indexes) = indexes.value() {
        for index in indexes {
            debug!("Index {}: {}", index.name, index.definition);
        }
    }
    let sample = BestEffort::from_result(
        catalog.sample_rows(schema, table, sample_limit).await,
        &format!("sample rows of {}", table),
    );

    TableReport {
        table_name: table.to_string(),
        exists: true,
        row_count,
        columns,
        indexes,
        sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{CatalogCall, InMemoryCatalog, InMemoryTable};
    use crate::models::ColumnDescriptor;

    const SCHEMA: &str = "playauto_platform";

    fn shops() -> InMemoryTable {
        InMemoryTable::new("shops")
            .column(ColumnDescriptor::new("shop_id", "integer").primary_key())
            .column(ColumnDescriptor::new("shop_name", "character varying").with_max_length(100))
            .index("shops_pkey", "CREATE UNIQUE INDEX shops_pkey ON playauto_platform.shops USING btree (shop_id)")
            .row([Some("1"), Some("Main")])
            .row([Some("2"), Some("Outlet")])
            .row([Some("3"), None])
            .row([Some("4"), Some("Pop-up")])
    }

    async fn index_of(catalog: &InMemoryCatalog) -> SchemaTableIndex {
        catalog.list_base_tables(SCHEMA).await.unwrap()
    }

    #[tokio::test]
    async fn test_missing_table_issues_no_queries() {
        let catalog = InMemoryCatalog::new(SCHEMA).with_table(shops());
        let index = index_of(&catalog).await;

        let report = inspect_table(&catalog, SCHEMA, &index, "orders", 3).await;

        assert_eq!(report, TableReport::missing("orders"));
        assert_eq!(catalog.calls_for("orders"), 0);
    }

    #[tokio::test]
    async fn test_existing_table_is_fully_collected() {
        let catalog = InMemoryCatalog::new(SCHEMA).with_table(shops());
        let index = index_of(&catalog).await;

        let report = inspect_table(&catalog, SCHEMA, &index, "shops", 3).await;

        assert!(report.exists);
        assert_eq!(report.row_count, BestEffort::Available(4));
        assert_eq!(report.columns().len(), 2);
        assert_eq!(report.indexes().len(), 1);
        let sample = report.sample().unwrap();
        assert_eq!(sample.rows.len(), 3);
        assert_eq!(sample.rows[2][1], None);
    }

    #[tokio::test]
    async fn test_queries_run_in_order() {
        let catalog = InMemoryCatalog::new(SCHEMA).with_table(shops());
        let index = index_of(&catalog).await;

        inspect_table(&catalog, SCHEMA, &index, "shops", 3).await;

        let shop = || "shops".to_string();
        assert_eq!(
            catalog.calls(),
            vec![
                CatalogCall::ListBaseTables,
                CatalogCall::RowCount(shop()),
                CatalogCall::Columns(shop()),
                CatalogCall::Indexes(shop()),
                CatalogCall::SampleRows(shop()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_queries_degrade_independently() {
        let catalog = InMemoryCatalog::new(SCHEMA)
            .with_table(shops())
            .fail_on(CatalogCall::RowCount("shops".to_string()))
            .fail_on(CatalogCall::SampleRows("shops".to_string()));
        let index = index_of(&catalog).await;

        let report = inspect_table(&catalog, SCHEMA, &index, "shops", 3).await;

        assert!(!report.row_count.is_available());
        assert!(report.row_count.unavailable_reason().is_some());
        assert_eq!(report.row_count_or_zero(), 0);
        assert!(report.sample().is_none());
        assert_eq!(report.columns().len(), 2);
        assert_eq!(report.indexes().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_table_has_no_sample() {
        let catalog = InMemoryCatalog::new(SCHEMA).with_table(
            InMemoryTable::new("orders").column(ColumnDescriptor::new("id", "integer")),
        );
        let index = index_of(&catalog).await;

        let report = inspect_table(&catalog, SCHEMA, &index, "orders", 3).await;

        assert_eq!(report.row_count, BestEffort::Available(0));
        assert!(report.sample.is_available());
        assert!(report.sample().is_none());
    }
}
