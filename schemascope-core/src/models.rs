//! Data models for the inspection report.
//!
//! Every model is a transient, read-only projection of the live schema. Each
//! value is built once by the catalog layer or the aggregator, consumed by the
//! renderer and then dropped.

use std::collections::BTreeSet;

/// Column metadata joined with primary key membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Type as reported by `information_schema.columns.data_type`
    pub declared_type: String,
    /// `character_maximum_length`, present for bounded character types
    pub max_length: Option<u32>,
    pub nullable: bool,
    /// Default expression exactly as the catalog stores it
    pub default_expression: Option<String>,
    pub is_primary_key: bool,
}

impl ColumnDescriptor {
    /// Creates a nullable, non-key column with no default.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            max_length: None,
            nullable: true,
            default_expression: None,
            is_primary_key: false,
        }
    }

    /// Builder method to set the maximum character length.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Builder method to set the default expression.
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_expression = Some(expression.into());
        self
    }

    /// Builder method to mark the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Builder method to mark the column as part of the primary key.
    ///
    /// Primary key columns are always `NOT NULL`.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Type label shown in the report: `base` or `base(max_length)`.
    pub fn type_label(&self) -> String {
        match self.max_length {
            Some(length) => format!("{}({})", self.declared_type, length),
            None => self.declared_type.clone(),
        }
    }
}

/// Index name plus its full `CREATE INDEX` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub name: String,
    pub definition: String,
}

impl IndexDescriptor {
    /// Creates an index descriptor.
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }
}

/// One sampled row. Cells line up with [`SampleData::columns`]; `None` is SQL NULL.
pub type SampleRow = Vec<Option<String>>;

/// A bounded sample of a table's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleData {
    /// Column names in table order
    pub columns: Vec<String>,
    pub rows: Vec<SampleRow>,
}

impl SampleData {
    /// Returns true when no rows were sampled.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates `(column, value)` pairs of one row in column order.
    pub fn cells<'a>(
        &'a self,
        row: &'a SampleRow,
    ) -> impl Iterator<Item = (&'a str, Option<&'a str>)> + 'a {
        self.columns
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.as_str(), value.as_deref()))
    }
}

/// Set of base-table names in the target schema.
///
/// Fetched once per run. Iteration is sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTableIndex {
    tables: BTreeSet<String>,
}

impl SchemaTableIndex {
    /// Returns true if the schema contains a base table with this name.
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// Iterates table names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }

    /// Number of base tables in the schema.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the schema has no base tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SchemaTableIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of an informational query that is allowed to fail.
///
/// The report renders `Unavailable` the same way as an empty or zero result,
/// but the distinction stays visible to callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    /// The query succeeded
    Available(T),
    /// The query failed and its result was replaced by a fallback
    Unavailable { reason: String },
}

impl<T> BestEffort<T> {
    /// Converts a query result, logging and absorbing the error.
    ///
    /// `what` names the query in the warning, e.g. `"row count for shops"`.
    pub fn from_result(result: crate::Result<T>, what: &str) -> Self {
        match result {
            Ok(value) => Self::Available(value),
            Err(e) => {
                tracing::warn!("{} unavailable: {}", what, e);
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Returns true if the query succeeded.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Borrows the value if the query succeeded.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    /// Returns the failure reason if the query failed.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T: Default> BestEffort<T> {
    /// Takes the value, or the type's empty/zero value if the query failed.
    pub fn into_value_or_default(self) -> T {
        match self {
            Self::Available(value) => value,
            Self::Unavailable { .. } => T::default(),
        }
    }
}

impl<T: Default> Default for BestEffort<T> {
    fn default() -> Self {
        Self::Available(T::default())
    }
}

/// Everything the report shows for one target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table_name: String,
    pub exists: bool,
    pub row_count: BestEffort<u64>,
    /// Ordered by ordinal position
    pub columns: BestEffort<Vec<ColumnDescriptor>>,
    /// Catalog return order
    pub indexes: BestEffort<Vec<IndexDescriptor>>,
    pub sample: BestEffort<SampleData>,
}

impl TableReport {
    /// Report for a target table that is not in the schema.
    pub fn missing(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            exists: false,
            row_count: BestEffort::default(),
            columns: BestEffort::default(),
            indexes: BestEffort::default(),
            sample: BestEffort::default(),
        }
    }

    /// Row count, or 0 when the count query failed.
    pub fn row_count_or_zero(&self) -> u64 {
        self.row_count.value().copied().unwrap_or(0)
    }

    /// Columns, or an empty slice when the column query failed.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        self.columns.value().map_or(&[], Vec::as_slice)
    }

    /// Indexes, or an empty slice when the index query failed.
    pub fn indexes(&self) -> &[IndexDescriptor] {
        self.indexes.value().map_or(&[], Vec::as_slice)
    }

    /// Sampled rows, or `None` when sampling failed or returned nothing.
    pub fn sample(&self) -> Option<&SampleData> {
        self.sample.value().filter(|sample| !sample.is_empty())
    }
}

/// One row of the `products` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub code: Option<String>,
    pub name: Option<String>,
}

impl Product {
    /// Creates a product row.
    pub fn new(code: Option<&str>, name: Option<&str>) -> Self {
        Self {
            code: code.map(str::to_string),
            name: name.map(str::to_string),
        }
    }
}

/// Every product ordered by `product_code` ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListing {
    pub products: Vec<Product>,
}

impl ProductListing {
    /// Number of listed products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if no products were listed.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// How often one (sale name, option name) pair occurs in `orders`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNameCount {
    pub sale_name: String,
    pub option_name: Option<String>,
    pub count: u64,
}

/// Most frequent order name/option pairs, count descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderNameFrequency {
    pub entries: Vec<OrderNameCount>,
}

impl OrderNameFrequency {
    /// Number of listed pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no pairs were listed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InspectorError;

    #[test]
    fn test_type_label() {
        let column = ColumnDescriptor::new("shop_name", "character varying").with_max_length(100);
        assert_eq!(column.type_label(), "character varying(100)");

        let column = ColumnDescriptor::new("id", "integer");
        assert_eq!(column.type_label(), "integer");
    }

    #[test]
    fn test_primary_key_builder_implies_not_null() {
        let column = ColumnDescriptor::new("id", "integer").primary_key();
        assert!(column.is_primary_key);
        assert!(!column.nullable);
    }

    #[test]
    fn test_schema_table_index_sorted_membership() {
        let index: SchemaTableIndex = ["shops", "orders", "campaigns"].into_iter().collect();

        assert_eq!(index.len(), 3);
        assert!(index.contains("orders"));
        assert!(!index.contains("products"));
        assert_eq!(
            index.iter().collect::<Vec<_>>(),
            vec!["campaigns", "orders", "shops"]
        );
    }

    #[test]
    fn test_best_effort_distinguishes_failure_from_zero() {
        let counted: BestEffort<u64> = BestEffort::from_result(Ok(0), "row count");
        let failed: BestEffort<u64> = BestEffort::from_result(
            Err(InspectorError::query_execution("relation does not exist")),
            "row count",
        );

        assert!(counted.is_available());
        assert!(!failed.is_available());
        assert!(
            failed
                .unavailable_reason()
                .is_some_and(|reason| reason.contains("relation does not exist"))
        );
        assert_eq!(counted.into_value_or_default(), 0);
        assert_eq!(failed.into_value_or_default(), 0);
    }

    #[test]
    fn test_missing_table_report_is_empty() {
        let report = TableReport::missing("shops");
        assert!(!report.exists);
        assert_eq!(report.row_count_or_zero(), 0);
        assert!(report.columns().is_empty());
        assert!(report.indexes().is_empty());
        assert!(report.sample().is_none());
    }

    #[test]
    fn test_sample_cells_pair_columns_with_values() {
        let sample = SampleData {
            columns: vec!["id".to_string(), "memo".to_string()],
            rows: vec![vec![Some("1".to_string()), None]],
        };

        let cells: Vec<_> = sample.cells(&sample.rows[0]).collect();
        assert_eq!(cells, vec![("id", Some("1")), ("memo", None)]);
    }
}
