//! Core types and pipeline for schemascope.
//!
//! This crate holds everything between the database and the report text:
//! the catalog query layer, the per-table aggregator and the fixed-width
//! renderer. The `schemascope` binary adds the CLI and the run controller.
//!
//! # Security Guarantees
//! - Credentials live only in [`security::Credentials`] and are zeroized on drop
//! - All database access is read-only
//! - Connection URLs are redacted before they reach logs or errors
//!
//! # Architecture
//! - [`adapters::CatalogSource`] abstracts the database, with a PostgreSQL and an
//!   in-memory implementation
//! - [`inspect::inspect_table`] aggregates one table, degrading failed queries
//!   into [`models::BestEffort::Unavailable`]
//! - [`report::ReportRenderer`] turns the aggregates into text

pub mod adapters;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod models;
pub mod report;
pub mod security;

// Re-export commonly used types
pub use adapters::{CatalogSource, ConnectionConfig, InspectionConfig, PostgresCatalog};
pub use error::{InspectorError, Result, redact_database_url};
pub use inspect::inspect_table;
pub use logging::init_logging;
pub use models::{
    BestEffort, ColumnDescriptor, IndexDescriptor, OrderNameFrequency, ProductListing,
    SampleData, SchemaTableIndex, TableReport,
};
pub use report::ReportRenderer;
pub use security::Credentials;
