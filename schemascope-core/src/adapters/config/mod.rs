//! Configuration types for the inspection run.
//!
//! - `ConnectionConfig`: where and how to connect
//! - `InspectionConfig`: what to inspect, plus the connection and credentials
//!
//! # Security
//! `ConnectionConfig` never stores passwords. Credentials travel separately
//! in [`crate::security::Credentials`].

mod connection;
mod inspection;

pub use connection::ConnectionConfig;
pub use inspection::{
    DEFAULT_FREQUENCY_LIMIT, DEFAULT_SAMPLE_LIMIT, DEFAULT_SCHEMA, DEFAULT_TARGET_TABLES,
    InspectionConfig, ORDERS_TABLE, PRODUCTS_TABLE,
};
