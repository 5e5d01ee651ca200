//! The two cross-table listings: products and order name frequencies.

use super::PostgresCatalog;
use crate::Result;
use crate::adapters::config::{ORDERS_TABLE, PRODUCTS_TABLE};
use crate::adapters::helpers::{RowExt, count_to_u64, qualified_name};
use crate::error::InspectorError;
use crate::models::{OrderNameCount, OrderNameFrequency, Product, ProductListing};
use tracing::debug;

impl PostgresCatalog {
    /// Every `(product_code, product_name)` of `schema.products`, code ascending.
    pub(crate) async fn list_products(&self, schema: &str) -> Result<ProductListing> {
        let products_query = format!(
            "SELECT p.product_code::text AS product_code, p.product_name::text AS product_name \
             FROM {} p ORDER BY p.product_code",
            qualified_name(schema, PRODUCTS_TABLE)
        );

        let product_rows = sqlx::query(&products_query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                InspectorError::from_sqlx(
                    format!("Failed to list products of schema '{}'", schema),
                    e,
                )
            })?;

        let mut products = Vec::with_capacity(product_rows.len());
        for row in &product_rows {
            let code: Option<String> = row.get_field("product_code", Some(PRODUCTS_TABLE))?;
            let name: Option<String> = row.get_field("product_name", Some(PRODUCTS_TABLE))?;
            products.push(Product { code, name });
        }

        debug!("Listed {} products", products.len());
        Ok(ProductListing { products })
    }

    /// The `limit` most frequent `(shop_sale_name, shop_opt_name)` pairs.
    ///
    /// Ties are broken by sale name then option name so repeated runs print
    /// the same listing.
    pub(crate) async fn list_order_name_frequencies(
        &self,
        schema: &str,
        limit: u32,
    ) -> Result<OrderNameFrequency> {
        let frequency_query = format!(
            "SELECT o.shop_sale_name::text AS shop_sale_name, \
                    o.shop_opt_name::text AS shop_opt_name, \
                    COUNT(*) AS cnt \
             FROM {} o \
             WHERE o.shop_sale_name IS NOT NULL \
             GROUP BY o.shop_sale_name, o.shop_opt_name \
             ORDER BY cnt DESC, o.shop_sale_name, o.shop_opt_name \
             LIMIT $1",
            qualified_name(schema, ORDERS_TABLE)
        );

        let frequency_rows = sqlx::query(&frequency_query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                InspectorError::from_sqlx(
                    format!("Failed to count order names of schema '{}'", schema),
                    e,
                )
            })?;

        let mut entries = Vec::with_capacity(frequency_rows.len());
        for row in &frequency_rows {
            let sale_name: String = row.get_field("shop_sale_name", Some(ORDERS_TABLE))?;
            let option_name: Option<String> = row.get_field("shop_opt_name", Some(ORDERS_TABLE))?;
            let count: i64 = row.get_field("cnt", Some(ORDERS_TABLE))?;
            entries.push(OrderNameCount {
                sale_name,
                option_name,
                count: count_to_u64(count, "cnt")?,
            });
        }

        debug!("Listed {} order name/option pairs", entries.len());
        Ok(OrderNameFrequency { entries })
    }
}
