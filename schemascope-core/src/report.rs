//! Fixed-width text rendering of the inspection report.
//!
//! Each method renders one section into a `String` of complete lines, each
//! terminated by `\n`. Column widths and truncation count `char`s, which is
//! also how `std::fmt` pads, so labels in Hangul line up the same way as
//! ASCII ones.
//!
//! Rendering is pure: the same inputs always give byte-identical output.

use crate::error::InspectorError;
use crate::models::{OrderNameFrequency, ProductListing, SchemaTableIndex, TableReport};
use crate::Result;
use std::fmt::Write;

const MAJOR_RULE_WIDTH: usize = 80;
const TABLE_RULE_WIDTH: usize = 80;
const COLUMN_RULE_WIDTH: usize = 90;
const PRODUCT_RULE_WIDTH: usize = 70;
const FREQUENCY_RULE_WIDTH: usize = 100;

const DEFAULT_DISPLAY_CHARS: usize = 28;
const SAMPLE_VALUE_CHARS: usize = 60;
const SALE_NAME_WIDTH: usize = 50;
const OPTION_NAME_WIDTH: usize = 40;

/// Renders report sections for one schema.
///
/// # Example
/// ```rust
/// use schemascope_core::report::ReportRenderer;
///
/// let renderer = ReportRenderer::new("playauto_platform", 3);
/// let completion = renderer.completion().unwrap();
/// assert!(completion.ends_with("스키마 분석 완료!\n"));
/// ```
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    schema: String,
    sample_limit: u32,
}

impl ReportRenderer {
    /// Creates a renderer; `sample_limit` appears in the sample heading.
    pub fn new(schema: impl Into<String>, sample_limit: u32) -> Self {
        Self {
            schema: schema.into(),
            sample_limit,
        }
    }

    /// Run banner naming the schema and the target tables.
    pub fn header(&self, targets: &[String]) -> Result<String> {
        render("header", |out| {
            writeln!(out, "{}", separator('=', MAJOR_RULE_WIDTH))?;
            writeln!(out, "PostgreSQL 스키마 구조 분석")?;
            writeln!(out, "스키마: {}", self.schema)?;
            writeln!(out, "대상 테이블: {}", targets.join(", "))?;
            writeln!(out, "{}", separator('=', MAJOR_RULE_WIDTH))
        })
    }

    /// Every base table of the schema, sorted.
    pub fn table_index(&self, index: &SchemaTableIndex) -> Result<String> {
        render("table list", |out| {
            writeln!(out)?;
            writeln!(out, "[스키마 내 전체 테이블 목록]")?;
            for table in index.iter() {
                writeln!(out, "  - {}", table)?;
            }
            writeln!(out)
        })
    }

    /// One target table: row count, columns, indexes and sample rows, or
    /// the missing-table warning.
    pub fn table(&self, report: &TableReport) -> Result<String> {
        render("table", |out| {
            writeln!(out, "{}", separator('-', TABLE_RULE_WIDTH))?;
            writeln!(out)?;
            writeln!(out, "### 테이블: {}.{}", self.schema, report.table_name)?;
            writeln!(out, "{}", separator('-', TABLE_RULE_WIDTH))?;

            if !report.exists {
                return writeln!(out, "  ⚠️ 테이블이 존재하지 않습니다!");
            }

            writeln!(out)?;
            writeln!(
                out,
                "총 레코드 수: {}건",
                format_thousands(report.row_count_or_zero())
            )?;
            writeln!(out)?;

            writeln!(out, "[컬럼 정보]")?;
            writeln!(
                out,
                "{:<25} {:<20} {:<6} {:<4} {:<30}",
                "컬럼명", "데이터타입", "NULL", "PK", "기본값"
            )?;
            writeln!(out, "{}", separator('-', COLUMN_RULE_WIDTH))?;
            for column in report.columns() {
                let default = column
                    .default_expression
                    .as_deref()
                    .map(|expr| truncate(expr, DEFAULT_DISPLAY_CHARS))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "{:<25} {:<20} {:<6} {:<4} {:<30}",
                    column.name,
                    column.type_label(),
                    yes_no(column.nullable),
                    yes_no(column.is_primary_key),
                    default
                )?;
            }

            let indexes = report.indexes();
            if !indexes.is_empty() {
                writeln!(out)?;
                writeln!(out, "[인덱스 정보]")?;
                for index in indexes {
                    writeln!(out, "  - {}", index.name)?;
                }
            }

            if let Some(sample) = report.sample() {
                writeln!(out)?;
                writeln!(out, "[샘플 데이터 (최대 {}건)]", self.sample_limit)?;
                for (number, row) in (1_usize..).zip(&sample.rows) {
                    writeln!(out)?;
                    writeln!(out, "  --- 레코드 {} ---", number)?;
                    for (column, value) in sample.cells(row) {
                        let value = value.map_or_else(
                            || "NULL".to_string(),
                            |v| truncate(v, SAMPLE_VALUE_CHARS),
                        );
                        writeln!(out, "  {}: {}", column, value)?;
                    }
                }
            }

            writeln!(out)
        })
    }

    /// Full product code/name listing with its total.
    pub fn products(&self, listing: &ProductListing) -> Result<String> {
        render("product listing", |out| {
            writeln!(out, "{}", separator('=', MAJOR_RULE_WIDTH))?;
            writeln!(out)?;
            writeln!(
                out,
                "### products 테이블 - SKU(product_code)와 상품명(product_name) 전체 목록"
            )?;
            writeln!(out, "{}", separator('-', TABLE_RULE_WIDTH))?;
            writeln!(out)?;
            writeln!(out, "{:<20} {:<50}", "SKU (product_code)", "상품명 (product_name)")?;
            writeln!(out, "{}", separator('-', PRODUCT_RULE_WIDTH))?;
            for product in &listing.products {
                writeln!(
                    out,
                    "{:<20} {:<50}",
                    product.code.as_deref().unwrap_or_default(),
                    product.name.as_deref().unwrap_or_default()
                )?;
            }
            writeln!(out)?;
            writeln!(out, "총 {}개 상품", listing.len())
        })
    }

    /// Most frequent order name/option pairs.
    pub fn order_frequencies(&self, frequency: &OrderNameFrequency) -> Result<String> {
        render("order name listing", |out| {
            writeln!(out, "{}", separator('=', MAJOR_RULE_WIDTH))?;
            writeln!(out)?;
            writeln!(out, "### orders 테이블 - 상품명/옵션명 샘플 (매핑 분석용)")?;
            writeln!(out, "{}", separator('-', TABLE_RULE_WIDTH))?;
            writeln!(out)?;
            writeln!(
                out,
                "{:<50} {:<40} {:<10}",
                "상품명 (shop_sale_name)", "옵션명 (shop_opt_name)", "건수"
            )?;
            writeln!(out, "{}", separator('-', FREQUENCY_RULE_WIDTH))?;
            for entry in &frequency.entries {
                writeln!(
                    out,
                    "{:<50} {:<40} {:<10}",
                    ellipsize(&entry.sale_name, SALE_NAME_WIDTH),
                    ellipsize(entry.option_name.as_deref().unwrap_or_default(), OPTION_NAME_WIDTH),
                    entry.count
                )?;
            }
            Ok(())
        })
    }

    /// Closing banner of a successful run.
    pub fn completion(&self) -> Result<String> {
        render("completion banner", |out| {
            writeln!(out, "{}", separator('=', MAJOR_RULE_WIDTH))?;
            writeln!(out)?;
            writeln!(out, "스키마 분석 완료!")
        })
    }

    /// Error line of a failed run.
    pub fn failure(&self, message: &str) -> Result<String> {
        render("failure", |out| {
            writeln!(out)?;
            writeln!(out, "오류 발생: {}", message)
        })
    }

    /// Closing banner of a failed run.
    pub fn failure_banner(&self) -> Result<String> {
        render("failure banner", |out| {
            writeln!(out, "{}", separator('=', MAJOR_RULE_WIDTH))
        })
    }
}

fn render<F>(section: &str, body: F) -> Result<String>
where
    F: FnOnce(&mut String) -> std::fmt::Result,
{
    let mut out = String::new();
    body(&mut out).map_err(|e| InspectorError::render(section, e))?;
    Ok(out)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "YES" } else { "NO" }
}

/// A rule of `width` copies of `c`.
pub fn separator(c: char, width: usize) -> String {
    std::iter::repeat_n(c, width).collect()
}

/// Formats `n` with `,` between groups of three digits.
///
/// ```rust
/// use schemascope_core::report::format_thousands;
///
/// assert_eq!(format_thousands(1_234_567), "1,234,567");
/// assert_eq!(format_thousands(999), "999");
/// ```
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len().saturating_add(digits.len() / 3));
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// First `max_chars` characters of `s`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// `s` unchanged if it fits in `width` characters, otherwise its first
/// `width - 3` characters followed by `...`.
pub fn ellipsize(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let mut shortened = truncate(s, width.saturating_sub(3));
        shortened.push_str("...");
        shortened
    } else {
        s.to_string()
    }
}
