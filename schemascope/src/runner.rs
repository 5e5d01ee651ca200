//! Run controller: one connection, a fixed sequence of report sections.
//!
//! ```text
//! Connecting -> ListingTables -> PerTableLoop -> ProductListing
//!     -> OrderFrequencyListing -> Closing -> Done
//! ```
//!
//! Any fatal error moves the run to `Failed`. Once a connection exists it is
//! closed exactly once, whichever way the run ends.

use anyhow::Context;
use schemascope_core::adapters::config::{ORDERS_TABLE, PRODUCTS_TABLE};
use schemascope_core::{
    BestEffort, CatalogSource, InspectionConfig, ReportRenderer, inspect_table,
};
use std::fmt;
use std::future::Future;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error, info};

/// Phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started
    Idle,
    /// Opening the single connection
    Connecting,
    /// Fetching the schema's base tables
    ListingTables,
    /// Reporting each target table in order
    PerTableLoop,
    /// Product code/name listing
    ProductListing,
    /// Order name/option frequency listing
    OrderFrequencyListing,
    /// Releasing the connection
    Closing,
    /// Finished successfully
    Done,
    /// Aborted by a fatal error
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::ListingTables => "listing tables",
            Self::PerTableLoop => "inspecting tables",
            Self::ProductListing => "listing products",
            Self::OrderFrequencyListing => "listing order names",
            Self::Closing => "closing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every section was written
    Done,
    /// The run aborted; the error was already reported
    Failed(anyhow::Error),
}

impl RunOutcome {
    /// Returns true if the run reached `Done`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Process exit code: 0 on success, 1 on failure.
    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Drives one inspection run and records the states it passes through.
#[derive(Debug)]
pub struct RunController<'a> {
    config: &'a InspectionConfig,
    renderer: ReportRenderer,
    history: Vec<RunState>,
}

impl<'a> RunController<'a> {
    /// Creates a controller in the `Idle` state.
    pub fn new(config: &'a InspectionConfig) -> Self {
        Self {
            config,
            renderer: ReportRenderer::new(config.schema.clone(), config.sample_limit),
            history: vec![RunState::Idle],
        }
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.history.last().copied().unwrap_or(RunState::Idle)
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Runs the whole report.
    ///
    /// `connect` opens the catalog. The report goes to `out`; the cause chain
    /// of a fatal error goes to `diag`.
    pub async fn run<C, F, Fut, W, D>(&mut self, connect: F, out: &mut W, diag: &mut D) -> RunOutcome
    where
        C: CatalogSource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = schemascope_core::Result<C>>,
        W: Write,
        D: Write,
    {
        match self.run_to_completion(connect, out).await {
            Ok(()) => {
                self.enter(RunState::Done);
                RunOutcome::Done
            }
            Err(e) => {
                self.enter(RunState::Failed);
                error!("Run failed: {:#}", e);
                self.report_failure(&e, out, diag);
                RunOutcome::Failed(e)
            }
        }
    }

    async fn run_to_completion<C, F, Fut, W>(&mut self, connect: F, out: &mut W) -> anyhow::Result<()>
    where
        C: CatalogSource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = schemascope_core::Result<C>>,
        W: Write,
    {
        emit(out, self.renderer.header(&self.config.target_tables))?;

        self.enter(RunState::Connecting);
        let catalog = connect()
            .await
            .context("Failed to open the database connection")?;

        let body = self.report_sections(&catalog, out).await;

        self.enter(RunState::Closing);
        catalog.close().await;
        body?;

        emit(out, self.renderer.completion())?;
        out.flush().context("Failed to flush report")?;
        Ok(())
    }

    async fn report_sections<C, W>(&mut self, catalog: &C, out: &mut W) -> anyhow::Result<()>
    where
        C: CatalogSource,
        W: Write,
    {
        let config = self.config;
        let schema = config.schema.as_str();

        self.enter(RunState::ListingTables);
        let index = catalog
            .list_base_tables(schema)
            .await
            .with_context(|| format!("Failed to list tables of schema '{}'", schema))?;
        info!("Schema '{}' has {} base tables", schema, index.len());
        emit(out, self.renderer.table_index(&index))?;

        self.enter(RunState::PerTableLoop);
        for table in &config.target_tables {
            let report = inspect_table(catalog, schema, &index, table, config.sample_limit).await;
            emit(out, self.renderer.table(&report))?;
        }

        self.enter(RunState::ProductListing);
        if index.contains(PRODUCTS_TABLE) {
            let listing = BestEffort::from_result(catalog.products(schema).await, "product listing")
                .into_value_or_default();
            emit(out, self.renderer.products(&listing))?;
        } else {
            debug!("No {} table, skipping product listing", PRODUCTS_TABLE);
        }

        self.enter(RunState::OrderFrequencyListing);
        if index.contains(ORDERS_TABLE) {
            let frequency = BestEffort::from_result(
                catalog
                    .order_name_frequencies(schema, config.frequency_limit)
                    .await,
                "order name listing",
            )
            .into_value_or_default();
            emit(out, self.renderer.order_frequencies(&frequency))?;
        } else {
            debug!("No {} table, skipping order name listing", ORDERS_TABLE);
        }

        Ok(())
    }

    fn report_failure<W: Write, D: Write>(&self, e: &anyhow::Error, out: &mut W, diag: &mut D) {
        let message = format!("{:#}", e);
        if let Err(write_err) = emit(out, self.renderer.failure(&message)) {
            error!("Failed to write error line: {:#}", write_err);
        }
        if let Err(write_err) = writeln!(diag, "{:?}", e) {
            error!("Failed to write error trace: {}", write_err);
        }
        if let Err(write_err) = emit(out, self.renderer.failure_banner()) {
            error!("Failed to write closing banner: {:#}", write_err);
        }
        if let Err(write_err) = out.flush() {
            error!("Failed to flush report: {}", write_err);
        }
    }

    fn enter(&mut self, state: RunState) {
        info!("{} -> {}", self.state(), state);
        self.history.push(state);
    }
}

fn emit<W: Write>(out: &mut W, section: schemascope_core::Result<String>) -> anyhow::Result<()> {
    let text = section?;
    out.write_all(text.as_bytes())
        .context("Failed to write report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success() {
        assert!(RunOutcome::Done.is_success());
        assert!(!RunOutcome::Failed(anyhow::anyhow!("boom")).is_success());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::PerTableLoop.to_string(), "inspecting tables");
        assert_eq!(RunState::Failed.to_string(), "failed");
    }
}
