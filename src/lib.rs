//! Sales analytics dashboard core.
//!
//! Loads a sales transaction CSV into an in-process DuckDB table, narrows it
//! by an inclusive date range and per-column predicates, and computes the
//! summary metrics and chart projections a single-page dashboard renders.
//! Every interaction is a fresh, synchronous recomputation over the same
//! immutable table.
//!
//! # Quick start
//!
//! ```no_run
//! use sales_dashboard::{ChartSelectors, DateRange, Predicate, SalesDashboard, Selection};
//!
//! let dashboard = SalesDashboard::builder().dataset("sales.csv").build().unwrap();
//!
//! let range = DateRange::parse("2020-01-01", "2020-03-31").unwrap();
//! let selection = Selection::new(range).with(Predicate::equals("Category", "Bars"));
//!
//! let report = dashboard.render(&selection, &ChartSelectors::default()).unwrap();
//! println!("{}", report.caption);
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod report;
pub mod schema;
pub mod sql_builder;

pub use connection::{Connection, LoadOptions};
pub use error::{DashboardError, Result};
pub use models::{Metrics, Summary};
pub use queries::{DateRange, Predicate, Selection, View};
pub use report::{ChartSelectors, DashboardReport, ReportStatus};
pub use schema::{ColumnKind, TableSchema};
pub use sql_builder::SqlBuilder;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::{DATE_COLUMN, SALES_TABLE};
use crate::sql_builder::quote_ident;

// ---------------------------------------------------------------------------
// SalesDashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`SalesDashboard`].
#[derive(Debug, Clone, Default)]
pub struct SalesDashboardBuilder {
    dataset: Option<PathBuf>,
    options: LoadOptions,
}

impl SalesDashboardBuilder {
    /// Set the CSV file to load.
    ///
    /// If not set, `$SALES_DASHBOARD_DATA` is used, falling back to
    /// `sales.csv` in the working directory.
    pub fn dataset<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.dataset = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set a `strptime` format for `OrderDate` (defaults to ISO `%Y-%m-%d`).
    pub fn date_format(mut self, format: &str) -> Self {
        self.options.date_format = Some(format.to_string());
        self
    }

    /// Open the database and load the dataset.
    pub fn build(self) -> Result<SalesDashboard> {
        let path = self.dataset.unwrap_or_else(config::default_dataset_path);
        let conn = Connection::open_in_memory()?;
        let schema = conn.load_csv(&path, &self.options)?;
        Ok(SalesDashboard {
            conn,
            schema,
            path,
            options: self.options,
        })
    }
}

// ---------------------------------------------------------------------------
// SalesDashboard
// ---------------------------------------------------------------------------

/// The loaded dataset plus the operations one interaction needs.
///
/// Owns the DuckDB [`Connection`] and the [`TableSchema`] computed at load.
/// All query methods take `&self` and never modify the table.
pub struct SalesDashboard {
    conn: Connection,
    schema: TableSchema,
    path: PathBuf,
    options: LoadOptions,
}

impl SalesDashboard {
    pub fn builder() -> SalesDashboardBuilder {
        SalesDashboardBuilder::default()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Path of the loaded dataset.
    pub fn dataset(&self) -> &Path {
        &self.path
    }

    /// Apply a selection, producing a view over the table.
    pub fn filter(&self, selection: impl Into<Selection>) -> Result<View<'_>> {
        queries::filter(&self.conn, &self.schema, selection.into())
    }

    /// Summary statistics for a selection.
    pub fn aggregate(&self, selection: impl Into<Selection>) -> Result<Summary> {
        let view = self.filter(selection)?;
        queries::aggregate(&view)
    }

    /// Run the full dashboard pipeline for one interaction.
    pub fn render(
        &self,
        selection: &Selection,
        selectors: &ChartSelectors,
    ) -> Result<DashboardReport> {
        report::render(&self.conn, &self.schema, selection, selectors)
    }

    /// Earliest and latest `OrderDate`, or `None` for an empty table.
    pub fn full_range(&self) -> Result<Option<DateRange>> {
        let date = quote_ident(DATE_COLUMN);
        let sql = format!(
            "SELECT CAST(MIN({d}) AS VARCHAR) AS lo, CAST(MAX({d}) AS VARCHAR) AS hi FROM {t}",
            d = date,
            t = SALES_TABLE
        );
        let rows = self.conn.execute(&sql, &[])?;
        let bound = |key: &str| -> Result<Option<NaiveDate>> {
            match rows.first().and_then(|r| r.get(key)).and_then(|v| v.as_str()) {
                Some(s) => queries::filter::parse_date(s).map(Some),
                None => Ok(None),
            }
        };
        match (bound("lo")?, bound("hi")?) {
            (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end))),
            _ => Ok(None),
        }
    }

    /// The range to use when the caller leaves either bound open.
    ///
    /// Missing bounds come from [`full_range`](Self::full_range), or from
    /// today when the table is empty.
    pub fn resolve_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRange> {
        if let (Some(start), Some(end)) = (start, end) {
            return Ok(DateRange::new(start, end));
        }
        let full = self.full_range()?.unwrap_or_else(DateRange::today);
        Ok(DateRange::new(
            start.unwrap_or(full.start),
            end.unwrap_or(full.end),
        ))
    }

    /// Re-read the dataset from disk, replacing the table and schema.
    pub fn reload(&mut self) -> Result<()> {
        self.schema = self.conn.load_csv(&self.path, &self.options)?;
        Ok(())
    }

    /// Number of rows in the loaded table.
    pub fn row_count(&self) -> Result<i64> {
        self.conn.row_count()
    }

    /// Execute a raw SQL query against the database.
    ///
    /// Escape hatch for questions the dashboard does not ask itself.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for SalesDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = match self.conn.row_count() {
            Ok(n) => n.to_string(),
            Err(_) => "?".to_string(),
        };
        write!(
            f,
            "SalesDashboard(dataset={}, rows={}, qualitative=[{}], quantitative=[{}])",
            self.path.display(),
            rows,
            self.schema.qualitative_columns().join(", "),
            self.schema.quantitative_columns().join(", ")
        )
    }
}
