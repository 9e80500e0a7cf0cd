//! One full render pass of the dashboard.
//!
//! [`render`] runs filter, aggregation and every chart projection for a single
//! interaction and gathers the results into a serializable
//! [`DashboardReport`]. Nothing is cached between calls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::Connection;
use crate::error::{DashboardError, Result};
use crate::models::{
    BarChart, ChartSpec, HistogramChart, MetricCard, ScatterChart, StackedBarChart, Summary,
};
use crate::queries::{self, DateRange, Selection};
use crate::schema::TableSchema;

/// The user's picks for the selector-driven charts.
///
/// `None` falls back to the first column of the matching selector list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSelectors {
    pub scatter_x: Option<String>,
    pub scatter_y: Option<String>,
    pub histogram: Option<String>,
}

impl ChartSelectors {
    pub fn scatter(mut self, x: &str, y: &str) -> Self {
        self.scatter_x = Some(x.to_string());
        self.scatter_y = Some(y.to_string());
        self
    }

    pub fn histogram(mut self, column: &str) -> Self {
        self.histogram = Some(column.to_string());
        self
    }

    fn resolve(&self, schema: &TableSchema) -> Result<(String, String, String)> {
        let qualitative = schema.qualitative_columns();
        let quantitative = schema.quantitative_columns();
        let pick = |chosen: &Option<String>, options: &[&str], what: &str| {
            chosen
                .clone()
                .or_else(|| options.first().map(|c| c.to_string()))
                .ok_or_else(|| {
                    DashboardError::InvalidArgument(format!("dataset has no {} columns", what))
                })
        };
        Ok((
            pick(&self.scatter_x, &qualitative, "qualitative")?,
            pick(&self.scatter_y, &quantitative, "quantitative")?,
            pick(&self.histogram, &qualitative, "qualitative")?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReportStatus {
    Ready,
    /// The range is valid but no matching row carries a `TotalPrice`.
    NoData,
    /// `start` is after `end`; shown to the user instead of empty charts.
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl ReportStatus {
    /// A user-facing line for anything other than `Ready`.
    pub fn message(&self) -> Option<String> {
        match self {
            ReportStatus::Ready => None,
            ReportStatus::NoData => Some("No data for the selected range".to_string()),
            ReportStatus::InvalidRange { start, end } => Some(format!(
                "Start date {} is after end date {}; pick a valid range",
                start, end
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardCharts {
    pub quantity_by_product: BarChart,
    pub price_scatter: ScatterChart,
    pub unit_price_by_month: StackedBarChart,
    pub feature_scatter: ScatterChart,
    pub frequency_histogram: HistogramChart,
}

impl DashboardCharts {
    /// All charts in page order.
    pub fn specs(&self) -> Vec<ChartSpec> {
        vec![
            ChartSpec::Bar(self.quantity_by_product.clone()),
            ChartSpec::Scatter(self.price_scatter.clone()),
            ChartSpec::StackedBar(self.unit_price_by_month.clone()),
            ChartSpec::Scatter(self.feature_scatter.clone()),
            ChartSpec::Histogram(self.frequency_histogram.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub caption: String,
    pub range: DateRange,
    pub status: ReportStatus,
    pub row_count: i64,
    pub summary: Summary,
    pub metric_cards: Vec<MetricCard>,
    pub charts: DashboardCharts,
    pub qualitative_columns: Vec<String>,
    pub quantitative_columns: Vec<String>,
}

/// Run the whole pipeline for one interaction.
///
/// Selector columns are validated against the schema partition before any
/// chart is projected.
pub fn render(
    conn: &Connection,
    schema: &TableSchema,
    selection: &Selection,
    selectors: &ChartSelectors,
) -> Result<DashboardReport> {
    let (x, y, hist) = selectors.resolve(schema)?;
    schema.require_qualitative(&x)?;
    schema.require_quantitative(&y)?;
    schema.require_qualitative(&hist)?;

    let view = queries::filter(conn, schema, selection.clone())?;
    let row_count = view.count()?;
    let summary = queries::aggregate(&view)?;

    let range = selection.range;
    let status = if range.is_inverted() {
        ReportStatus::InvalidRange {
            start: range.start,
            end: range.end,
        }
    } else if summary.is_empty() {
        ReportStatus::NoData
    } else {
        ReportStatus::Ready
    };

    let charts = DashboardCharts {
        quantity_by_product: queries::quantity_by_product(&view)?,
        price_scatter: queries::price_scatter(&view)?,
        unit_price_by_month: queries::unit_price_by_month(&view)?,
        feature_scatter: queries::feature_scatter(&view, &x, &y)?,
        frequency_histogram: queries::frequency_histogram(&view, &hist)?,
    };
    debug!(range = %range, rows = row_count, status = ?status, "rendered dashboard");

    Ok(DashboardReport {
        caption: range.caption(),
        range,
        status,
        row_count,
        metric_cards: summary.cards(),
        summary,
        charts,
        qualitative_columns: schema
            .qualitative_columns()
            .into_iter()
            .map(String::from)
            .collect(),
        quantitative_columns: schema
            .quantitative_columns()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}
