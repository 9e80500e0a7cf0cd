use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Metrics — Descriptive statistics over a view's TotalPrice column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Non-null `Product` values in the view.
    pub count: i64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Always `max - min`.
    pub range: f64,
}

impl Metrics {
    /// The labelled cards shown in the metrics panel.
    pub fn cards(&self) -> Vec<MetricCard> {
        vec![
            MetricCard::new("All number of Items", self.count.to_string(), "All Items"),
            MetricCard::new(
                "Sum of Product Price USD",
                format_grouped(self.sum),
                format!("{}", self.median),
            ),
            MetricCard::new("Maximum Price", format_grouped(self.max), "High Price"),
            MetricCard::new("Minimum Price", format_grouped(self.min), "Low Price"),
            MetricCard::new("Price Range", format_grouped(self.range), "Price Range"),
        ]
    }
}

// ---------------------------------------------------------------------------
// Summary — Aggregation result, defined for empty views too
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Summary {
    /// The view holds no priced rows.
    NoData,
    Metrics(Metrics),
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        matches!(self, Summary::NoData)
    }

    /// Borrow the metrics, failing with `EmptyAggregation` for an empty view.
    pub fn metrics(&self) -> Result<&Metrics> {
        match self {
            Summary::Metrics(m) => Ok(m),
            Summary::NoData => Err(DashboardError::EmptyAggregation),
        }
    }

    pub fn into_metrics(self) -> Result<Metrics> {
        match self {
            Summary::Metrics(m) => Ok(m),
            Summary::NoData => Err(DashboardError::EmptyAggregation),
        }
    }

    /// Metric cards, or none when there is nothing to show.
    pub fn cards(&self) -> Vec<MetricCard> {
        match self {
            Summary::Metrics(m) => m.cards(),
            Summary::NoData => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// MetricCard — One labelled value in the metrics panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
    pub delta: String,
}

impl MetricCard {
    fn new(label: &str, value: impl Into<String>, delta: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            delta: delta.into(),
        }
    }
}

/// Format a number rounded to an integer with `,` thousands separators.
pub fn format_grouped(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && grouped != "0" {
        grouped.insert(0, '-');
    }
    grouped
}
