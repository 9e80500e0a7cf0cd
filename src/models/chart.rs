use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// BarChart — One value per category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub category_field: String,
    pub value_field: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Value of the bar for `category`, if present.
    pub fn get(&self, category: &str) -> Option<f64> {
        self.bars
            .iter()
            .find(|b| b.category == category)
            .map(|b| b.value)
    }
}

// ---------------------------------------------------------------------------
// ScatterChart — One point per row, coloured by a categorical column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: String,
    pub y: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart {
    pub x_field: String,
    pub y_field: String,
    pub color_field: String,
    pub points: Vec<ScatterPoint>,
}

// ---------------------------------------------------------------------------
// StackedBarChart — Monthly sums split by a colour series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedBar {
    /// Month of year, 1 through 12.
    pub month: u32,
    pub series: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedBarChart {
    pub date_field: String,
    pub value_field: String,
    pub color_field: String,
    pub bars: Vec<StackedBar>,
}

impl StackedBarChart {
    /// Total height of the stack for `month`.
    pub fn month_total(&self, month: u32) -> f64 {
        self.bars
            .iter()
            .filter(|b| b.month == month)
            .map(|b| b.value)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// HistogramChart — Frequencies of a qualitative column over fixed bins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

/// Frequency histogram of a categorical column.
///
/// Categories sit on a numeric axis at positions `0..n` in order of first
/// appearance; `categories[i]` labels position `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramChart {
    pub column: String,
    pub categories: Vec<String>,
    pub bins: Vec<HistogramBin>,
}

impl HistogramChart {
    /// Bin `values` into `bin_count` equal-width buckets.
    ///
    /// The axis spans the first to the last category position. A single
    /// category spans `[-0.5, 0.5]` and no values span `[0, 1]`. Every bucket
    /// is half-open except the last, which includes its right edge.
    pub fn from_values<S: AsRef<str>>(column: &str, values: &[S], bin_count: usize) -> Self {
        let mut categories: Vec<String> = Vec::new();
        let mut positions: Vec<usize> = Vec::with_capacity(values.len());
        for value in values {
            let value = value.as_ref();
            let pos = match categories.iter().position(|c| c == value) {
                Some(pos) => pos,
                None => {
                    categories.push(value.to_string());
                    categories.len() - 1
                }
            };
            positions.push(pos);
        }

        let (lo, hi) = match categories.len() {
            0 => (0.0, 1.0),
            1 => (-0.5, 0.5),
            n => (0.0, (n - 1) as f64),
        };

        let bin_count = bin_count.max(1);
        let width = (hi - lo) / bin_count as f64;
        let edges: Vec<f64> = (0..=bin_count)
            .map(|i| {
                if i == bin_count {
                    hi
                } else {
                    lo + i as f64 * width
                }
            })
            .collect();

        let mut counts = vec![0u64; bin_count];
        for pos in positions {
            let x = pos as f64;
            let mut idx = (((x - lo) / width).floor() as usize).min(bin_count - 1);
            // Float error can land a value one bucket off its true edge
            if idx > 0 && x < edges[idx] {
                idx -= 1;
            } else if idx + 1 < bin_count && x >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: edges[i],
                end: edges[i + 1],
                count,
            })
            .collect();

        Self {
            column: column.to_string(),
            categories,
            bins,
        }
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}

// ---------------------------------------------------------------------------
// ChartSpec — Any of the dashboard's projections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar(BarChart),
    Scatter(ScatterChart),
    StackedBar(StackedBarChart),
    Histogram(HistogramChart),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_places_categories_in_first_appearance_order() {
        let chart = HistogramChart::from_values("Product", &["B", "A", "B", "C", "A", "B"], 20);
        assert_eq!(chart.categories, vec!["B", "A", "C"]);
        assert_eq!(chart.bins.len(), 20);
        assert_eq!(chart.total(), 6);
        // Axis runs 0..=2, so B lands in the first bin and C in the last
        assert_eq!(chart.bins[0].count, 3);
        assert_eq!(chart.bins[10].count, 2);
        assert_eq!(chart.bins[19].count, 1);
        assert_eq!(chart.bins[0].start, 0.0);
        assert_eq!(chart.bins[19].end, 2.0);
    }

    #[test]
    fn histogram_single_category_is_centered() {
        let chart = HistogramChart::from_values("Category", &["Bars", "Bars"], 20);
        assert_eq!(chart.bins[0].start, -0.5);
        assert_eq!(chart.bins[19].end, 0.5);
        assert_eq!(chart.bins[10].count, 2);
        assert_eq!(chart.total(), 2);
    }

    #[test]
    fn histogram_without_values_has_empty_bins() {
        let chart = HistogramChart::from_values::<&str>("Product", &[], 20);
        assert!(chart.categories.is_empty());
        assert_eq!(chart.bins.len(), 20);
        assert_eq!(chart.total(), 0);
        assert_eq!(chart.bins[19].end, 1.0);
    }

    #[test]
    fn chart_spec_is_tagged_by_kind() {
        let spec = ChartSpec::Bar(BarChart {
            category_field: "Product".into(),
            value_field: "Quantity".into(),
            bars: vec![Bar {
                category: "A".into(),
                value: 8.0,
            }],
        });
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["bars"][0]["value"], 8.0);
    }
}
