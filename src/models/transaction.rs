use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Transaction — One row of the sales dataset
// ---------------------------------------------------------------------------

/// A single sales transaction.
///
/// `total_price` is taken from the file as-is and never recomputed from
/// `quantity * unit_price`. Empty cells in the file load as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub order_date: NaiveDate,
    pub product: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
}
