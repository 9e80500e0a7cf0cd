use std::path::PathBuf;

/// Name of the DuckDB table holding the loaded dataset.
pub const SALES_TABLE: &str = "sales";

/// Environment variable that overrides the default dataset location.
pub const DATASET_ENV: &str = "SALES_DASHBOARD_DATA";

pub const DEFAULT_DATASET: &str = "sales.csv";

pub const DATE_COLUMN: &str = "OrderDate";
pub const PRODUCT_COLUMN: &str = "Product";
pub const CATEGORY_COLUMN: &str = "Category";
pub const QUANTITY_COLUMN: &str = "Quantity";
pub const UNIT_PRICE_COLUMN: &str = "UnitPrice";
pub const TOTAL_PRICE_COLUMN: &str = "TotalPrice";

/// Number of buckets in the frequency histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// Columns every dataset must carry, with the type they are read as.
///
/// `OrderDate` is read as text and converted to `DATE` afterwards so that
/// a custom date format can be applied.
pub fn required_columns() -> [(&'static str, &'static str); 6] {
    [
        (DATE_COLUMN, "VARCHAR"),
        (PRODUCT_COLUMN, "VARCHAR"),
        (CATEGORY_COLUMN, "VARCHAR"),
        (QUANTITY_COLUMN, "BIGINT"),
        (UNIT_PRICE_COLUMN, "DOUBLE"),
        (TOTAL_PRICE_COLUMN, "DOUBLE"),
    ]
}

pub fn default_dataset_path() -> PathBuf {
    match std::env::var_os(DATASET_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_DATASET),
    }
}
