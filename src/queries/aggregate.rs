//! Summary statistics over a filtered view.

use tracing::debug;

use crate::config::{PRODUCT_COLUMN, TOTAL_PRICE_COLUMN};
use crate::error::Result;
use crate::models::{Metrics, Summary};
use crate::queries::filter::View;
use crate::sql_builder::quote_ident;

/// Compute count, sum, min, max, median and range of a view.
///
/// `count` counts `Product` values; the price statistics run over
/// `TotalPrice`. A view without priced rows yields [`Summary::NoData`].
pub fn aggregate(view: &View<'_>) -> Result<Summary> {
    let product = quote_ident(PRODUCT_COLUMN);
    let price = quote_ident(TOTAL_PRICE_COLUMN);

    let items = format!("COUNT({}) AS items", product);
    let priced = format!("COUNT({}) AS priced", price);
    let total = format!("CAST(SUM({}) AS DOUBLE) AS total", price);
    let lowest = format!("CAST(MIN({}) AS DOUBLE) AS lowest", price);
    let highest = format!("CAST(MAX({}) AS DOUBLE) AS highest", price);
    let middle = format!("CAST(MEDIAN({}) AS DOUBLE) AS middle", price);

    let (sql, params) = view
        .query()
        .select(&[
            items.as_str(),
            priced.as_str(),
            total.as_str(),
            lowest.as_str(),
            highest.as_str(),
            middle.as_str(),
        ])
        .build();
    let rows = view.connection().execute(&sql, &params)?;
    let Some(row) = rows.into_iter().next() else {
        return Ok(Summary::NoData);
    };

    let int = |key: &str| row.get(key).and_then(|v| v.as_i64()).unwrap_or(0);
    let float = |key: &str| row.get(key).and_then(|v| v.as_f64());

    if int("priced") == 0 {
        debug!(range = %view.range(), "aggregation over empty view");
        return Ok(Summary::NoData);
    }

    let (Some(sum), Some(min), Some(max), Some(median)) =
        (float("total"), float("lowest"), float("highest"), float("middle"))
    else {
        return Ok(Summary::NoData);
    };

    Ok(Summary::Metrics(Metrics {
        count: int("items"),
        sum,
        min,
        max,
        median,
        range: max - min,
    }))
}
