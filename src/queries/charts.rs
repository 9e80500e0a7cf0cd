//! Chart projections: the minimal grouping or column selection each dashboard
//! chart needs, computed from an already-filtered view.

use crate::config::{
    CATEGORY_COLUMN, DATE_COLUMN, HISTOGRAM_BINS, PRODUCT_COLUMN, QUANTITY_COLUMN,
    TOTAL_PRICE_COLUMN, UNIT_PRICE_COLUMN,
};
use crate::error::Result;
use crate::models::{
    Bar, BarChart, HistogramChart, ScatterChart, ScatterPoint, StackedBar, StackedBarChart,
};
use crate::queries::filter::View;
use crate::sql_builder::quote_ident;

/// Total `Quantity` per `Product`, largest first. Empty cells count as zero.
pub fn quantity_by_product(view: &View<'_>) -> Result<BarChart> {
    let product = quote_ident(PRODUCT_COLUMN);
    let category = format!("{} AS category", product);
    let value = format!(
        "CAST(COALESCE(SUM({}), 0) AS DOUBLE) AS \"value\"",
        quote_ident(QUANTITY_COLUMN)
    );
    let not_null = format!("{} IS NOT NULL", product);

    let (sql, params) = view
        .query()
        .select(&[category.as_str(), value.as_str()])
        .where_clause(&not_null, &[])
        .group_by(&[product.as_str()])
        .order_by(&["\"value\" DESC", "category ASC"])
        .build();
    let bars: Vec<Bar> = view.connection().execute_into(&sql, &params)?;

    Ok(BarChart {
        category_field: PRODUCT_COLUMN.to_string(),
        value_field: QUANTITY_COLUMN.to_string(),
        bars,
    })
}

/// `Product` against `TotalPrice`, one point per row, coloured by `Category`.
pub fn price_scatter(view: &View<'_>) -> Result<ScatterChart> {
    scatter(view, PRODUCT_COLUMN, TOTAL_PRICE_COLUMN, CATEGORY_COLUMN)
}

/// Sum of `UnitPrice` per month of year, split by `Product`.
///
/// Months from different years fall into the same bucket.
pub fn unit_price_by_month(view: &View<'_>) -> Result<StackedBarChart> {
    let product = quote_ident(PRODUCT_COLUMN);
    let month_of = format!("month({})", quote_ident(DATE_COLUMN));
    let month = format!("CAST({} AS INTEGER) AS \"month\"", month_of);
    let series = format!("{} AS series", product);
    let value = format!(
        "CAST(COALESCE(SUM({}), 0) AS DOUBLE) AS \"value\"",
        quote_ident(UNIT_PRICE_COLUMN)
    );
    let not_null = format!("{} IS NOT NULL", product);

    let (sql, params) = view
        .query()
        .select(&[month.as_str(), series.as_str(), value.as_str()])
        .where_clause(&not_null, &[])
        .group_by(&[month_of.as_str(), product.as_str()])
        .order_by(&["\"month\" ASC", "series ASC"])
        .build();
    let bars: Vec<StackedBar> = view.connection().execute_into(&sql, &params)?;

    Ok(StackedBarChart {
        date_field: DATE_COLUMN.to_string(),
        value_field: UNIT_PRICE_COLUMN.to_string(),
        color_field: PRODUCT_COLUMN.to_string(),
        bars,
    })
}

/// A user-chosen qualitative `x` against a quantitative `y`, coloured by `Product`.
pub fn feature_scatter(view: &View<'_>, x: &str, y: &str) -> Result<ScatterChart> {
    let schema = view.schema();
    schema.require_qualitative(x)?;
    schema.require_quantitative(y)?;
    scatter(view, x, y, PRODUCT_COLUMN)
}

/// Frequencies of a qualitative column over a fixed number of bins.
pub fn frequency_histogram(view: &View<'_>, column: &str) -> Result<HistogramChart> {
    view.schema().require_qualitative(column)?;

    let ident = quote_ident(column);
    let value = format!("CAST({} AS VARCHAR) AS v", ident);
    let not_null = format!("{} IS NOT NULL", ident);

    let (sql, params) = view
        .query()
        .select(&[value.as_str()])
        .where_clause(&not_null, &[])
        .order_by(&["rowid"])
        .build();
    let values: Vec<String> = view
        .connection()
        .execute(&sql, &params)?
        .into_iter()
        .filter_map(|row| row.get("v").and_then(|v| v.as_str()).map(str::to_string))
        .collect();

    Ok(HistogramChart::from_values(column, &values, HISTOGRAM_BINS))
}

fn scatter(view: &View<'_>, x: &str, y: &str, color: &str) -> Result<ScatterChart> {
    let x_ident = quote_ident(x);
    let y_ident = quote_ident(y);
    let x_expr = format!("COALESCE(CAST({} AS VARCHAR), '') AS x", x_ident);
    let y_expr = format!("CAST({} AS DOUBLE) AS y", y_ident);
    let color_expr = format!("COALESCE(CAST({} AS VARCHAR), '') AS color", quote_ident(color));
    let not_null = format!("{} IS NOT NULL", y_ident);

    let (sql, params) = view
        .query()
        .select(&[x_expr.as_str(), y_expr.as_str(), color_expr.as_str()])
        .where_clause(&not_null, &[])
        .order_by(&["rowid"])
        .build();
    let points: Vec<ScatterPoint> = view.connection().execute_into(&sql, &params)?;

    Ok(ScatterChart {
        x_field: x.to_string(),
        y_field: y.to_string(),
        color_field: color.to_string(),
        points,
    })
}
