//! Full render passes.

mod common;

use sales_dashboard::{ChartSelectors, DashboardError, ReportStatus, Selection, Summary};

#[test]
fn january_render_is_ready() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let report = dashboard
        .render(
            &Selection::new(common::january_2014()),
            &ChartSelectors::default(),
        )
        .unwrap();

    assert_eq!(report.status, ReportStatus::Ready);
    assert!(report.status.message().is_none());
    assert_eq!(
        report.caption,
        "You have chosen analytics from: 2014-01-01 to 2014-01-31"
    );
    assert_eq!(report.row_count, 3);

    let cards = &report.metric_cards;
    assert_eq!(cards.len(), 5);
    assert_eq!(cards[0].label, "All number of Items");
    assert_eq!(cards[0].value, "3");
    assert_eq!(cards[1].label, "Sum of Product Price USD");
    assert_eq!(cards[1].value, "60");
    assert_eq!(cards[2].value, "30");
    assert_eq!(cards[3].value, "10");
    assert_eq!(cards[4].value, "20");

    assert_eq!(report.charts.quantity_by_product.get("Carrot"), Some(8.0));
    assert_eq!(report.charts.price_scatter.points.len(), 3);
    assert_eq!(report.charts.frequency_histogram.total(), 3);
}

#[test]
fn default_selectors_take_first_columns() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let report = dashboard
        .render(
            &Selection::new(common::january_2014()),
            &ChartSelectors::default(),
        )
        .unwrap();

    assert_eq!(
        report.qualitative_columns,
        vec!["OrderDate", "Product", "Category", "Region"]
    );
    assert_eq!(
        report.quantitative_columns,
        vec!["Quantity", "UnitPrice", "TotalPrice"]
    );
    assert_eq!(report.charts.feature_scatter.x_field, "OrderDate");
    assert_eq!(report.charts.feature_scatter.y_field, "Quantity");
    assert_eq!(report.charts.frequency_histogram.column, "OrderDate");
}

#[test]
fn explicit_selectors_drive_charts() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let selectors = ChartSelectors::default()
        .scatter("Category", "TotalPrice")
        .histogram("Region");
    let report = dashboard
        .render(&Selection::new(common::january_2014()), &selectors)
        .unwrap();

    assert_eq!(report.charts.feature_scatter.x_field, "Category");
    assert_eq!(report.charts.feature_scatter.y_field, "TotalPrice");
    assert_eq!(
        report.charts.frequency_histogram.categories,
        vec!["East", "West"]
    );
}

#[test]
fn inverted_range_reports_status_and_empty_panels() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let report = dashboard
        .render(
            &Selection::new(common::range("2014-01-31", "2014-01-01")),
            &ChartSelectors::default(),
        )
        .unwrap();

    assert_eq!(
        report.status,
        ReportStatus::InvalidRange {
            start: common::date("2014-01-31"),
            end: common::date("2014-01-01"),
        }
    );
    assert!(report.status.message().is_some());
    assert_eq!(report.row_count, 0);
    assert_eq!(report.summary, Summary::NoData);
    assert!(report.metric_cards.is_empty());
    assert!(report.charts.quantity_by_product.bars.is_empty());
    assert!(report.charts.price_scatter.points.is_empty());
    assert!(report.charts.unit_price_by_month.bars.is_empty());
    assert!(report.charts.feature_scatter.points.is_empty());
    assert_eq!(report.charts.frequency_histogram.total(), 0);
}

#[test]
fn range_without_orders_reports_no_data() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let report = dashboard
        .render(
            &Selection::new(common::range("2020-01-01", "2020-12-31")),
            &ChartSelectors::default(),
        )
        .unwrap();

    assert_eq!(report.status, ReportStatus::NoData);
    assert!(report.summary.is_empty());
    assert!(report.metric_cards.is_empty());
}

#[test]
fn rows_without_prices_report_no_data() {
    let (dashboard, _tmp) = common::setup_sparse_dashboard();
    let report = dashboard
        .render(
            &Selection::new(common::range("2014-03-02", "2014-03-02")),
            &ChartSelectors::default(),
        )
        .unwrap();

    assert_eq!(report.row_count, 1);
    assert_eq!(report.summary, Summary::NoData);
    assert_eq!(report.status, ReportStatus::NoData);
    assert!(report.metric_cards.is_empty());
    assert_eq!(report.charts.quantity_by_product.get("Bran"), Some(4.0));
}

#[test]
fn empty_cells_do_not_break_rendering() {
    let (dashboard, _tmp) = common::setup_sparse_dashboard();
    let report = dashboard
        .render(&Selection::new(common::march_2014()), &ChartSelectors::default())
        .unwrap();

    assert_eq!(report.status, ReportStatus::Ready);
    let metrics = report.summary.metrics().unwrap();
    assert_eq!(metrics.count, 2);
    assert_eq!(metrics.sum, 15.0);
    // OrderDate against Quantity skips the row without a Quantity
    assert_eq!(report.charts.feature_scatter.points.len(), 2);
    assert_eq!(report.charts.frequency_histogram.total(), 3);
}

#[test]
fn invalid_selectors_are_rejected() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let selection = Selection::new(common::january_2014());

    let result = dashboard.render(&selection, &ChartSelectors::default().histogram("Quantity"));
    assert!(matches!(result, Err(DashboardError::ColumnType { .. })));

    let result = dashboard.render(
        &selection,
        &ChartSelectors::default().scatter("Product", "Region"),
    );
    assert!(matches!(result, Err(DashboardError::ColumnType { .. })));

    let result = dashboard.render(
        &selection,
        &ChartSelectors::default().scatter("Weight", "Quantity"),
    );
    assert!(matches!(result, Err(DashboardError::UnknownColumn(_))));
}

#[test]
fn render_is_repeatable() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let selection = Selection::new(common::range("2013-01-01", "2015-12-31"));
    let selectors = ChartSelectors::default();
    let first = dashboard.render(&selection, &selectors).unwrap();
    let second = dashboard.render(&selection, &selectors).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.charts.specs().len(), 5);
}

#[test]
fn report_serializes_to_json() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let report = dashboard
        .render(
            &Selection::new(common::january_2014()),
            &ChartSelectors::default(),
        )
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"]["state"], "ready");
    assert_eq!(json["summary"]["status"], "metrics");
    assert_eq!(json["summary"]["sum"], 60.0);
    assert_eq!(json["range"]["start"], "2014-01-01");
    assert_eq!(json["charts"]["quantity_by_product"]["bars"][0]["category"], "Carrot");
}
