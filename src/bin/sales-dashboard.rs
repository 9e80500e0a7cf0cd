//! Command-line driver: run one dashboard render pass and print it.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sales_dashboard::queries::filter::parse_date;
use sales_dashboard::{
    config, ChartSelectors, DashboardReport, Predicate, SalesDashboard, Selection,
};

#[derive(Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Filter a sales dataset and print its metrics and chart data")]
#[command(version)]
struct Cli {
    /// Sales CSV to load (defaults to $SALES_DASHBOARD_DATA or ./sales.csv)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// First day of the range, YYYY-MM-DD (defaults to the earliest order)
    #[arg(long)]
    start: Option<String>,

    /// Last day of the range, YYYY-MM-DD (defaults to the latest order)
    #[arg(long)]
    end: Option<String>,

    /// Extra filter: COL=VAL, COL=A|B, COL~TEXT, COL>=N, COL<=N, COL@FROM..TO
    #[arg(short = 'w', long = "where")]
    predicates: Vec<String>,

    /// Qualitative column for the feature scatter's x axis
    #[arg(long)]
    x: Option<String>,

    /// Quantitative column for the feature scatter's y axis
    #[arg(long)]
    y: Option<String>,

    /// Qualitative column for the frequency histogram
    #[arg(long)]
    hist: Option<String>,

    /// strptime format of OrderDate when it is not YYYY-MM-DD
    #[arg(long)]
    date_format: Option<String>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut builder = SalesDashboard::builder()
        .dataset(cli.data.clone().unwrap_or_else(config::default_dataset_path));
    if let Some(fmt) = &cli.date_format {
        builder = builder.date_format(fmt);
    }
    let dashboard = builder.build().context("could not load the sales dataset")?;
    tracing::info!("{}", dashboard);

    let start = cli.start.as_deref().map(parse_date).transpose()?;
    let end = cli.end.as_deref().map(parse_date).transpose()?;
    let range = dashboard.resolve_range(start, end)?;
    let mut selection = Selection::new(range);
    for raw in &cli.predicates {
        let predicate: Predicate = raw.parse()?;
        selection = selection.with(predicate);
    }

    let mut selectors = ChartSelectors::default();
    selectors.scatter_x = cli.x.clone();
    selectors.scatter_y = cli.y.clone();
    selectors.histogram = cli.hist.clone();

    let report = dashboard.render(&selection, &selectors)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &DashboardReport) {
    println!("{}", report.caption);
    if let Some(message) = report.status.message() {
        println!("{}", message);
    }
    println!("Rows: {}", report.row_count);

    if !report.metric_cards.is_empty() {
        println!("\nData Metrics");
        for card in &report.metric_cards {
            println!("  {:<26} {:>14}  ({})", card.label, card.value, card.delta);
        }
    }

    let charts = &report.charts;

    println!("\nProduct & Quantities");
    for bar in &charts.quantity_by_product.bars {
        println!("  {:<26} {:>14}", bar.category, bar.value);
    }

    println!("\nProducts & UnitPrice by month");
    for bar in &charts.unit_price_by_month.bars {
        println!("  {:>2}  {:<22} {:>14.2}", bar.month, bar.series, bar.value);
    }

    println!(
        "\n{} vs {} ({} points)",
        charts.feature_scatter.x_field,
        charts.feature_scatter.y_field,
        charts.feature_scatter.points.len()
    );

    let hist = &charts.frequency_histogram;
    println!("\nHistogram of {}", hist.column);
    for bin in hist.bins.iter().filter(|b| b.count > 0) {
        println!("  [{:>7.2}, {:>7.2})  {}", bin.start, bin.end, bin.count);
    }
}
