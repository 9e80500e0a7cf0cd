//! Shared test fixtures for the sales dashboard integration tests.
//!
//! `setup_dashboard()` writes a small sales CSV into a temporary directory
//! and loads it. Row order in the file is significant for the order tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use sales_dashboard::{DateRange, SalesDashboard};

/// Six orders spanning December 2013 to January 2015.
///
/// The three January 2014 rows carry `TotalPrice` 10, 20 and 30.
pub const SALES_CSV: &str = "\
OrderDate,Product,Category,Quantity,UnitPrice,TotalPrice,Region
2013-12-31,Carrot,Bars,7,1.5,10.5,East
2014-01-01,Carrot,Bars,5,2.0,10,East
2014-01-15,Bran,Cookies,2,10.0,20,West
2014-01-31,Carrot,Bars,3,10.0,30,East
2014-02-01,Bran,Cookies,4,5.0,20,West
2015-01-10,Arrowroot,Crackers,10,2.5,25,West
";

/// Three March 2014 orders with empty cells.
///
/// Carrot has no `Quantity`, Bran has neither `UnitPrice` nor `TotalPrice`,
/// and the last row has no `Product`.
pub const SPARSE_CSV: &str = "\
OrderDate,Product,Category,Quantity,UnitPrice,TotalPrice
2014-03-01,Carrot,Bars,,2.0,10
2014-03-02,Bran,Cookies,4,,
2014-03-03,,Cookies,2,1.0,5
";

/// Write `contents` to `name` inside a fresh temporary directory.
///
/// The caller must keep the returned `TempDir` alive while the file is used.
pub fn write_csv(name: &str, contents: &str) -> (PathBuf, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (path, tmp_dir)
}

/// Load [`SALES_CSV`] into a dashboard.
pub fn setup_dashboard() -> (SalesDashboard, tempfile::TempDir) {
    let (path, tmp_dir) = write_csv("sales.csv", SALES_CSV);
    let dashboard = SalesDashboard::builder().dataset(&path).build().unwrap();
    (dashboard, tmp_dir)
}

/// Load [`SPARSE_CSV`] into a dashboard.
pub fn setup_sparse_dashboard() -> (SalesDashboard, tempfile::TempDir) {
    let (path, tmp_dir) = write_csv("sparse.csv", SPARSE_CSV);
    let dashboard = SalesDashboard::builder().dataset(&path).build().unwrap();
    (dashboard, tmp_dir)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(date(start), date(end))
}

/// January 2014, the range holding exactly three orders.
pub fn january_2014() -> DateRange {
    range("2014-01-01", "2014-01-31")
}

/// March 2014, the span of [`SPARSE_CSV`].
pub fn march_2014() -> DateRange {
    range("2014-03-01", "2014-03-31")
}
