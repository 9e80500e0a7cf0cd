//! Date-range and per-column filtering of the sales table.
//!
//! A [`Selection`] is the complete per-interaction filter state. Applying it
//! produces a [`View`]: a borrowed handle that compiles the selection into a
//! parameterized `WHERE` clause each time it is queried. The underlying table
//! is never modified.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{
    CATEGORY_COLUMN, DATE_COLUMN, PRODUCT_COLUMN, QUANTITY_COLUMN, SALES_TABLE,
    TOTAL_PRICE_COLUMN, UNIT_PRICE_COLUMN,
};
use crate::connection::Connection;
use crate::error::{DashboardError, Result};
use crate::models::Transaction;
use crate::schema::{ColumnKind, TableSchema};
use crate::sql_builder::{quote_ident, SqlBuilder};

const ISO_DATE: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` date range.
///
/// Construction never validates the order of the bounds; an inverted range
/// simply matches nothing. Use [`checked`](Self::checked) to reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range covering exactly one day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// Both bounds set to the local current date, as the date pickers default.
    pub fn today() -> Self {
        Self::single_day(Local::now().date_naive())
    }

    /// Parse both bounds from ISO `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Fail with `InvalidRange` when `start > end`.
    pub fn checked(self) -> Result<Self> {
        if self.is_inverted() {
            Err(DashboardError::InvalidRange {
                start: self.start,
                end: self.end,
            })
        } else {
            Ok(self)
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// The overlap of two ranges; inverted (empty) when they do not meet.
    pub fn intersect(&self, other: &DateRange) -> DateRange {
        DateRange::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// The banner shown above the dashboard.
    pub fn caption(&self) -> String {
        format!("You have chosen analytics from: {} to {}", self.start, self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE)
        .map_err(|e| DashboardError::InvalidArgument(format!("invalid date '{}': {}", s, e)))
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// An extra constraint on one column, AND-ed after the date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Exact match on a qualitative column.
    Equals { column: String, value: String },
    /// Match any of the listed values; an empty list matches nothing.
    OneOf { column: String, values: Vec<String> },
    /// Case-insensitive substring match on a qualitative column.
    Contains { column: String, pattern: String },
    /// Inclusive numeric range; a missing bound is open.
    Between {
        column: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Inclusive date range on a temporal column.
    DateBetween {
        column: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl Predicate {
    pub fn equals(column: &str, value: &str) -> Self {
        Predicate::Equals {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub fn one_of(column: &str, values: &[&str]) -> Self {
        Predicate::OneOf {
            column: column.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn contains(column: &str, pattern: &str) -> Self {
        Predicate::Contains {
            column: column.to_string(),
            pattern: pattern.to_string(),
        }
    }

    pub fn between(column: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Predicate::Between {
            column: column.to_string(),
            min,
            max,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Predicate::Equals { column, .. }
            | Predicate::OneOf { column, .. }
            | Predicate::Contains { column, .. }
            | Predicate::Between { column, .. }
            | Predicate::DateBetween { column, .. } => column,
        }
    }

    /// Check the column exists and has a kind this predicate can test.
    pub fn validate(&self, schema: &TableSchema) -> Result<()> {
        let column = schema.require(self.column())?;
        let ok = match self {
            Predicate::Equals { .. } | Predicate::OneOf { .. } | Predicate::Contains { .. } => {
                column.kind.is_qualitative()
            }
            Predicate::Between { .. } => column.kind.is_quantitative(),
            Predicate::DateBetween { .. } => column.kind == ColumnKind::Temporal,
        };
        if ok {
            return Ok(());
        }
        let expected = match self {
            Predicate::Between { .. } => "quantitative",
            Predicate::DateBetween { .. } => "a date",
            _ => "qualitative",
        };
        Err(DashboardError::ColumnType {
            column: column.name.clone(),
            expected,
        })
    }

    /// Append this predicate to `qb`. Assumes [`validate`](Self::validate) passed.
    fn apply(&self, qb: &mut SqlBuilder, schema: &TableSchema) {
        let ident = quote_ident(self.column());
        // Temporal columns compare against text the way the user typed it
        let text = match schema.column(self.column()).map(|c| c.kind) {
            Some(ColumnKind::Temporal) => format!("CAST({} AS VARCHAR)", ident),
            _ => ident.clone(),
        };
        match self {
            Predicate::Equals { value, .. } => {
                qb.where_eq(&text, value);
            }
            Predicate::OneOf { values, .. } => {
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                qb.where_in(&text, &values);
            }
            Predicate::Contains { pattern, .. } => {
                qb.where_contains(&text, pattern);
            }
            Predicate::Between { min, max, .. } => {
                if let Some(min) = min {
                    qb.where_gte(&ident, &min.to_string(), "DOUBLE");
                }
                if let Some(max) = max {
                    qb.where_lte(&ident, &max.to_string(), "DOUBLE");
                }
            }
            Predicate::DateBetween { start, end, .. } => {
                qb.where_between(
                    &ident,
                    &start.format(ISO_DATE).to_string(),
                    &end.format(ISO_DATE).to_string(),
                    "DATE",
                );
            }
        }
    }
}

/// Parse the compact predicate syntax used on the command line.
///
/// | syntax | predicate |
/// |---|---|
/// | `col=value` | `Equals` |
/// | `col=a\|b\|c` | `OneOf` |
/// | `col~text` | `Contains` |
/// | `col>=n`, `col<=n` | `Between` with one bound |
/// | `col@2014-01-01..2014-03-31` | `DateBetween` |
impl FromStr for Predicate {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DashboardError::InvalidArgument(format!("invalid predicate '{}'", s));
        let number = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| DashboardError::InvalidArgument(format!("invalid number in '{}'", s)))
        };

        if let Some((col, v)) = s.split_once(">=") {
            return Ok(Predicate::between(col.trim(), Some(number(v)?), None));
        }
        if let Some((col, v)) = s.split_once("<=") {
            return Ok(Predicate::between(col.trim(), None, Some(number(v)?)));
        }
        if let Some((col, v)) = s.split_once('~') {
            return Ok(Predicate::contains(col.trim(), v));
        }
        if let Some((col, v)) = s.split_once('@') {
            let (start, end) = v.split_once("..").ok_or_else(invalid)?;
            return Ok(Predicate::DateBetween {
                column: col.trim().to_string(),
                start: parse_date(start)?,
                end: parse_date(end)?,
            });
        }
        if let Some((col, v)) = s.split_once('=') {
            if col.trim().is_empty() {
                return Err(invalid());
            }
            if v.contains('|') {
                let values: Vec<&str> = v.split('|').collect();
                return Ok(Predicate::one_of(col.trim(), &values));
            }
            return Ok(Predicate::equals(col.trim(), v));
        }
        Err(invalid())
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The full filter state of one interaction: a date range plus predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub range: DateRange,
    pub predicates: Vec<Predicate>,
}

impl Selection {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            predicates: Vec::new(),
        }
    }

    /// Add a predicate (builder style).
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn validate(&self, schema: &TableSchema) -> Result<()> {
        self.predicates.iter().try_for_each(|p| p.validate(schema))
    }
}

impl From<DateRange> for Selection {
    fn from(range: DateRange) -> Self {
        Selection::new(range)
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// A filtered, non-owning window onto the sales table.
pub struct View<'a> {
    conn: &'a Connection,
    schema: &'a TableSchema,
    selection: Selection,
}

impl<'a> View<'a> {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn range(&self) -> DateRange {
        self.selection.range
    }

    pub fn schema(&self) -> &'a TableSchema {
        self.schema
    }

    pub fn connection(&self) -> &'a Connection {
        self.conn
    }

    /// A builder over the sales table with this view's conditions applied.
    pub fn query(&self) -> SqlBuilder {
        let mut qb = SqlBuilder::new(SALES_TABLE);
        qb.where_between(
            &quote_ident(DATE_COLUMN),
            &self.selection.range.start.format(ISO_DATE).to_string(),
            &self.selection.range.end.format(ISO_DATE).to_string(),
            "DATE",
        );
        for predicate in &self.selection.predicates {
            predicate.apply(&mut qb, self.schema);
        }
        qb
    }

    /// Number of rows in the view.
    pub fn count(&self) -> Result<i64> {
        let (sql, params) = self.query().select(&["COUNT(*)"]).build();
        let value = self.conn.execute_scalar(&sql, &params)?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    /// The view's rows as typed transactions, in file order.
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        let cols: Vec<String> = [
            DATE_COLUMN,
            PRODUCT_COLUMN,
            CATEGORY_COLUMN,
            QUANTITY_COLUMN,
            UNIT_PRICE_COLUMN,
            TOTAL_PRICE_COLUMN,
        ]
        .iter()
        .map(|c| quote_ident(c))
        .collect();
        let cols: Vec<&str> = cols.iter().map(String::as_str).collect();

        let (sql, params) = self.query().select(&cols).order_by(&["rowid"]).build();
        self.conn.execute_into(&sql, &params)
    }

    /// Every column of the view's rows, in file order (the table explorer).
    pub fn records(&self) -> Result<Vec<HashMap<String, Value>>> {
        let (sql, params) = self.query().order_by(&["rowid"]).build();
        self.conn.execute(&sql, &params)
    }

    /// Narrow this view further: ranges intersect, predicates accumulate.
    pub fn refine(&self, selection: &Selection) -> Result<View<'a>> {
        let mut predicates = self.selection.predicates.clone();
        predicates.extend(selection.predicates.iter().cloned());
        filter(
            self.conn,
            self.schema,
            Selection {
                range: self.selection.range.intersect(&selection.range),
                predicates,
            },
        )
    }
}

/// Apply `selection` to the sales table.
///
/// Predicates are checked against `schema` before any SQL runs. An inverted
/// date range is not an error here: the view is simply empty.
pub fn filter<'a>(
    conn: &'a Connection,
    schema: &'a TableSchema,
    selection: Selection,
) -> Result<View<'a>> {
    selection.validate(schema)?;
    if selection.range.is_inverted() {
        warn!(range = %selection.range, "date range is inverted; view will be empty");
    }
    debug!(
        range = %selection.range,
        predicates = selection.predicates.len(),
        "filter"
    );
    Ok(View {
        conn,
        schema,
        selection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn inverted_range_is_detected_not_rejected() {
        let range = DateRange::new(d("2014-02-01"), d("2014-01-01"));
        assert!(range.is_inverted());
        assert!(matches!(
            range.checked(),
            Err(DashboardError::InvalidRange { .. })
        ));
        assert!(!range.contains(d("2014-01-15")));
    }

    #[test]
    fn intersect_narrows_both_bounds() {
        let a = DateRange::new(d("2014-01-01"), d("2014-03-31"));
        let b = DateRange::new(d("2014-02-01"), d("2014-12-31"));
        assert_eq!(a.intersect(&b), DateRange::new(d("2014-02-01"), d("2014-03-31")));
        assert_eq!(a.intersect(&a), a);
    }

    #[test]
    fn caption_names_both_bounds() {
        let range = DateRange::new(d("2014-01-01"), d("2014-01-31"));
        assert_eq!(
            range.caption(),
            "You have chosen analytics from: 2014-01-01 to 2014-01-31"
        );
    }

    #[test]
    fn parses_predicate_syntax() {
        assert_eq!(
            "Product=Bread".parse::<Predicate>().unwrap(),
            Predicate::equals("Product", "Bread")
        );
        assert_eq!(
            "Category=Bars|Cookies".parse::<Predicate>().unwrap(),
            Predicate::one_of("Category", &["Bars", "Cookies"])
        );
        assert_eq!(
            "Product~choc".parse::<Predicate>().unwrap(),
            Predicate::contains("Product", "choc")
        );
        assert_eq!(
            "Quantity>=10".parse::<Predicate>().unwrap(),
            Predicate::between("Quantity", Some(10.0), None)
        );
        assert_eq!(
            "TotalPrice<=99.5".parse::<Predicate>().unwrap(),
            Predicate::between("TotalPrice", None, Some(99.5))
        );
        assert_eq!(
            "OrderDate@2014-01-01..2014-01-31".parse::<Predicate>().unwrap(),
            Predicate::DateBetween {
                column: "OrderDate".into(),
                start: d("2014-01-01"),
                end: d("2014-01-31"),
            }
        );
    }

    #[test]
    fn rejects_malformed_predicates() {
        assert!("Product".parse::<Predicate>().is_err());
        assert!("=Bread".parse::<Predicate>().is_err());
        assert!("Quantity>=lots".parse::<Predicate>().is_err());
        assert!("OrderDate@2014-01-01".parse::<Predicate>().is_err());
    }

    #[test]
    fn predicates_validate_against_column_kinds() {
        let schema = TableSchema::from_describe([
            ("OrderDate", "DATE"),
            ("Product", "VARCHAR"),
            ("Quantity", "BIGINT"),
        ]);
        assert!(Predicate::equals("Product", "A").validate(&schema).is_ok());
        assert!(Predicate::between("Quantity", Some(1.0), None)
            .validate(&schema)
            .is_ok());
        assert!(matches!(
            Predicate::between("Product", Some(1.0), None).validate(&schema),
            Err(DashboardError::ColumnType { .. })
        ));
        assert!(matches!(
            Predicate::equals("Quantity", "3").validate(&schema),
            Err(DashboardError::ColumnType { .. })
        ));
        assert!(matches!(
            Predicate::equals("Nope", "x").validate(&schema),
            Err(DashboardError::UnknownColumn(_))
        ));
    }

    #[test]
    fn view_sql_binds_range_and_predicates_in_order() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = TableSchema::from_describe([
            ("OrderDate", "DATE"),
            ("Product", "VARCHAR"),
            ("Quantity", "BIGINT"),
        ]);
        let selection = Selection::new(DateRange::new(d("2014-01-01"), d("2014-01-31")))
            .with(Predicate::one_of("Product", &["A", "B"]))
            .with(Predicate::between("Quantity", Some(2.0), None));
        let view = filter(&conn, &schema, selection).unwrap();
        let (sql, params) = view.query().build();
        assert!(sql.contains("\"OrderDate\" BETWEEN CAST(? AS DATE) AND CAST(? AS DATE)"));
        assert!(sql.contains("\"Product\" IN (?, ?)"));
        assert!(sql.contains("\"Quantity\" >= CAST(? AS DOUBLE)"));
        assert_eq!(params, vec!["2014-01-01", "2014-01-31", "A", "B", "2"]);
    }
}
