//! DuckDB connection wrapper: dataset loading and query execution.
//!
//! The sales CSV is read once into an in-memory table. Required columns are
//! forced to fixed types, `OrderDate` is parsed into a `DATE`, and every other
//! column keeps the type DuckDB sniffs for it.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::{self, DATE_COLUMN, SALES_TABLE};
use crate::error::{DashboardError, Result};
use crate::schema::TableSchema;
use crate::sql_builder::{quote_ident, quote_literal};

/// Options controlling how a CSV file is turned into the sales table.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// `strptime` format for `OrderDate`. `None` expects ISO `YYYY-MM-DD`.
    pub date_format: Option<String>,
}

/// Wraps an in-memory DuckDB database holding the sales table.
pub struct Connection {
    conn: DuckDbConnection,
}

impl Connection {
    /// Open an empty in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Load a CSV file into the sales table, replacing any previous load.
    ///
    /// Any failure to read or type the file is reported as
    /// [`DashboardError::DataUnavailable`].
    pub fn load_csv(&self, path: &Path, options: &LoadOptions) -> Result<TableSchema> {
        if !path.is_file() {
            return Err(DashboardError::unavailable(path, "file not found"));
        }
        // Forward slashes keep DuckDB happy on Windows paths
        let path_str = path.to_string_lossy().replace('\\', "/");

        let sniffed = self
            .describe(&format!(
                "SELECT * FROM read_csv_auto({}, header = true, delim = ',')",
                quote_literal(&path_str)
            ))
            .map_err(|e| DashboardError::unavailable(path, e.to_string()))?;

        let missing: Vec<&str> = config::required_columns()
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| !sniffed.iter().any(|(col, _)| col == name))
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::unavailable(
                path,
                format!("missing required columns: {}", missing.join(", ")),
            ));
        }

        let types = config::required_columns()
            .iter()
            .map(|(name, ty)| format!("{}: {}", quote_literal(name), quote_literal(ty)))
            .collect::<Vec<_>>()
            .join(", ");

        let date = quote_ident(DATE_COLUMN);
        let date_expr = match &options.date_format {
            Some(fmt) => format!(
                "CAST(strptime(TRIM({}), {}) AS DATE)",
                date,
                quote_literal(fmt)
            ),
            None => format!("CAST(TRIM({}) AS DATE)", date),
        };

        let sql = format!(
            "CREATE OR REPLACE TABLE {table} AS \
             SELECT * REPLACE ({date_expr} AS {date}) \
             FROM read_csv_auto({src}, header = true, delim = ',', types = {{{types}}})",
            table = SALES_TABLE,
            date_expr = date_expr,
            date = date,
            src = quote_literal(&path_str),
            types = types,
        );
        debug!(sql = %sql, "creating sales table");
        self.conn
            .execute_batch(&sql)
            .map_err(|e| DashboardError::unavailable(path, e.to_string()))?;

        let schema = TableSchema::from_describe(self.describe(&format!("SELECT * FROM {}", SALES_TABLE))?);
        let rows = self.row_count()?;
        info!(
            path = %path.display(),
            rows,
            columns = schema.len(),
            "loaded sales dataset"
        );
        Ok(schema)
    }

    /// Number of rows in the sales table.
    pub fn row_count(&self) -> Result<i64> {
        let value = self.execute_scalar(&format!("SELECT COUNT(*) FROM {}", SALES_TABLE), &[])?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Execute SQL and return each row as a column-name keyed map.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        debug!(sql = %sql, params = ?params, "execute");
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the query has run
        let column_names: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names().into_iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                map.insert(name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row, if any.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        debug!(sql = %sql, params = ?params, "execute_scalar");
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;
        match rows.next()? {
            Some(row) => Ok(Some(convert_value_ref(row.get_ref(0)?))),
            None => Ok(None),
        }
    }

    /// Column names and DuckDB types of a query's result.
    fn describe(&self, query: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT column_name, column_type FROM (DESCRIBE {})",
            query
        ))?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let ty: String = row.get(1)?;
            out.push((name, ty));
        }
        Ok(out)
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
///
/// Dates and timestamps become ISO-8601 strings.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;

    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::UTinyInt(n) => Value::Number(n.into()),
        ValueRef::USmallInt(n) => Value::Number(n.into()),
        ValueRef::UInt(n) => Value::Number(n.into()),
        ValueRef::UBigInt(n) => Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Value::Number(i.into()),
            Err(_) => Value::String(n.to_string()),
        },
        ValueRef::Float(f) => float_value(f64::from(f)),
        ValueRef::Double(f) => float_value(f),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(float_value)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Date32(days) => epoch_date()
            .checked_add_signed(chrono::Duration::days(i64::from(days)))
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        ValueRef::Timestamp(unit, raw) => DateTime::from_timestamp_micros(unit.to_micros(raw))
            .map(|ts| Value::String(ts.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null),
        // Blobs, intervals and nested types never appear in a sales CSV
        _ => Value::Null,
    }
}

fn float_value(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}
