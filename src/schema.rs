//! Column typing for the loaded sales table.
//!
//! The schema is computed once, right after the table is created, and
//! partitions the columns into the qualitative and quantitative lists that
//! chart selectors and predicates are validated against.

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Semantic type of a column, derived from its DuckDB type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Categorical,
    Numeric,
    Temporal,
    Other,
}

impl ColumnKind {
    /// Classify a DuckDB type name as reported by `DESCRIBE`.
    pub fn from_duckdb_type(type_name: &str) -> Self {
        let upper = type_name.trim().to_ascii_uppercase();
        // DECIMAL(18,3) and friends carry a precision suffix
        let base = upper.split('(').next().unwrap_or("").trim();
        match base {
            "VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" | "UUID" | "ENUM" => {
                ColumnKind::Categorical
            }
            "TINYINT" | "SMALLINT" | "INTEGER" | "INT" | "BIGINT" | "HUGEINT" | "UTINYINT"
            | "USMALLINT" | "UINTEGER" | "UBIGINT" | "UHUGEINT" | "FLOAT" | "REAL" | "DOUBLE"
            | "DECIMAL" | "NUMERIC" => ColumnKind::Numeric,
            "DATE" | "TIME" | "TIMESTAMP" | "TIMESTAMP WITH TIME ZONE" | "TIMESTAMPTZ"
            | "TIMESTAMP_S" | "TIMESTAMP_MS" | "TIMESTAMP_NS" => ColumnKind::Temporal,
            _ => ColumnKind::Other,
        }
    }

    /// Qualitative columns feed categorical axes and the frequency histogram.
    pub fn is_qualitative(self) -> bool {
        matches!(self, ColumnKind::Categorical | ColumnKind::Temporal)
    }

    pub fn is_quantitative(self) -> bool {
        self == ColumnKind::Numeric
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    pub kind: ColumnKind,
}

/// Columns of the sales table in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<Column>,
}

impl TableSchema {
    /// Build a schema from `(name, duckdb_type)` pairs.
    pub fn from_describe<I, S, T>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let columns = rows
            .into_iter()
            .map(|(name, sql_type)| {
                let sql_type = sql_type.into();
                Column {
                    name: name.into(),
                    kind: ColumnKind::from_duckdb_type(&sql_type),
                    sql_type,
                }
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column, failing with `UnknownColumn`.
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| DashboardError::UnknownColumn(name.to_string()))
    }

    /// Column names a qualitative selector may offer.
    pub fn qualitative_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_qualitative())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Column names a quantitative selector may offer.
    pub fn quantitative_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_quantitative())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Require `name` to be a qualitative column.
    pub fn require_qualitative(&self, name: &str) -> Result<&Column> {
        let column = self.require(name)?;
        if column.kind.is_qualitative() {
            Ok(column)
        } else {
            Err(DashboardError::ColumnType {
                column: name.to_string(),
                expected: "qualitative",
            })
        }
    }

    /// Require `name` to be a quantitative column.
    pub fn require_quantitative(&self, name: &str) -> Result<&Column> {
        let column = self.require(name)?;
        if column.kind.is_quantitative() {
            Ok(column)
        } else {
            Err(DashboardError::ColumnType {
                column: name.to_string(),
                expected: "quantitative",
            })
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableSchema {
        TableSchema::from_describe([
            ("OrderDate", "DATE"),
            ("Product", "VARCHAR"),
            ("Quantity", "BIGINT"),
            ("Discount", "DECIMAL(5,2)"),
            ("Returned", "BOOLEAN"),
        ])
    }

    #[test]
    fn partitions_columns_by_kind() {
        let schema = sample();
        assert_eq!(schema.qualitative_columns(), vec!["OrderDate", "Product"]);
        assert_eq!(schema.quantitative_columns(), vec!["Quantity", "Discount"]);
    }

    #[test]
    fn boolean_is_in_neither_list() {
        let schema = sample();
        assert_eq!(schema.column("Returned").unwrap().kind, ColumnKind::Other);
        assert!(schema.require_qualitative("Returned").is_err());
        assert!(schema.require_quantitative("Returned").is_err());
    }

    #[test]
    fn require_reports_unknown_and_mismatched_columns() {
        let schema = sample();
        assert!(matches!(
            schema.require("Nope"),
            Err(DashboardError::UnknownColumn(_))
        ));
        assert!(matches!(
            schema.require_quantitative("Product"),
            Err(DashboardError::ColumnType { .. })
        ));
    }
}
