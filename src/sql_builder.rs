//! SQL builder with parameterized query construction.
//!
//! Every user-supplied value is bound through DuckDB's `?` placeholders and
//! never interpolated. Column names are passed in already quoted (see
//! [`quote_ident`]). Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use sales_dashboard::sql_builder::{quote_ident, SqlBuilder};
//! let (sql, params) = SqlBuilder::new("sales")
//!     .where_between(&quote_ident("OrderDate"), "2014-01-01", "2014-01-31", "DATE")
//!     .where_eq(&quote_ident("Product"), "Bread")
//!     .order_by(&["rowid"])
//!     .build();
//! assert_eq!(params.len(), 3);
//! ```

/// Quote a column name as a DuckDB identifier, escaping embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a value as a SQL string literal.
///
/// Only for statements DuckDB cannot parameterize (table functions in DDL).
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Builds parameterized SQL queries.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
        }
    }

    /// Set the select list (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a raw WHERE condition using `?` for each param, in order.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add an IN condition. An empty value list produces `FALSE`.
    pub fn where_in(&mut self, column: &str, values: &[&str]) -> &mut Self {
        if values.is_empty() {
            self.where_clauses.push("FALSE".to_string());
            return self;
        }
        let placeholders: Vec<&str> = values.iter().map(|_| "?").collect();
        self.where_clauses
            .push(format!("{} IN ({})", column, placeholders.join(", ")));
        self.params.extend(values.iter().map(|v| v.to_string()));
        self
    }

    /// Add a case-insensitive substring condition. `%` and `_` in `needle`
    /// match literally.
    pub fn where_contains(&mut self, column: &str, needle: &str) -> &mut Self {
        self.where_clauses
            .push(format!("contains(LOWER({}), LOWER(?))", column));
        self.params.push(needle.to_string());
        self
    }

    /// Add `{column} >= CAST(? AS {sql_type})`.
    pub fn where_gte(&mut self, column: &str, value: &str, sql_type: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} >= CAST(? AS {})", column, sql_type));
        self.params.push(value.to_string());
        self
    }

    /// Add `{column} <= CAST(? AS {sql_type})`.
    pub fn where_lte(&mut self, column: &str, value: &str, sql_type: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} <= CAST(? AS {})", column, sql_type));
        self.params.push(value.to_string());
        self
    }

    /// Add an inclusive range condition on both bounds.
    pub fn where_between(
        &mut self,
        column: &str,
        low: &str,
        high: &str,
        sql_type: &str,
    ) -> &mut Self {
        self.where_clauses.push(format!(
            "{} BETWEEN CAST(? AS {}) AND CAST(? AS {})",
            column, sql_type, sql_type
        ));
        self.params.push(low.to_string());
        self.params.push(high.to_string());
        self
    }

    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols.extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"value DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Build the final SQL string and its parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        (parts.join("\n"), self.params.clone())
    }
}
