//! Query modules over the loaded sales table.
//!
//! Every query borrows the [`Connection`](crate::connection::Connection) and
//! the [`TableSchema`](crate::schema::TableSchema) through a [`View`]; nothing
//! here owns or mutates the data.

pub mod aggregate;
pub mod charts;
pub mod filter;

pub use aggregate::aggregate;
pub use charts::{
    feature_scatter, frequency_histogram, price_scatter, quantity_by_product,
    unit_price_by_month,
};
pub use filter::{filter, DateRange, Predicate, Selection, View};
