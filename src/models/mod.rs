pub mod chart;
pub mod metrics;
pub mod transaction;

pub use chart::*;
pub use metrics::*;
pub use transaction::*;
