//! Profitability analytics.
//!
//! Every function here is pure: it takes the records it needs and returns a
//! fresh report. Fetching records is the caller's job (see [`crate::Ledger`]).

mod engine;
pub mod period;
pub mod report;

pub use engine::{
    most_profitable, overall_stats, store_rollup, time_range_stats, DEFAULT_RANKING_LIMIT,
};
pub use period::{parse_date, DateRange};
pub use report::{
    Dashboard, DerivedMetrics, ProductProfitability, ProfitStats, StoreStats, TimeRangeStats,
};
