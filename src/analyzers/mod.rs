//! Aggregation engine over parsed blacklist records.
//!
//! [`aggregate`] holds the grouping reductions, [`distinct`] the filter-value
//! helpers, and [`batch`] the per-file orchestration for multi-file uploads.

pub mod aggregate;
pub mod batch;
pub mod distinct;

pub use aggregate::{
    Dimension, aggregate_by, aggregate_by_account, aggregate_by_account_province,
    aggregate_by_group, aggregate_by_province, aggregate_overall,
};
pub use batch::{BatchFileResult, BatchReport, summarize_batch, summarize_file};
pub use distinct::{has_multiple_numeric_groups, unique_accounts, unique_groups, unique_provinces};
