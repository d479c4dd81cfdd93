//! Input row model for blacklist activity exports.

use serde::{Deserialize, Serialize};

/// Placeholder used when `account` or `province` is blank or missing.
pub const UNKNOWN: &str = "未知";

/// Group label for traffic that no blacklist rule matched.
pub const NOT_TRIGGERED_GROUP: &str = "未触发黑名单部分";

/// Column names recognised in the header row.
pub mod columns {
    pub const DT: &str = "dt";
    pub const ACCOUNT: &str = "account";
    pub const PROVINCE: &str = "province";
    pub const GROUP: &str = "group";
    pub const TOTAL_OUTBOUND: &str = "total_outbound_count";
    pub const BLACK_OUTBOUND: &str = "black_outbound_count";
    pub const TOTAL_PICKUP: &str = "total_pickup_count";
    pub const BLACK_PICKUP: &str = "black_pickup_count";
    pub const TOTAL_PAY: &str = "total_pay_count";
    pub const BLACK_PAY: &str = "black_pay_count";
    pub const TOTAL_COMPLAIN: &str = "total_complain_count";
    pub const BLACK_COMPLAIN: &str = "black_complain_count";
}

/// Which column set a source file carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Outbound, pickup and pay counters only.
    #[default]
    Basic,
    /// Basic plus the complaint counter pair.
    Extended,
}

impl SchemaKind {
    pub fn has_complaints(self) -> bool {
        matches!(self, SchemaKind::Extended)
    }
}

/// One parsed data row.
///
/// `black_*` counters are expected to be a subset of the matching `total_*`
/// counter, but nothing enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub dt: String,
    pub account: String,
    pub province: String,
    pub group: String,

    pub total_outbound_count: u64,
    pub black_outbound_count: u64,
    pub total_pickup_count: u64,
    pub black_pickup_count: u64,
    pub total_pay_count: u64,
    pub black_pay_count: u64,
    pub total_complain_count: u64,
    pub black_complain_count: u64,
}

impl Record {
    /// Returns `true` when the group label is a non-empty run of ASCII digits,
    /// i.e. it looks like a blacklist rule id.
    pub fn has_numeric_group(&self) -> bool {
        is_numeric_label(&self.group)
    }
}

pub(crate) fn is_numeric_label(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
