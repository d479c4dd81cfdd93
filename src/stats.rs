use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Grouping key of a result row. Only the dimensions a reduction groups by
/// are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub group: Option<String>,
    pub province: Option<String>,
    pub account: Option<String>,
}

/// Running sums for one grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsBucket {
    pub record_count: usize,

    pub total_outbound: u64,
    pub black_outbound: u64,
    pub total_pickup: u64,
    pub black_pickup: u64,
    pub total_pay: u64,
    pub black_pay: u64,
    pub total_complain: u64,
    pub black_complain: u64,
}

impl StatsBucket {
    /// Folds one record in. Sums saturate at `u64::MAX` instead of wrapping.
    pub fn add(&mut self, r: &Record) {
        self.record_count += 1;

        self.total_outbound = self.total_outbound.saturating_add(r.total_outbound_count);
        self.black_outbound = self.black_outbound.saturating_add(r.black_outbound_count);
        self.total_pickup = self.total_pickup.saturating_add(r.total_pickup_count);
        self.black_pickup = self.black_pickup.saturating_add(r.black_pickup_count);
        self.total_pay = self.total_pay.saturating_add(r.total_pay_count);
        self.black_pay = self.black_pay.saturating_add(r.black_pay_count);
        self.total_complain = self.total_complain.saturating_add(r.total_complain_count);
        self.black_complain = self.black_complain.saturating_add(r.black_complain_count);
    }

    /// Freezes the sums into a [`StatsRow`] with derived rates.
    pub fn finish(self, key: RowKey) -> StatsRow {
        StatsRow {
            group: key.group,
            province: key.province,
            account: key.account,
            record_count: self.record_count,

            total_outbound: self.total_outbound,
            black_outbound: self.black_outbound,
            total_pickup: self.total_pickup,
            black_pickup: self.black_pickup,
            total_pay: self.total_pay,
            black_pay: self.black_pay,
            total_complain: self.total_complain,
            black_complain: self.black_complain,

            black_outbound_rate: pct(self.black_outbound, self.total_outbound),
            black_pickup_rate: pct(self.black_pickup, self.total_pickup),
            black_pay_rate: pct(self.black_pay, self.total_pay),
            black_complain_rate: pct(self.black_complain, self.total_complain),
        }
    }
}

/// Summed counters plus blacklist rates for one key.
///
/// Rates are percentages already rounded to two decimals by [`pct`];
/// exporters print them as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub account: Option<String>,
    pub record_count: usize,

    pub total_outbound: u64,
    pub black_outbound: u64,
    pub total_pickup: u64,
    pub black_pickup: u64,
    pub total_pay: u64,
    pub black_pay: u64,
    pub total_complain: u64,
    pub black_complain: u64,

    pub black_outbound_rate: f64,
    pub black_pickup_rate: f64,
    pub black_pay_rate: f64,
    pub black_complain_rate: f64,
}

impl StatsRow {
    /// Human-readable key, e.g. `"acc-1 / 浙江"`. Empty for the overall row.
    pub fn label(&self) -> String {
        [&self.group, &self.account, &self.province]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Share of `part` in `total` as a percentage rounded to two decimals.
///
/// A zero `total` yields 0. The result is not clamped, so `part > total`
/// produces a value above 100.
pub fn pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2((part as f64 / total as f64) * 100.0)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
