//! Grouping reductions over parsed records.
//!
//! Every reduction is a call to [`aggregate_by`] with a different key
//! function. Rows come back in first-seen order; the province, account and
//! account×province reductions then apply a stable descending sort on total
//! outbound volume.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::{Record, UNKNOWN};
use crate::stats::{RowKey, StatsBucket, StatsRow};

/// Slicing dimension for a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Group,
    Province,
    Account,
    AccountProvince,
}

impl Dimension {
    /// Runs the reduction for this dimension. `filter` narrows provinces to
    /// one group and account×province to one account; other dimensions
    /// ignore it.
    pub fn aggregate(self, records: &[Record], filter: Option<&str>) -> Vec<StatsRow> {
        match self {
            Dimension::Group => aggregate_by_group(records),
            Dimension::Province => aggregate_by_province(records, filter),
            Dimension::Account => aggregate_by_account(records),
            Dimension::AccountProvince => aggregate_by_account_province(records, filter),
        }
    }
}

/// Groups `records` by `key_fn` and folds each group into one [`StatsRow`].
///
/// Output order is the order in which each key was first seen.
pub fn aggregate_by<'a, I, K>(records: I, key_fn: K) -> Vec<StatsRow>
where
    I: IntoIterator<Item = &'a Record>,
    K: Fn(&Record) -> RowKey,
{
    let mut index: HashMap<RowKey, usize> = HashMap::new();
    let mut buckets: Vec<(RowKey, StatsBucket)> = Vec::new();

    for record in records {
        let key = key_fn(record);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = buckets.len();
                index.insert(key.clone(), slot);
                buckets.push((key, StatsBucket::default()));
                slot
            }
        };
        buckets[slot].1.add(record);
    }

    buckets
        .into_iter()
        .map(|(key, bucket)| bucket.finish(key))
        .collect()
}

/// Sums every counter across all records.
pub fn aggregate_overall(records: &[Record]) -> StatsRow {
    let bucket = records.iter().fold(StatsBucket::default(), |mut acc, r| {
        acc.add(r);
        acc
    });
    bucket.finish(RowKey::default())
}

/// One row per distinct `group` value, in first-seen order.
pub fn aggregate_by_group(records: &[Record]) -> Vec<StatsRow> {
    aggregate_by(records, |r| RowKey {
        group: Some(r.group.clone()),
        ..Default::default()
    })
}

/// One row per province, optionally restricted to a single group.
pub fn aggregate_by_province(records: &[Record], group: Option<&str>) -> Vec<StatsRow> {
    let filtered = records
        .iter()
        .filter(|r| group.is_none_or(|g| r.group == g));
    let mut rows = aggregate_by(filtered, |r| RowKey {
        province: Some(label_or_unknown(&r.province)),
        ..Default::default()
    });
    sort_by_total_outbound_desc(&mut rows);
    rows
}

pub fn aggregate_by_account(records: &[Record]) -> Vec<StatsRow> {
    let mut rows = aggregate_by(records, |r| RowKey {
        account: Some(label_or_unknown(&r.account)),
        ..Default::default()
    });
    sort_by_total_outbound_desc(&mut rows);
    rows
}

/// One row per (account, province) pair, optionally for a single account.
pub fn aggregate_by_account_province(records: &[Record], account: Option<&str>) -> Vec<StatsRow> {
    let filtered = records
        .iter()
        .filter(|r| account.is_none_or(|a| label_or_unknown(&r.account) == a));
    let mut rows = aggregate_by(filtered, |r| RowKey {
        account: Some(label_or_unknown(&r.account)),
        province: Some(label_or_unknown(&r.province)),
        ..Default::default()
    });
    sort_by_total_outbound_desc(&mut rows);
    rows
}

/// Stable: rows with equal totals keep their relative order.
pub fn sort_by_total_outbound_desc(rows: &mut [StatsRow]) {
    rows.sort_by(|a, b| b.total_outbound.cmp(&a.total_outbound));
}

pub(crate) fn label_or_unknown(s: &str) -> String {
    if s.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NOT_TRIGGERED_GROUP;

    fn rec(account: &str, province: &str, group: &str, total: u64, black: u64) -> Record {
        Record {
            dt: "2024-05-01".to_string(),
            account: account.to_string(),
            province: province.to_string(),
            group: group.to_string(),
            total_outbound_count: total,
            black_outbound_count: black,
            total_pickup_count: total / 2,
            black_pickup_count: black / 2,
            total_pay_count: total / 10,
            black_pay_count: black / 10,
            total_complain_count: 0,
            black_complain_count: 0,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("a1", "浙江", "31", 100, 10),
            rec("a2", "江苏", "31", 300, 30),
            rec("a1", "江苏", NOT_TRIGGERED_GROUP, 200, 0),
            rec("a3", "广东", "", 300, 3),
            rec("a1", "浙江", "32", 50, 5),
        ]
    }

    fn assert_descending(rows: &[StatsRow]) {
        for pair in rows.windows(2) {
            assert!(pair[0].total_outbound >= pair[1].total_outbound);
        }
    }

    #[test]
    fn test_mixed_group_overall_and_groups() {
        let records = vec![
            rec("a", "p", "31", 1000, 100),
            rec("a", "p", NOT_TRIGGERED_GROUP, 2000, 0),
        ];

        let overall = aggregate_overall(&records);
        assert_eq!(overall.total_outbound, 3000);
        assert_eq!(overall.black_outbound, 100);
        assert_eq!(overall.black_outbound_rate, 3.33);
        assert_eq!(overall.label(), "");

        let groups = aggregate_by_group(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group.as_deref(), Some("31"));
        assert_eq!(groups[0].black_outbound_rate, 10.0);
        assert_eq!(groups[1].group.as_deref(), Some(NOT_TRIGGERED_GROUP));
        assert_eq!(groups[1].black_outbound_rate, 0.0);
    }

    #[test]
    fn test_overall_sums_every_counter() {
        let records = sample();
        let overall = aggregate_overall(&records);

        let sum = |f: fn(&Record) -> u64| records.iter().map(f).sum::<u64>();
        assert_eq!(overall.total_outbound, sum(|r| r.total_outbound_count));
        assert_eq!(overall.black_outbound, sum(|r| r.black_outbound_count));
        assert_eq!(overall.total_pickup, sum(|r| r.total_pickup_count));
        assert_eq!(overall.black_pickup, sum(|r| r.black_pickup_count));
        assert_eq!(overall.total_pay, sum(|r| r.total_pay_count));
        assert_eq!(overall.black_pay, sum(|r| r.black_pay_count));
        assert_eq!(overall.record_count, records.len());
    }

    #[test]
    fn test_overall_of_nothing_is_zero() {
        let overall = aggregate_overall(&[]);
        assert_eq!(overall.total_outbound, 0);
        assert_eq!(overall.black_outbound_rate, 0.0);
        assert_eq!(overall.record_count, 0);
    }

    #[test]
    fn test_group_keeps_first_seen_order_and_empty_group() {
        let rows = aggregate_by_group(&sample());
        let keys: Vec<_> = rows.iter().map(|r| r.group.clone().unwrap()).collect();
        assert_eq!(keys, vec!["31", NOT_TRIGGERED_GROUP, "", "32"]);
        assert_eq!(rows[0].total_outbound, 400);
    }

    #[test]
    fn test_partition_invariant_for_every_dimension() {
        let records = sample();
        let overall = aggregate_overall(&records);

        for dim in [
            Dimension::Group,
            Dimension::Province,
            Dimension::Account,
            Dimension::AccountProvince,
        ] {
            let rows = dim.aggregate(&records, None);
            let total: u64 = rows.iter().map(|r| r.total_outbound).sum();
            let count: usize = rows.iter().map(|r| r.record_count).sum();
            assert_eq!(total, overall.total_outbound, "{dim:?}");
            assert_eq!(count, overall.record_count, "{dim:?}");
        }
    }

    #[test]
    fn test_province_sorted_desc_with_stable_ties() {
        let rows = aggregate_by_province(&sample(), None);
        assert_descending(&rows);

        // 江苏 (500) first, then 广东 (300) and 浙江 (150).
        let keys: Vec<_> = rows.iter().map(|r| r.province.clone().unwrap()).collect();
        assert_eq!(keys, vec!["江苏", "广东", "浙江"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = vec![
            rec("x", "b", "1", 10, 0),
            rec("y", "a", "1", 10, 0),
            rec("z", "c", "1", 20, 0),
        ];
        let rows = aggregate_by_account(&records);
        let keys: Vec<_> = rows.iter().map(|r| r.account.clone().unwrap()).collect();
        assert_eq!(keys, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_province_group_filter_is_subset() {
        let records = sample();
        let all = aggregate_by_province(&records, None);
        let only31 = aggregate_by_province(&records, Some("31"));

        for row in &only31 {
            let full = all.iter().find(|r| r.province == row.province).unwrap();
            assert!(row.total_outbound <= full.total_outbound);
        }
        let total: u64 = only31.iter().map(|r| r.total_outbound).sum();
        assert_eq!(total, 400);

        assert!(aggregate_by_province(&records, Some("missing")).is_empty());
    }

    #[test]
    fn test_province_filter_equals_unfiltered_for_single_group() {
        let records = vec![rec("a", "p1", "7", 10, 1), rec("b", "p2", "7", 20, 2)];
        assert_eq!(
            aggregate_by_province(&records, Some("7")),
            aggregate_by_province(&records, None)
        );
    }

    #[test]
    fn test_account_province_composite_key() {
        let rows = aggregate_by_account_province(&sample(), None);
        assert_descending(&rows);
        assert_eq!(rows.len(), 4);

        let a1_zj = rows
            .iter()
            .find(|r| r.account.as_deref() == Some("a1") && r.province.as_deref() == Some("浙江"))
            .unwrap();
        assert_eq!(a1_zj.total_outbound, 150);
        assert_eq!(a1_zj.record_count, 2);
        assert!(a1_zj.group.is_none());
    }

    #[test]
    fn test_account_province_account_filter() {
        let rows = aggregate_by_account_province(&sample(), Some("a1"));
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.account.as_deref() == Some("a1")));
        assert_eq!(rows[0].province.as_deref(), Some("江苏"));
    }

    #[test]
    fn test_blank_keys_fall_back_to_unknown() {
        let records = vec![rec("", " ", "1", 5, 0)];
        let rows = aggregate_by_account_province(&records, Some(UNKNOWN));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account.as_deref(), Some(UNKNOWN));
        assert_eq!(rows[0].province.as_deref(), Some(UNKNOWN));
    }

    #[test]
    fn test_zero_denominator_rate() {
        let rows = aggregate_by_group(&[rec("a", "p", "9", 0, 0)]);
        assert_eq!(rows[0].black_outbound_rate, 0.0);
        assert!(rows[0].black_outbound_rate.is_finite());
    }

    #[test]
    fn test_rates_within_bounds_for_valid_input() {
        for row in aggregate_by_account_province(&sample(), None) {
            for rate in [
                row.black_outbound_rate,
                row.black_pickup_rate,
                row.black_pay_rate,
                row.black_complain_rate,
            ] {
                assert!((0.0..=100.0).contains(&rate));
            }
        }
    }

    #[test]
    fn test_black_exceeding_total_is_unclamped() {
        let overall = aggregate_overall(&[rec("a", "p", "1", 10, 25)]);
        assert_eq!(overall.black_outbound_rate, 250.0);
    }

    #[test]
    fn test_reductions_are_idempotent() {
        let records = sample();
        assert_eq!(aggregate_overall(&records), aggregate_overall(&records));
        assert_eq!(aggregate_by_group(&records), aggregate_by_group(&records));
        assert_eq!(
            aggregate_by_account_province(&records, None),
            aggregate_by_account_province(&records, None)
        );
    }

    #[test]
    fn test_custom_dimension_via_aggregate_by() {
        let records = sample();
        let rows = aggregate_by(&records, |r| RowKey {
            group: Some(r.group.clone()),
            province: Some(r.province.clone()),
            ..Default::default()
        });
        assert_eq!(rows.len(), 5);
    }
}
