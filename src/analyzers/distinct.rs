//! Distinct-value helpers that back filter controls.

use std::collections::{BTreeSet, HashSet};

use crate::analyzers::aggregate::label_or_unknown;
use crate::record::{NOT_TRIGGERED_GROUP, Record, is_numeric_label};

/// Distinct group labels: the not-triggered sentinel first (when present),
/// then everything else in lexical order.
pub fn unique_groups(records: &[Record]) -> Vec<String> {
    let distinct: BTreeSet<&str> = records.iter().map(|r| r.group.as_str()).collect();

    let mut out = Vec::with_capacity(distinct.len());
    if distinct.contains(NOT_TRIGGERED_GROUP) {
        out.push(NOT_TRIGGERED_GROUP.to_string());
    }
    out.extend(
        distinct
            .into_iter()
            .filter(|g| *g != NOT_TRIGGERED_GROUP)
            .map(str::to_string),
    );
    out
}

pub fn unique_provinces(records: &[Record]) -> Vec<String> {
    sorted_labels(records.iter().map(|r| label_or_unknown(&r.province)))
}

pub fn unique_accounts(records: &[Record]) -> Vec<String> {
    sorted_labels(records.iter().map(|r| label_or_unknown(&r.account)))
}

/// Heuristic data-quality check: more than one all-digit group label usually
/// means the export mixes several blacklist rule sets.
pub fn has_multiple_numeric_groups(records: &[Record]) -> bool {
    let numeric: HashSet<&str> = records
        .iter()
        .map(|r| r.group.as_str())
        .filter(|g| is_numeric_label(g))
        .collect();
    numeric.len() > 1
}

fn sorted_labels(labels: impl Iterator<Item = String>) -> Vec<String> {
    labels.collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::UNKNOWN;

    fn rec(account: &str, province: &str, group: &str) -> Record {
        Record {
            account: account.to_string(),
            province: province.to_string(),
            group: group.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unique_groups_pins_sentinel_first() {
        let records = vec![rec("a", "p", "31"), rec("a", "p", NOT_TRIGGERED_GROUP)];
        assert_eq!(unique_groups(&records), vec![NOT_TRIGGERED_GROUP, "31"]);
    }

    #[test]
    fn test_unique_groups_lexical_and_deduplicated() {
        let records = vec![
            rec("a", "p", "5"),
            rec("a", "p", "12"),
            rec("a", "p", NOT_TRIGGERED_GROUP),
            rec("a", "p", "5"),
            rec("a", "p", ""),
        ];
        assert_eq!(
            unique_groups(&records),
            vec![NOT_TRIGGERED_GROUP, "", "12", "5"]
        );
    }

    #[test]
    fn test_unique_groups_without_sentinel() {
        let records = vec![rec("a", "p", "b"), rec("a", "p", "a")];
        assert_eq!(unique_groups(&records), vec!["a", "b"]);
        assert!(unique_groups(&[]).is_empty());
    }

    #[test]
    fn test_unique_provinces_and_accounts() {
        let records = vec![
            rec("z", "江苏", "1"),
            rec("a", "浙江", "1"),
            rec("z", "", "1"),
            rec("", "江苏", "1"),
        ];
        assert_eq!(unique_provinces(&records), vec![UNKNOWN, "江苏", "浙江"]);
        assert_eq!(unique_accounts(&records), vec!["a", "z", UNKNOWN]);
    }

    #[test]
    fn test_multiple_numeric_groups_warning() {
        let single = vec![
            rec("a", "p", "31"),
            rec("a", "p", "31"),
            rec("a", "p", NOT_TRIGGERED_GROUP),
        ];
        assert!(!has_multiple_numeric_groups(&single));

        let mixed = vec![rec("a", "p", "31"), rec("a", "p", "32")];
        assert!(has_multiple_numeric_groups(&mixed));

        let non_numeric = vec![rec("a", "p", "r1"), rec("a", "p", "r2"), rec("a", "p", "")];
        assert!(!has_multiple_numeric_groups(&non_numeric));
    }
}
