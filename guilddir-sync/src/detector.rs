//! Duplicate identifying-key detection
//!
//! Builds a reverse index from every identifying key (keyword, display name,
//! alias; all lowercased) to the records claiming it, and reports any key
//! with more than one claim. Report-only: findings go to the notification
//! channel and never block publication or remove records.
//!
//! A record contributes its keyword and its display name as separate keys,
//! so a record whose canonical name equals its own keyword claims that key
//! twice. That exact pair is the one legitimate collision and is not
//! reported.

use guilddir_common::DirectoryRecord;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// One key claimed by more than one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateReport {
    /// The colliding identifying key (lowercase)
    pub key: String,
    /// The distinct claiming records, rendered as `keyword ('display name')`
    /// and sorted. Records sharing a keyword stay visible as separate
    /// claimants.
    pub claimants: Vec<String>,
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate identifying key '{}' claimed by: {}",
            self.key,
            self.claimants.join(", ")
        )
    }
}

/// Detect colliding identifying keys in a candidate record set.
///
/// Output is sorted by key, so running detection twice on the same set
/// yields the same reports.
pub fn detect(records: &HashSet<DirectoryRecord>) -> Vec<DuplicateReport> {
    let mut index: BTreeMap<String, Vec<&DirectoryRecord>> = BTreeMap::new();
    for record in records {
        for key in record.identifying_keys() {
            index.entry(key).or_default().push(record);
        }
    }

    let mut reports = Vec::new();
    for (key, claimants) in index {
        if claimants.len() < 2 {
            continue;
        }
        if is_self_named_pair(&key, &claimants) {
            continue;
        }
        // collapse a single record's multiple claims, never two records
        // that happen to share a keyword
        let mut distinct: Vec<&DirectoryRecord> = Vec::new();
        for record in claimants {
            if !distinct.contains(&record) {
                distinct.push(record);
            }
        }
        let mut names: Vec<String> = distinct
            .iter()
            .map(|r| format!("{} ('{}')", r.keyword, r.display_name))
            .collect();
        names.sort();
        reports.push(DuplicateReport {
            key,
            claimants: names,
        });
    }
    reports
}

/// The legitimate collision: one record named after its own keyword claims
/// that key twice (once as keyword, once as display name). Both claims must
/// come from the same record; two distinct records sharing a display name
/// are a genuine collision.
fn is_self_named_pair(key: &str, claimants: &[&DirectoryRecord]) -> bool {
    claimants.len() == 2
        && std::ptr::eq(claimants[0], claimants[1])
        && claimants[0].display_name.to_lowercase() == key
}
