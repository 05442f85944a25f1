// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Compliance aggregation
//!
//! Folds deployed machine counts into per-OS, per-feature-release tier counters.
//! Entries are created lazily, only for feature releases that have at least one
//! deployed machine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::BuildCatalog;
use crate::error::{BuildTierError, Result};
use crate::inventory::InventoryRecord;
use crate::observer::{ComplianceEvent, ComplianceObserver};
use crate::tiers::{Tier, TierAssignment};

/// Machine counts per tier for one feature release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub current: u64,
    pub aging: u64,
    pub disallowed: u64,
}

impl TierCounts {
    pub fn get(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Current => self.current,
            Tier::Aging => self.aging,
            Tier::Disallowed => self.disallowed,
        }
    }

    pub fn add(&mut self, tier: Tier, machines: u64) {
        match tier {
            Tier::Current => self.current += machines,
            Tier::Aging => self.aging += machines,
            Tier::Disallowed => self.disallowed += machines,
        }
    }

    pub fn total(&self) -> u64 {
        self.current + self.aging + self.disallowed
    }

    /// Share of machines on a current build, 0-100
    pub fn compliance_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }
        self.current as f64 * 100.0 / total as f64
    }
}

/// One flattened statistics row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRow {
    pub os_major_version: String,
    pub feature_release_version: String,
    pub counts: TierCounts,
}

/// OS → feature release → tier counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceStats {
    entries: BTreeMap<String, BTreeMap<String, TierCounts>>,
}

impl ComplianceStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for a feature release, created zeroed on first access
    pub fn entry_mut(&mut self, os_major_version: &str, feature_release_version: &str) -> &mut TierCounts {
        self.entries
            .entry(os_major_version.to_string())
            .or_default()
            .entry(feature_release_version.to_string())
            .or_default()
    }

    pub fn get(&self, os_major_version: &str, feature_release_version: &str) -> Option<&TierCounts> {
        self.entries
            .get(os_major_version)
            .and_then(|releases| releases.get(feature_release_version))
    }

    /// Rows in descending OS then feature-release order
    pub fn rows(&self) -> Vec<ComplianceRow> {
        self.entries
            .iter()
            .rev()
            .flat_map(|(os, releases)| {
                releases.iter().rev().map(move |(release, counts)| ComplianceRow {
                    os_major_version: os.clone(),
                    feature_release_version: release.clone(),
                    counts: *counts,
                })
            })
            .collect()
    }

    /// Sum over every entry. A build listed under two feature releases is
    /// counted in both, so this can exceed the number of deployed machines.
    pub fn totals(&self) -> TierCounts {
        let mut sum = TierCounts::default();
        for releases in self.entries.values() {
            for counts in releases.values() {
                for tier in Tier::ALL {
                    sum.add(tier, counts.get(tier));
                }
            }
        }
        sum
    }

    pub fn os_count(&self) -> usize {
        self.entries.len()
    }

    pub fn release_count(&self) -> usize {
        self.entries.values().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ComplianceStats {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        struct Releases<'a>(&'a BTreeMap<String, TierCounts>);
        impl Serialize for Releases<'_> {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (release, counts) in self.0.iter().rev() {
                    map.serialize_entry(release, counts)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (os, releases) in self.entries.iter().rev() {
            map.serialize_entry(os, &Releases(releases))?;
        }
        map.end()
    }
}

/// Aggregate deployed counts into tiered statistics.
///
/// Every inventory build must be part of the tier universe; anything else means
/// the inputs were not derived from the same vendor records, and the run fails.
/// A build reachable through several feature releases adds its count to each of
/// them, under the one tier [`classify`](crate::tiers::classify) gave it.
pub fn aggregate(
    deployed: &InventoryRecord,
    tiers: &TierAssignment,
    catalog: &BuildCatalog,
    observer: &mut dyn ComplianceObserver,
) -> Result<ComplianceStats> {
    if let Some(stray) = deployed.builds().find(|b| !tiers.contains(b)) {
        return Err(BuildTierError::InvariantViolation(format!(
            "deployed build {} has no tier assignment",
            stray
        )));
    }

    let mut stats = ComplianceStats::new();
    for release in catalog.iter() {
        for build in release.builds() {
            let machines = deployed.count(build);
            if machines == 0 {
                continue;
            }
            let tier = tiers.tier_of(build).ok_or_else(|| {
                BuildTierError::InvariantViolation(format!(
                    "catalog build {} ({} {}) has no tier assignment",
                    build, release.os_major_version, release.feature_release_version
                ))
            })?;
            stats
                .entry_mut(release.os_major_version, release.feature_release_version)
                .add(tier, machines);
        }
    }

    observer.on_event(ComplianceEvent::StatsAggregated {
        os_count: stats.os_count(),
        release_count: stats.release_count(),
    });
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_number::BuildNumber;
    use crate::observer::NullObserver;
    use crate::records::BuildRecord;
    use crate::tiers::{classify, TierPolicy};

    fn bn(s: &str) -> BuildNumber {
        BuildNumber::parse(s).unwrap()
    }

    fn setup(
        entries: &[(&str, &str, &str)],
        deployed: &[(&str, u64)],
        policy: TierPolicy,
    ) -> (BuildCatalog, TierAssignment, InventoryRecord) {
        let records: Vec<BuildRecord> = entries
            .iter()
            .map(|(os, rel, b)| BuildRecord::new(*os, *rel, bn(b)))
            .collect();
        let catalog = BuildCatalog::from_records(&records);
        let tiers = classify(&catalog, &policy, &mut NullObserver);
        let mut inv = InventoryRecord::new();
        for (b, n) in deployed {
            inv.add(bn(b), *n);
        }
        (catalog, tiers, inv)
    }

    #[test]
    fn test_single_release_counts() {
        let (catalog, tiers, inv) = setup(
            &[
                ("Windows 10", "22H2", "19045.1"),
                ("Windows 10", "22H2", "19045.2"),
                ("Windows 10", "22H2", "19045.3"),
            ],
            &[("19045.3", 5), ("19045.2", 2), ("19045.1", 1)],
            TierPolicy::new(1, 1).unwrap(),
        );
        let stats = aggregate(&inv, &tiers, &catalog, &mut NullObserver).unwrap();
        assert_eq!(
            stats.get("Windows 10", "22H2"),
            Some(&TierCounts {
                current: 5,
                aging: 2,
                disallowed: 1
            })
        );
    }

    #[test]
    fn test_entries_only_for_deployed_releases() {
        let (catalog, tiers, inv) = setup(
            &[
                ("Windows 10", "22H2", "19045.3"),
                ("Windows 10", "21H2", "19044.3"),
                ("Windows 11", "23H2", "22631.3"),
            ],
            &[("19045.3", 2), ("22631.3", 0)],
            TierPolicy::default(),
        );
        let stats = aggregate(&inv, &tiers, &catalog, &mut NullObserver).unwrap();
        assert_eq!(stats.release_count(), 1);
        assert!(stats.get("Windows 10", "21H2").is_none());
        assert!(stats.get("Windows 11", "23H2").is_none());
        assert_eq!(stats.get("Windows 10", "22H2").map(|c| c.current), Some(2));
    }

    #[test]
    fn test_conservation_per_release() {
        let entries: Vec<(String, String)> = (0..8)
            .map(|i| (if i % 2 == 0 { "22H2" } else { "21H2" }.to_string(), format!("1904{}.{}", 4 + i % 2, i)))
            .collect();
        let refs: Vec<(&str, &str, &str)> = entries
            .iter()
            .map(|(rel, b)| ("Windows 10", rel.as_str(), b.as_str()))
            .collect();
        let deployed: Vec<(&str, u64)> = entries
            .iter()
            .enumerate()
            .map(|(i, (_, b))| (b.as_str(), (i as u64 * 7) % 5))
            .collect();
        let (catalog, tiers, inv) = setup(&refs, &deployed, TierPolicy::new(1, 2).unwrap());
        let stats = aggregate(&inv, &tiers, &catalog, &mut NullObserver).unwrap();

        for row in stats.rows() {
            let expected: u64 = catalog
                .builds(&row.os_major_version, &row.feature_release_version)
                .map(|b| inv.count(b))
                .sum();
            assert_eq!(row.counts.total(), expected);
        }
        assert_eq!(stats.totals().total(), inv.total());
    }

    #[test]
    fn test_rows_descending() {
        let (catalog, tiers, inv) = setup(
            &[
                ("Windows 10", "21H2", "19044.1"),
                ("Windows 11", "22H2", "22621.1"),
                ("Windows 10", "22H2", "19045.1"),
                ("Windows 11", "23H2", "22631.1"),
            ],
            &[("19044.1", 1), ("22621.1", 1), ("19045.1", 1), ("22631.1", 1)],
            TierPolicy::default(),
        );
        let stats = aggregate(&inv, &tiers, &catalog, &mut NullObserver).unwrap();
        let keys: Vec<(String, String)> = stats
            .rows()
            .into_iter()
            .map(|r| (r.os_major_version, r.feature_release_version))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Windows 11".to_string(), "23H2".to_string()),
                ("Windows 11".to_string(), "22H2".to_string()),
                ("Windows 10".to_string(), "22H2".to_string()),
                ("Windows 10".to_string(), "21H2".to_string()),
            ]
        );
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.starts_with("{\"Windows 11\":{\"23H2\":{\"current\":1,\"aging\":0,\"disallowed\":0}"));
    }

    #[test]
    fn test_build_under_two_releases_counts_in_both() {
        let (catalog, tiers, inv) = setup(
            &[
                ("Windows 10", "22H2", "19045.5"),
                ("Windows 10", "22H2", "19045.4"),
                ("Windows 10", "21H2", "19045.4"),
            ],
            &[("19045.5", 1), ("19045.4", 3)],
            TierPolicy::new(1, 0).unwrap(),
        );
        let stats = aggregate(&inv, &tiers, &catalog, &mut NullObserver).unwrap();
        assert_eq!(
            stats.get("Windows 10", "22H2"),
            Some(&TierCounts {
                current: 1,
                aging: 0,
                disallowed: 3
            })
        );
        // 21H2 reuses the tier from the 22H2 listing
        assert_eq!(
            stats.get("Windows 10", "21H2"),
            Some(&TierCounts {
                current: 0,
                aging: 0,
                disallowed: 3
            })
        );
        assert_eq!(inv.total(), 4);
        assert_eq!(stats.totals().total(), 7);
    }

    #[test]
    fn test_stray_inventory_build_is_invariant_violation() {
        let (catalog, tiers, mut inv) = setup(
            &[("Windows 10", "22H2", "19045.1")],
            &[("19045.1", 1)],
            TierPolicy::default(),
        );
        inv.add(bn("19045.77"), 3);
        let err = aggregate(&inv, &tiers, &catalog, &mut NullObserver).unwrap_err();
        assert!(matches!(err, BuildTierError::InvariantViolation(_)));
    }

    #[test]
    fn test_no_inventory_is_empty_not_error() {
        let (catalog, tiers, inv) = setup(&[("Windows 10", "22H2", "19045.1")], &[], TierPolicy::default());
        let stats = aggregate(&inv, &tiers, &catalog, &mut NullObserver).unwrap();
        assert!(stats.is_empty());
        assert!(stats.rows().is_empty());
    }

    #[test]
    fn test_compliance_percent() {
        let c = TierCounts {
            current: 3,
            aging: 1,
            disallowed: 0,
        };
        assert!((c.compliance_percent() - 75.0).abs() < 1e-9);
        assert!((TierCounts::default().compliance_percent() - 100.0).abs() < 1e-9);
    }
}
