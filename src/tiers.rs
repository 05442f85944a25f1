// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Tier classification of catalog builds.
//!
//! Each feature release gets its own window: the newest `current_count` builds are
//! [`Tier::Current`], the next `aging_count` are [`Tier::Aging`], everything older
//! is [`Tier::Disallowed`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::build_number::BuildNumber;
use crate::catalog::BuildCatalog;
use crate::error::{BuildTierError, Result};
use crate::observer::{ComplianceEvent, ComplianceObserver};

/// Default number of newest builds per feature release considered current
pub const DEFAULT_CURRENT_BUILD_COUNT: usize = 3;
/// Default number of builds after the current window considered aging
pub const DEFAULT_AGING_BUILD_COUNT: usize = 2;

/// Compliance tier of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Current,
    Aging,
    Disallowed,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Current, Tier::Aging, Tier::Disallowed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Aging => "aging",
            Self::Disallowed => "disallowed",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window sizes for tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicy {
    current_count: usize,
    aging_count: usize,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            current_count: DEFAULT_CURRENT_BUILD_COUNT,
            aging_count: DEFAULT_AGING_BUILD_COUNT,
        }
    }
}

impl TierPolicy {
    /// Validate raw counts. Negative values are rejected, never clamped.
    pub fn new(current_count: i64, aging_count: i64) -> Result<Self> {
        let current = usize::try_from(current_count).map_err(|_| {
            BuildTierError::Configuration(format!(
                "current_build_count must be a non-negative integer, got {}",
                current_count
            ))
        })?;
        let aging = usize::try_from(aging_count).map_err(|_| {
            BuildTierError::Configuration(format!(
                "aging_build_count must be a non-negative integer, got {}",
                aging_count
            ))
        })?;
        Ok(Self {
            current_count: current,
            aging_count: aging,
        })
    }

    pub fn current_count(&self) -> usize {
        self.current_count
    }

    pub fn aging_count(&self) -> usize {
        self.aging_count
    }

    /// Tier for a zero-based rank within a feature release
    pub fn tier_for_rank(&self, rank: usize) -> Tier {
        if rank < self.current_count {
            Tier::Current
        } else if rank < self.current_count.saturating_add(self.aging_count) {
            Tier::Aging
        } else {
            Tier::Disallowed
        }
    }
}

/// Disjoint tier sets covering every catalog build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAssignment {
    pub current: BTreeSet<BuildNumber>,
    pub aging: BTreeSet<BuildNumber>,
    pub disallowed: BTreeSet<BuildNumber>,
}

impl TierAssignment {
    pub fn set(&self, tier: Tier) -> &BTreeSet<BuildNumber> {
        match tier {
            Tier::Current => &self.current,
            Tier::Aging => &self.aging,
            Tier::Disallowed => &self.disallowed,
        }
    }

    fn set_mut(&mut self, tier: Tier) -> &mut BTreeSet<BuildNumber> {
        match tier {
            Tier::Current => &mut self.current,
            Tier::Aging => &mut self.aging,
            Tier::Disallowed => &mut self.disallowed,
        }
    }

    /// Which tier holds `build`, if any
    pub fn tier_of(&self, build: &BuildNumber) -> Option<Tier> {
        Tier::ALL.into_iter().find(|tier| self.set(*tier).contains(build))
    }

    pub fn contains(&self, build: &BuildNumber) -> bool {
        self.tier_of(build).is_some()
    }

    pub fn len(&self) -> usize {
        self.current.len() + self.aging.len() + self.disallowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify every build of the catalog.
///
/// A build number listed under two feature releases keeps the tier from the first
/// release visited in catalog order; the later listing is reported as a
/// [`ComplianceEvent::ConflictingBuild`].
pub fn classify(
    catalog: &BuildCatalog,
    policy: &TierPolicy,
    observer: &mut dyn ComplianceObserver,
) -> TierAssignment {
    let mut assignment = TierAssignment::default();
    let mut placed: BTreeMap<&BuildNumber, (&str, &str)> = BTreeMap::new();

    for release in catalog.iter() {
        for (rank, build) in release.builds().enumerate() {
            let here = (release.os_major_version, release.feature_release_version);
            if let Some(first) = placed.get(build) {
                observer.on_event(ComplianceEvent::ConflictingBuild {
                    build_number: build.to_string(),
                    kept: (first.0.to_string(), first.1.to_string()),
                    ignored: (here.0.to_string(), here.1.to_string()),
                });
                continue;
            }
            placed.insert(build, here);
            assignment.set_mut(policy.tier_for_rank(rank)).insert(build.clone());
        }
    }

    observer.on_event(ComplianceEvent::TiersAssigned {
        current: assignment.current.len(),
        aging: assignment.aging.len(),
        disallowed: assignment.disallowed.len(),
    });
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{CollectingObserver, NullObserver};
    use crate::records::BuildRecord;

    fn bn(s: &str) -> BuildNumber {
        BuildNumber::parse(s).unwrap()
    }

    fn catalog_of(entries: &[(&str, &str, &str)]) -> BuildCatalog {
        let records: Vec<BuildRecord> = entries
            .iter()
            .map(|(os, rel, b)| BuildRecord::new(*os, *rel, bn(b)))
            .collect();
        BuildCatalog::from_records(&records)
    }

    #[test]
    fn test_policy_rejects_negative_counts() {
        assert!(matches!(TierPolicy::new(-1, 2), Err(BuildTierError::Configuration(_))));
        assert!(matches!(TierPolicy::new(3, -2), Err(BuildTierError::Configuration(_))));
        let p = TierPolicy::new(0, 0).unwrap();
        assert_eq!(p.tier_for_rank(0), Tier::Disallowed);
    }

    #[test]
    fn test_policy_default() {
        let p = TierPolicy::default();
        assert_eq!((p.current_count(), p.aging_count()), (3, 2));
    }

    #[test]
    fn test_six_builds_three_two_one() {
        let catalog = catalog_of(&[
            ("Windows 10", "22H2", "19045.1"),
            ("Windows 10", "22H2", "19045.2"),
            ("Windows 10", "22H2", "19045.3"),
            ("Windows 10", "22H2", "19045.4"),
            ("Windows 10", "22H2", "19045.5"),
            ("Windows 10", "22H2", "19045.6"),
        ]);
        let tiers = classify(&catalog, &TierPolicy::new(3, 2).unwrap(), &mut NullObserver);
        let names = |set: &BTreeSet<BuildNumber>| -> Vec<String> {
            set.iter().rev().map(|b| b.to_string()).collect()
        };
        assert_eq!(names(&tiers.current), vec!["19045.6", "19045.5", "19045.4"]);
        assert_eq!(names(&tiers.aging), vec!["19045.3", "19045.2"]);
        assert_eq!(names(&tiers.disallowed), vec!["19045.1"]);
    }

    #[test]
    fn test_windows_are_per_feature_release() {
        let catalog = catalog_of(&[
            ("Windows 10", "22H2", "19045.10"),
            ("Windows 10", "22H2", "19045.9"),
            ("Windows 10", "21H2", "19044.8"),
            ("Windows 11", "23H2", "22631.7"),
            ("Windows 11", "23H2", "22631.6"),
            ("Windows 11", "23H2", "22631.5"),
        ]);
        let tiers = classify(&catalog, &TierPolicy::new(1, 1).unwrap(), &mut NullObserver);
        assert_eq!(tiers.tier_of(&bn("19045.10")), Some(Tier::Current));
        assert_eq!(tiers.tier_of(&bn("19045.9")), Some(Tier::Aging));
        assert_eq!(tiers.tier_of(&bn("19044.8")), Some(Tier::Current));
        assert_eq!(tiers.tier_of(&bn("22631.7")), Some(Tier::Current));
        assert_eq!(tiers.tier_of(&bn("22631.6")), Some(Tier::Aging));
        assert_eq!(tiers.tier_of(&bn("22631.5")), Some(Tier::Disallowed));
        assert_eq!(tiers.tier_of(&bn("22631.4")), None);
    }

    #[test]
    fn test_coverage_and_window_bounds() {
        let mut entries = Vec::new();
        let labels: Vec<(String, String, String)> = (0..4)
            .flat_map(|rel| {
                (0..(rel * 3 + 1)).map(move |i| {
                    (
                        "Windows 10".to_string(),
                        format!("2{}H2", rel),
                        format!("1904{}.{}", rel, i),
                    )
                })
            })
            .collect();
        for (os, rel, b) in &labels {
            entries.push((os.as_str(), rel.as_str(), b.as_str()));
        }
        let catalog = catalog_of(&entries);

        for (current, aging) in [(0, 0), (1, 0), (3, 2), (2, 5), (20, 1)] {
            let policy = TierPolicy::new(current, aging).unwrap();
            let tiers = classify(&catalog, &policy, &mut NullObserver);
            assert_eq!(tiers.len(), catalog.build_count());
            assert!(tiers.current.is_disjoint(&tiers.aging));
            assert!(tiers.current.is_disjoint(&tiers.disallowed));
            assert!(tiers.aging.is_disjoint(&tiers.disallowed));

            for release in catalog.iter() {
                let n = release.len();
                let in_tier = |t: Tier| release.builds().filter(|b| tiers.set(t).contains(*b)).count();
                let cur = in_tier(Tier::Current);
                let age = in_tier(Tier::Aging);
                assert_eq!(cur, n.min(policy.current_count()));
                assert_eq!(age, (n - cur).min(policy.aging_count()));
                assert_eq!(cur + age + in_tier(Tier::Disallowed), n);
            }
        }
    }

    #[test]
    fn test_conflicting_build_keeps_first_placement() {
        let catalog = catalog_of(&[
            ("Windows 10", "22H2", "19045.5"),
            ("Windows 10", "22H2", "19045.4"),
            ("Windows 10", "21H2", "19045.4"),
        ]);
        let mut obs = CollectingObserver::new();
        let tiers = classify(&catalog, &TierPolicy::new(1, 0).unwrap(), &mut obs);
        assert_eq!(tiers.tier_of(&bn("19045.4")), Some(Tier::Disallowed));
        assert_eq!(tiers.len(), 2);
        assert!(obs.events.iter().any(|e| matches!(
            e,
            ComplianceEvent::ConflictingBuild { build_number, ignored, .. }
                if build_number == "19045.4" && ignored.1 == "21H2"
        )));
    }

    #[test]
    fn test_empty_catalog() {
        let tiers = classify(&BuildCatalog::new(), &TierPolicy::default(), &mut NullObserver);
        assert!(tiers.is_empty());
    }
}
