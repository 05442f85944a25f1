// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Match the deployed inventory against vendor builds.
//!
//! Matching is exact text equality between the build a machine reported and the
//! build number printed by the vendor: "19045.3754" and "19045.03754" are
//! different builds here. Machines on builds the vendor list does not know about
//! are kept aside in [`InventoryMatch::unmatched`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::build_number::BuildNumber;
use crate::observer::{ComplianceEvent, ComplianceObserver};
use crate::records::{BuildRecord, InventoryEntry};

/// Deployed machine count per vendor build, newest build first on iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryRecord {
    counts: BTreeMap<BuildNumber, u64>,
}

impl InventoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `machines` to the count for `build`
    pub fn add(&mut self, build: BuildNumber, machines: u64) {
        *self.counts.entry(build).or_insert(0) += machines;
    }

    /// Deployed count; zero for builds nobody runs
    pub fn count(&self, build: &BuildNumber) -> u64 {
        self.counts.get(build).copied().unwrap_or(0)
    }

    /// Builds with their counts, newest first
    pub fn iter(&self) -> impl Iterator<Item = (&BuildNumber, u64)> {
        self.counts.iter().rev().map(|(b, c)| (b, *c))
    }

    pub fn builds(&self) -> impl Iterator<Item = &BuildNumber> {
        self.counts.keys().rev()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Serialize for InventoryRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (build, count) in self.iter() {
            map.serialize_entry(build, &count)?;
        }
        map.end()
    }
}

/// Result of matching a roster against vendor builds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryMatch {
    pub deployed: InventoryRecord,
    /// Reported build text → machines, for builds absent from the vendor list
    pub unmatched: BTreeMap<String, u64>,
    /// Reported build text → asset names of those machines, when the roster has them
    pub unmatched_assets: BTreeMap<String, Vec<String>>,
}

impl InventoryMatch {
    pub fn unmatched_machines(&self) -> u64 {
        self.unmatched.values().sum()
    }
}

/// Count deployed machines per vendor build.
///
/// Every (roster entry, vendor record) pair with equal build text adds one, so a
/// build the vendor lists twice counts each of its machines twice.
pub fn match_inventory(
    roster: &[InventoryEntry],
    vendor_builds: &[BuildRecord],
    observer: &mut dyn ComplianceObserver,
) -> InventoryMatch {
    // build text -> (build, number of vendor records listing it)
    let mut known: HashMap<&str, (&BuildNumber, u64)> = HashMap::new();
    for record in vendor_builds {
        known
            .entry(record.build_number.as_str())
            .or_insert((&record.build_number, 0))
            .1 += 1;
    }

    let mut result = InventoryMatch::default();
    let mut matched = 0u64;
    for entry in roster {
        match known.get(entry.build_number.as_str()) {
            Some((build, listings)) => {
                matched += 1;
                result.deployed.add((*build).clone(), *listings);
            }
            None => {
                *result.unmatched.entry(entry.build_number.clone()).or_insert(0) += 1;
                if let Some(asset) = &entry.asset_name {
                    result
                        .unmatched_assets
                        .entry(entry.build_number.clone())
                        .or_default()
                        .push(asset.clone());
                }
            }
        }
    }

    for (build, machines) in &result.unmatched {
        observer.on_event(ComplianceEvent::UnmatchedInventory {
            build_number: build.clone(),
            machines: *machines,
        });
    }
    observer.on_event(ComplianceEvent::InventoryMatched {
        matched,
        unmatched: result.unmatched_machines(),
    });
    result
}
