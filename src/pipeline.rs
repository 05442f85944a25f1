// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! One compliance run: catalog, tiers, inventory match, aggregation.

use serde::Serialize;

use crate::catalog::BuildCatalog;
use crate::compliance::{aggregate, ComplianceStats};
use crate::error::Result;
use crate::inventory::{match_inventory, InventoryMatch};
use crate::observer::{ComplianceEvent, ComplianceObserver};
use crate::records::{BuildRecord, InventoryEntry};
use crate::tiers::{classify, TierAssignment, TierPolicy};

/// Everything a run produced, intermediates included
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub policy: TierPolicy,
    pub catalog: BuildCatalog,
    pub tiers: TierAssignment,
    pub inventory: InventoryMatch,
    pub stats: ComplianceStats,
}

/// Run the engine over fully loaded inputs
pub fn run_compliance(
    vendor_builds: &[BuildRecord],
    roster: &[InventoryEntry],
    policy: TierPolicy,
    observer: &mut dyn ComplianceObserver,
) -> Result<ComplianceReport> {
    let catalog = BuildCatalog::from_records(vendor_builds);
    observer.on_event(ComplianceEvent::CatalogBuilt {
        os_count: catalog.os_count(),
        release_count: catalog.release_count(),
        build_count: catalog.build_count(),
    });

    let tiers = classify(&catalog, &policy, observer);
    let inventory = match_inventory(roster, vendor_builds, observer);
    let stats = aggregate(&inventory.deployed, &tiers, &catalog, observer)?;

    Ok(ComplianceReport {
        policy,
        catalog,
        tiers,
        inventory,
        stats,
    })
}
