// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Diagnostic events emitted while a compliance run executes.
//!
//! Engine functions take a `&mut dyn ComplianceObserver` instead of writing to a
//! global logger. The binary passes a [`LogObserver`]; tests usually pass a
//! [`CollectingObserver`] and assert on what was reported.

use serde::{Deserialize, Serialize};

/// Severity attached to a diagnostic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventLevel {
    Debug,
    Info,
    Warning,
}

/// Something worth telling an operator about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceEvent {
    /// Catalog assembled from vendor records
    CatalogBuilt {
        os_count: usize,
        release_count: usize,
        build_count: usize,
    },
    /// A build number listed under more than one feature release
    ConflictingBuild {
        build_number: String,
        kept: (String, String),
        ignored: (String, String),
    },
    /// Tier sets computed
    TiersAssigned {
        current: usize,
        aging: usize,
        disallowed: usize,
    },
    /// Inventory machines whose build is not in the vendor list
    UnmatchedInventory { build_number: String, machines: u64 },
    /// Inventory matched against vendor builds
    InventoryMatched { matched: u64, unmatched: u64 },
    /// Final statistics assembled
    StatsAggregated { os_count: usize, release_count: usize },
    /// An input row rejected before reaching the engine
    RecordSkipped { source: String, reason: String },
    /// A release page downloaded and parsed
    FeedParsed { os_major_version: String, records: usize },
}

impl ComplianceEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            Self::ConflictingBuild { .. } | Self::RecordSkipped { .. } => EventLevel::Warning,
            Self::UnmatchedInventory { .. } => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }
}

impl std::fmt::Display for ComplianceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CatalogBuilt {
                os_count,
                release_count,
                build_count,
            } => write!(
                f,
                "catalog: {} OS, {} feature releases, {} builds",
                os_count, release_count, build_count
            ),
            Self::ConflictingBuild {
                build_number,
                kept,
                ignored,
            } => write!(
                f,
                "build {} listed under {} {} and {} {}; keeping the first",
                build_number, kept.0, kept.1, ignored.0, ignored.1
            ),
            Self::TiersAssigned {
                current,
                aging,
                disallowed,
            } => write!(
                f,
                "tiers: {} current, {} aging, {} disallowed",
                current, aging, disallowed
            ),
            Self::UnmatchedInventory {
                build_number,
                machines,
            } => write!(
                f,
                "{} machine(s) on build {:?} not found in vendor catalog",
                machines, build_number
            ),
            Self::InventoryMatched { matched, unmatched } => write!(
                f,
                "inventory: {} machine(s) matched, {} dropped as unrecognized",
                matched, unmatched
            ),
            Self::StatsAggregated {
                os_count,
                release_count,
            } => write!(
                f,
                "compliance stats: {} OS, {} feature releases with deployments",
                os_count, release_count
            ),
            Self::RecordSkipped { source, reason } => {
                write!(f, "skipped record from {}: {}", source, reason)
            }
            Self::FeedParsed {
                os_major_version,
                records,
            } => write!(f, "{}: parsed {} release rows", os_major_version, records),
        }
    }
}

/// Sink for diagnostic events
pub trait ComplianceObserver {
    fn on_event(&mut self, event: ComplianceEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ComplianceObserver for LogObserver {
    fn on_event(&mut self, event: ComplianceEvent) {
        match event.level() {
            EventLevel::Debug => log::debug!(target: "buildtier", "{}", event),
            EventLevel::Info => log::info!(target: "buildtier", "{}", event),
            EventLevel::Warning => log::warn!(target: "buildtier", "{}", event),
        }
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ComplianceObserver for NullObserver {
    fn on_event(&mut self, _event: ComplianceEvent) {}
}

/// Keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct CollectingObserver {
    pub events: Vec<ComplianceEvent>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events at or above `level`
    pub fn at_least(&self, level: EventLevel) -> impl Iterator<Item = &ComplianceEvent> {
        self.events.iter().filter(move |e| e.level() >= level)
    }
}

impl ComplianceObserver for CollectingObserver {
    fn on_event(&mut self, event: ComplianceEvent) {
        self.events.push(event);
    }
}
