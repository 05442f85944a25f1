// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! buildtier: desktop build compliance
//!
//! Classifies the Windows builds a fleet is running against the vendor's
//! published servicing history. Each feature release (e.g. Windows 10 22H2) gets
//! its own window: the newest builds are *current*, the next few are *aging*,
//! everything older is *disallowed*. Deployed machines are then counted per tier.
//!
//! The engine is four pure steps over in-memory data:
//!
//! 1. [`catalog::BuildCatalog`] orders vendor builds per OS and feature release
//! 2. [`tiers::classify`] assigns every build a [`tiers::Tier`]
//! 3. [`inventory::match_inventory`] counts machines per vendor build
//! 4. [`compliance::aggregate`] folds the counts into [`compliance::ComplianceStats`]
//!
//! [`pipeline::run_compliance`] runs all four. Loading inputs ([`feed`],
//! [`loader`]) and writing outputs ([`report`]) live in their own modules.
//!
//! # Examples
//!
//! ```
//! use buildtierlib::observer::NullObserver;
//! use buildtierlib::pipeline::run_compliance;
//! use buildtierlib::records::{BuildRecord, InventoryEntry};
//! use buildtierlib::tiers::TierPolicy;
//!
//! # fn main() -> buildtierlib::Result<()> {
//! let vendor: Vec<BuildRecord> = ["19045.1", "19045.2", "19045.3"]
//!     .iter()
//!     .map(|b| BuildRecord::new("Windows 10", "22H2", b.parse().unwrap()))
//!     .collect();
//! let roster = vec![InventoryEntry::new("19045.3"), InventoryEntry::new("19045.1")];
//!
//! let report = run_compliance(&vendor, &roster, TierPolicy::new(1, 1)?, &mut NullObserver)?;
//! let counts = report.stats.get("Windows 10", "22H2").unwrap();
//! assert_eq!((counts.current, counts.aging, counts.disallowed), (1, 0, 1));
//! # Ok(())
//! # }
//! ```

pub mod build_number;
pub mod catalog;
pub mod compliance;
pub mod config;
pub mod csvio;
pub mod error;
pub mod feed;
pub mod inventory;
pub mod loader;
pub mod observer;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod tiers;

pub use build_number::BuildNumber;
pub use catalog::BuildCatalog;
pub use compliance::{ComplianceStats, TierCounts};
pub use config::ComplianceConfig;
pub use error::{BuildTierError, Result};
pub use inventory::{InventoryMatch, InventoryRecord};
pub use observer::{ComplianceEvent, ComplianceObserver, LogObserver};
pub use pipeline::{run_compliance, ComplianceReport};
pub use records::{BuildRecord, InventoryEntry};
pub use tiers::{Tier, TierAssignment, TierPolicy};
