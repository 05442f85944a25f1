// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Input records: vendor build releases and fleet inventory rows.

use serde::{Deserialize, Serialize};

use crate::build_number::BuildNumber;

/// One row of a vendor release table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// OS label, e.g. "Windows 10"
    pub os_major_version: String,
    /// Feature release channel, e.g. "22H2"
    pub feature_release_version: String,
    /// Heading the row was listed under, informational only
    pub release_full_name: String,
    /// Availability date as printed by the vendor
    pub release_date: String,
    pub build_number: BuildNumber,
    /// Knowledge-base article id, e.g. "KB5032189"
    pub kb: Option<String>,
}

impl BuildRecord {
    pub fn new(
        os_major_version: impl Into<String>,
        feature_release_version: impl Into<String>,
        build_number: BuildNumber,
    ) -> Self {
        let feature = feature_release_version.into();
        Self {
            os_major_version: os_major_version.into(),
            release_full_name: format!("Version {}", feature),
            feature_release_version: feature,
            release_date: String::new(),
            build_number,
            kb: None,
        }
    }

    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = date.into();
        self
    }

    pub fn with_kb(mut self, kb: impl Into<String>) -> Self {
        self.kb = Some(kb.into());
        self
    }
}

/// One machine from the deployed inventory roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Build string the machine reported, matched textually
    pub build_number: String,
    /// Asset or host name when the roster carries one
    pub asset_name: Option<String>,
}

impl InventoryEntry {
    pub fn new(build_number: impl Into<String>) -> Self {
        Self {
            build_number: build_number.into(),
            asset_name: None,
        }
    }
}
