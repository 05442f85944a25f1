// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Build catalog: OS → feature release → build numbers.
//!
//! Builds within a feature release are unique and iterate newest first. OS labels
//! and feature-release labels iterate in descending string order ("Windows 11"
//! before "Windows 10", "23H2" before "22H2").
//!
//! # Examples
//!
//! ```
//! use buildtierlib::build_number::BuildNumber;
//! use buildtierlib::catalog::BuildCatalog;
//! use buildtierlib::records::BuildRecord;
//!
//! let records: Vec<BuildRecord> = ["19045.1", "19045.10", "19045.2"]
//!     .iter()
//!     .map(|b| BuildRecord::new("Windows 10", "22H2", b.parse::<BuildNumber>().unwrap()))
//!     .collect();
//! let catalog = BuildCatalog::from_records(&records);
//! let builds: Vec<&str> = catalog
//!     .builds("Windows 10", "22H2")
//!     .map(|b| b.as_str())
//!     .collect();
//! assert_eq!(builds, vec!["19045.10", "19045.2", "19045.1"]);
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use crate::build_number::BuildNumber;
use crate::records::BuildRecord;

type ReleaseMap = BTreeMap<String, BTreeSet<BuildNumber>>;

/// Ordered catalog of vendor builds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildCatalog {
    entries: BTreeMap<String, ReleaseMap>,
}

/// Builds of one (OS, feature release) pair
#[derive(Debug, Clone, Copy)]
pub struct ReleaseBuilds<'a> {
    pub os_major_version: &'a str,
    pub feature_release_version: &'a str,
    builds: &'a BTreeSet<BuildNumber>,
}

impl<'a> ReleaseBuilds<'a> {
    /// Builds newest first
    pub fn builds(&self) -> impl DoubleEndedIterator<Item = &'a BuildNumber> + 'a {
        self.builds.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }
}

impl BuildCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records in any order
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a BuildRecord>,
    {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(
                &record.os_major_version,
                &record.feature_release_version,
                record.build_number.clone(),
            );
        }
        catalog
    }

    /// Insert a build; returns false if it was already present
    pub fn insert(&mut self, os_major_version: &str, feature_release_version: &str, build: BuildNumber) -> bool {
        self.entries
            .entry(os_major_version.to_string())
            .or_default()
            .entry(feature_release_version.to_string())
            .or_default()
            .insert(build)
    }

    /// OS labels, descending
    pub fn os_versions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().rev().map(String::as_str)
    }

    /// Feature releases of one OS, descending
    pub fn feature_releases<'a>(&'a self, os_major_version: &str) -> impl Iterator<Item = &'a str> {
        self.entries
            .get(os_major_version)
            .into_iter()
            .flat_map(|releases| releases.keys().rev().map(String::as_str))
    }

    /// Builds of one feature release, newest first; empty if unknown
    pub fn builds<'a>(
        &'a self,
        os_major_version: &str,
        feature_release_version: &str,
    ) -> impl Iterator<Item = &'a BuildNumber> {
        self.entries
            .get(os_major_version)
            .and_then(|releases| releases.get(feature_release_version))
            .into_iter()
            .flat_map(|builds| builds.iter().rev())
    }

    /// Every (OS, feature release) pair in catalog order
    pub fn iter(&self) -> impl Iterator<Item = ReleaseBuilds<'_>> {
        self.entries.iter().rev().flat_map(|(os, releases)| {
            releases.iter().rev().map(move |(release, builds)| ReleaseBuilds {
                os_major_version: os,
                feature_release_version: release,
                builds,
            })
        })
    }

    pub fn os_count(&self) -> usize {
        self.entries.len()
    }

    pub fn release_count(&self) -> usize {
        self.entries.values().map(|releases| releases.len()).sum()
    }

    /// Total (release, build) entries
    pub fn build_count(&self) -> usize {
        self.iter().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct ReleasesView<'a>(&'a ReleaseMap);

impl Serialize for ReleasesView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (release, builds) in self.0.iter().rev() {
            let newest_first: Vec<&BuildNumber> = builds.iter().rev().collect();
            map.serialize_entry(release, &newest_first)?;
        }
        map.end()
    }
}

/// Serializes as nested maps in catalog order
impl Serialize for BuildCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (os, releases) in self.entries.iter().rev() {
            map.serialize_entry(os, &ReleasesView(releases))?;
        }
        map.end()
    }
}
