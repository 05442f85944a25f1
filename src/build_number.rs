// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Dotted-numeric OS build numbers with version-aware ordering.
//!
//! Build numbers such as `19045.3754` or `10.0.22631.2861` compare component by
//! component as integers, so `19045.10` ranks above `19045.9`. The input text
//! is kept verbatim because inventory matching is textual.
//!
//! # Examples
//!
//! ```
//! use buildtierlib::build_number::BuildNumber;
//!
//! let older: BuildNumber = "19045.9".parse().unwrap();
//! let newer: BuildNumber = "19045.10".parse().unwrap();
//! assert!(newer > older);
//! assert_eq!(newer.as_str(), "19045.10");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{BuildTierError, Result};

/// A parsed build number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildNumber {
    raw: String,
    components: Vec<u64>,
}

impl BuildNumber {
    /// Parse a dotted-numeric build number. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let raw = text.trim();
        if raw.is_empty() {
            return Err(BuildTierError::InvalidBuildNumber(text.to_string()));
        }
        let components = raw
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(BuildTierError::InvalidBuildNumber(text.to_string()));
                }
                part.parse::<u64>()
                    .map_err(|_| BuildTierError::InvalidBuildNumber(text.to_string()))
            })
            .collect::<Result<Vec<u64>>>()?;
        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    /// The build number as it was written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric components, most significant first
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl Ord for BuildNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        // Vec ordering is lexicographic over integers; raw text breaks ties
        // between spellings like "19045.01" and "19045.1".
        self.components
            .cmp(&other.components)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for BuildNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for BuildNumber {
    type Err = BuildTierError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for BuildNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for BuildNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        BuildNumber::parse(&text).map_err(serde::de::Error::custom)
    }
}
