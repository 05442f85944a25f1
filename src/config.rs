// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Run configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{BuildTierError, Result};
use crate::loader::DEFAULT_BUILD_COLUMN;
use crate::tiers::{TierPolicy, DEFAULT_AGING_BUILD_COUNT, DEFAULT_CURRENT_BUILD_COUNT};

pub const WINDOWS_10_RELEASE_INFO: &str =
    "https://learn.microsoft.com/en-us/windows/release-health/release-information";
pub const WINDOWS_11_RELEASE_INFO: &str =
    "https://learn.microsoft.com/en-us/windows/release-health/windows11-release-information";

/// Compliance run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComplianceConfig {
    /// Newest builds per feature release considered current
    #[serde(alias = "current-build-count")]
    pub current_build_count: i64,
    /// Builds after the current window considered aging
    #[serde(alias = "aging-build-count")]
    pub aging_build_count: i64,
    /// Inventory CSV column holding the OS build
    #[serde(alias = "inventory-build-column")]
    pub inventory_build_column: String,
    /// OS label → release-information page URL
    #[serde(alias = "os-checks")]
    pub os_checks: BTreeMap<String, String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        let mut os_checks = BTreeMap::new();
        os_checks.insert("Windows 10".to_string(), WINDOWS_10_RELEASE_INFO.to_string());
        os_checks.insert("Windows 11".to_string(), WINDOWS_11_RELEASE_INFO.to_string());
        Self {
            current_build_count: DEFAULT_CURRENT_BUILD_COUNT as i64,
            aging_build_count: DEFAULT_AGING_BUILD_COUNT as i64,
            inventory_build_column: DEFAULT_BUILD_COLUMN.to_string(),
            os_checks,
        }
    }
}

impl ComplianceConfig {
    /// Load from TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildTierError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.tier_policy()?;
        if config.inventory_build_column.trim().is_empty() {
            return Err(BuildTierError::Configuration(
                "inventory_build_column must not be empty".into(),
            ));
        }
        Ok(config)
    }

    /// Validated tier window sizes
    pub fn tier_policy(&self) -> Result<TierPolicy> {
        TierPolicy::new(self.current_build_count, self.aging_build_count)
    }

    /// Generate sample config
    pub fn sample_toml() -> String {
        format!(
            r#"# buildtier configuration

# Newest builds of each feature release that count as current
current_build_count = {current}
# Builds after the current window that count as aging; older builds are disallowed
aging_build_count = {aging}

# Inventory CSV column holding each machine's OS build
inventory_build_column = "{column}"

# Release information pages to scrape, keyed by OS label
[os_checks]
"Windows 10" = "{win10}"
"Windows 11" = "{win11}"
"#,
            current = DEFAULT_CURRENT_BUILD_COUNT,
            aging = DEFAULT_AGING_BUILD_COUNT,
            column = DEFAULT_BUILD_COLUMN,
            win10 = WINDOWS_10_RELEASE_INFO,
            win11 = WINDOWS_11_RELEASE_INFO,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sample_round_trips_to_default() {
        let parsed = ComplianceConfig::from_toml(&ComplianceConfig::sample_toml()).unwrap();
        assert_eq!(parsed, ComplianceConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg = ComplianceConfig::from_toml("current_build_count = 1\n").unwrap();
        assert_eq!(cfg.current_build_count, 1);
        assert_eq!(cfg.aging_build_count, 2);
        assert_eq!(cfg.os_checks.len(), 2);
        let policy = cfg.tier_policy().unwrap();
        assert_eq!((policy.current_count(), policy.aging_count()), (1, 2));
    }

    #[test]
    fn test_kebab_case_keys_accepted() {
        let cfg = ComplianceConfig::from_toml(
            "current-build-count = 4\naging-build-count = 0\n[os-checks]\n\"Windows 11\" = \"https://example.invalid/w11\"\n",
        )
        .unwrap();
        assert_eq!((cfg.current_build_count, cfg.aging_build_count), (4, 0));
        assert_eq!(cfg.os_checks.keys().collect::<Vec<_>>(), vec!["Windows 11"]);
    }

    #[test]
    fn test_negative_count_is_configuration_error() {
        let err = ComplianceConfig::from_toml("aging_build_count = -1\n").unwrap_err();
        assert!(matches!(err, BuildTierError::Configuration(ref m) if m.contains("aging_build_count")));
    }

    #[test]
    fn test_non_integer_count_is_configuration_error() {
        for bad in ["current_build_count = 2.5\n", "current_build_count = \"three\"\n"] {
            assert!(matches!(
                ComplianceConfig::from_toml(bad),
                Err(BuildTierError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ComplianceConfig::from_toml("curent_build_count = 3\n").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "current_build_count = 5").unwrap();
        let cfg = ComplianceConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(cfg.current_build_count, 5);
        assert!(matches!(
            ComplianceConfig::from_toml_file(Path::new("/nonexistent/buildtier.toml")),
            Err(BuildTierError::Configuration(_))
        ));
    }
}
