// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Load the deployed inventory roster and saved vendor build lists from CSV.

use std::path::Path;

use crate::build_number::BuildNumber;
use crate::csvio::CsvTable;
use crate::error::{BuildTierError, Result};
use crate::observer::{ComplianceEvent, ComplianceObserver};
use crate::records::{BuildRecord, InventoryEntry};

/// Column the RMM export uses for the OS build
pub const DEFAULT_BUILD_COLUMN: &str = "OS Build";

/// Columns of a saved vendor build list, in order
pub const BUILD_LIST_COLUMNS: [&str; 6] = [
    "os_major_version",
    "feature_release_version",
    "release_full_name",
    "release_date",
    "build_number",
    "kb",
];

const ASSET_NAME_COLUMNS: [&str; 3] = ["Asset Name", "Name", "Hostname"];

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        BuildTierError::Io(std::io::Error::new(
            e.kind(),
            format!("Cannot read {}: {}", path.display(), e),
        ))
    })
}

fn cell(row: &[String], i: usize) -> String {
    row.get(i).map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Parse an inventory roster from CSV text
pub fn parse_inventory(text: &str, build_column: &str, source_name: &str) -> Result<Vec<InventoryEntry>> {
    let table = CsvTable::parse(text)?;
    let build_idx = table.column(build_column).ok_or_else(|| BuildTierError::MissingColumn {
        column: build_column.to_string(),
        source_name: source_name.to_string(),
    })?;
    let asset_idx = ASSET_NAME_COLUMNS.iter().find_map(|c| table.column(c));

    let entries = table
        .rows
        .iter()
        .map(|row| InventoryEntry {
            build_number: row.get(build_idx).cloned().unwrap_or_default(),
            asset_name: asset_idx
                .and_then(|i| row.get(i))
                .filter(|s| !s.is_empty())
                .cloned(),
        })
        .collect();
    Ok(entries)
}

/// Load the deployed inventory roster
pub fn load_inventory(path: &Path, build_column: &str) -> Result<Vec<InventoryEntry>> {
    let text = read_text(path)?;
    let entries = parse_inventory(&text, build_column, &path.display().to_string())?;
    log::debug!("loaded {} inventory entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse a vendor build list; rows with bad build numbers are skipped
pub fn parse_build_records(
    table: &CsvTable,
    source_name: &str,
    observer: &mut dyn ComplianceObserver,
) -> Result<Vec<BuildRecord>> {
    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(BUILD_LIST_COLUMNS) {
        *slot = table.column(name).ok_or_else(|| BuildTierError::MissingColumn {
            column: name.to_string(),
            source_name: source_name.to_string(),
        })?;
    }
    let [os_i, feature_i, name_i, date_i, build_i, kb_i] = idx;
    let mut records = Vec::with_capacity(table.rows.len());
    for (n, row) in table.rows.iter().enumerate() {
        let raw_build = cell(row, build_i);
        let build_number = match BuildNumber::parse(&raw_build) {
            Ok(b) => b,
            Err(e) => {
                observer.on_event(ComplianceEvent::RecordSkipped {
                    source: format!("{} row {}", source_name, n + 2),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let kb = cell(row, kb_i);
        records.push(BuildRecord {
            os_major_version: cell(row, os_i),
            feature_release_version: cell(row, feature_i),
            release_full_name: cell(row, name_i),
            release_date: cell(row, date_i),
            build_number,
            kb: if kb.is_empty() { None } else { Some(kb) },
        });
    }
    Ok(records)
}

/// Load a vendor build list previously written by the `fetch` command
pub fn load_build_records(path: &Path, observer: &mut dyn ComplianceObserver) -> Result<Vec<BuildRecord>> {
    let table = CsvTable::parse(&read_text(path)?)?;
    let records = parse_build_records(&table, &path.display().to_string(), observer)?;
    log::debug!("loaded {} vendor build records from {}", records.len(), path.display());
    Ok(records)
}
