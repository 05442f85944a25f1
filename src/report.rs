// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Report output: the compliance CSV, saved vendor build lists, JSON dumps.

use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::compliance::{ComplianceRow, ComplianceStats};
use crate::csvio::write_record;
use crate::error::Result;
use crate::loader::BUILD_LIST_COLUMNS;
use crate::pipeline::ComplianceReport;
use crate::records::BuildRecord;
use crate::tiers::Tier;

/// Column headings of the compliance report
pub const REPORT_HEADER: [&str; 5] = ["Operating System", "Release", "current", "aging", "disallowed"];

/// Flatten statistics into report rows, newest OS and release first
pub fn report_rows(stats: &ComplianceStats) -> Vec<ComplianceRow> {
    stats.rows()
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Write the compliance report CSV
pub fn write_report<W: Write>(out: &mut W, stats: &ComplianceStats) -> Result<()> {
    write_record(out, &REPORT_HEADER)?;
    for row in report_rows(stats) {
        let mut fields = vec![row.os_major_version, row.feature_release_version];
        fields.extend(Tier::ALL.iter().map(|t| row.counts.get(*t).to_string()));
        write_record(out, fields.as_slice())?;
    }
    Ok(())
}

/// Write the compliance report to `path`, creating parent directories
pub fn write_report_csv(path: &Path, stats: &ComplianceStats) -> Result<()> {
    let mut out = create_output(path)?;
    write_report(&mut out, stats)?;
    out.flush()?;
    log::info!("wrote {} report rows to {}", stats.release_count(), path.display());
    Ok(())
}

/// `reports/stats.csv` → `reports/stats-2024-01-09.csv`
pub fn dated_report_path(path: &Path, date: NaiveDate) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, date.format("%Y-%m-%d"), ext.to_string_lossy()),
        None => format!("{}-{}", stem, date.format("%Y-%m-%d")),
    };
    path.with_file_name(name)
}

/// Save vendor build records in the format `loader::load_build_records` reads
pub fn write_build_records_csv(path: &Path, records: &[BuildRecord]) -> Result<()> {
    let mut out = create_output(path)?;
    write_record(&mut out, &BUILD_LIST_COLUMNS)?;
    for r in records {
        write_record(
            &mut out,
            &[
                r.os_major_version.as_str(),
                r.feature_release_version.as_str(),
                r.release_full_name.as_str(),
                r.release_date.as_str(),
                r.build_number.as_str(),
                r.kb.as_deref().unwrap_or(""),
            ],
        )?;
    }
    out.flush()?;
    log::info!("wrote {} vendor build records to {}", records.len(), path.display());
    Ok(())
}

fn dump_json<T: serde::Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut out = create_output(&path)?;
    serde_json::to_writer_pretty(&mut out, value)?;
    out.flush()?;
    Ok(path)
}

/// Write the run's intermediate structures as JSON files under `dir`
pub fn dump_intermediates(dir: &Path, report: &ComplianceReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let written = vec![
        dump_json(dir, "deployed_os_builds.json", &report.inventory.deployed)?,
        dump_json(dir, "unmatched_os_builds.json", &report.inventory.unmatched)?,
        dump_json(dir, "unmatched_assets.json", &report.inventory.unmatched_assets)?,
        dump_json(dir, "build_allowed_builds.json", &report.tiers)?,
        dump_json(dir, "build_os_mappings.json", &report.catalog)?,
        dump_json(dir, "compliance_stats.json", &report.stats)?,
    ];
    log::debug!("dumped {} intermediate files to {}", written.len(), dir.display());
    Ok(written)
}
