// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Vendor release-information pages → [`BuildRecord`]s.
//!
//! A release-information page lists each feature release under a bold heading
//! such as `Version 22H2 (OS build 19045)`, followed by a table of servicing
//! updates. Each table is attributed to the bold heading immediately preceding
//! it in the document. When that heading is not a `Version ...` heading the
//! table is skipped, so a page that reorders or drops sections cannot shift
//! build rows onto the wrong feature release.
//!
//! # Examples
//!
//! ```
//! use buildtierlib::feed::ReleasePageParser;
//! use buildtierlib::observer::NullObserver;
//!
//! let html = r#"<p><strong>Version 22H2 (OS build 19045)</strong></p>
//! <table class="cells-centered">
//!   <tr><th>Servicing option</th><th>Availability date</th><th>Build</th><th>KB article</th></tr>
//!   <tr><td>General Availability Channel</td><td>2023-11-14</td><td>19045.3693</td><td>KB5032189</td></tr>
//! </table>"#;
//!
//! let parser = ReleasePageParser::new().unwrap();
//! let records = parser.parse("Windows 10", html, &mut NullObserver).unwrap();
//! assert_eq!(records[0].feature_release_version, "22H2");
//! assert_eq!(records[0].build_number.as_str(), "19045.3693");
//! ```

use regex::Regex;

use crate::build_number::BuildNumber;
use crate::error::Result;
use crate::observer::{ComplianceEvent, ComplianceObserver};
use crate::records::BuildRecord;

const LTSC_MARKER: &str = "Long-Term Servicing Channel (LTSC)";

/// Compiled patterns for release-information pages
pub struct ReleasePageParser {
    heading: Regex,
    table: Regex,
    row: Regex,
    cell: Regex,
    tag: Regex,
    date: Regex,
    build: Regex,
    kb: Regex,
}

#[derive(Debug)]
struct Heading {
    offset: usize,
    text: String,
}

impl ReleasePageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            heading: Regex::new(r"(?is)<strong[^>]*>(.*?)</strong>")?,
            table: Regex::new(r#"(?is)<table[^>]*class\s*=\s*"[^"]*\bcells-centered\b[^"]*"[^>]*>(.*?)</table>"#)?,
            row: Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>")?,
            cell: Regex::new(r"(?is)<td[^>]*>(.*?)</td>")?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
            date: Regex::new(r"^\d+-\d+-\d+")?,
            build: Regex::new(r"^\d+\.\d+")?,
            kb: Regex::new(r"^KB\d+")?,
        })
    }

    fn text_of(&self, html: &str) -> String {
        let stripped = self.tag.replace_all(html, "");
        decode_entities(&stripped)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn headings(&self, html: &str) -> Vec<Heading> {
        self.heading
            .captures_iter(html)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let text = self.text_of(cap.get(1)?.as_str());
                (!text.is_empty()).then_some(Heading {
                    offset: whole.start(),
                    text,
                })
            })
            .collect()
    }

    /// Parse one page for the OS labelled `os_major_version`
    pub fn parse(
        &self,
        os_major_version: &str,
        html: &str,
        observer: &mut dyn ComplianceObserver,
    ) -> Result<Vec<BuildRecord>> {
        let headings = self.headings(html);
        let mut records = Vec::new();

        for (table_no, table) in self.table.captures_iter(html).enumerate() {
            let (Some(whole), Some(body)) = (table.get(0), table.get(1)) else {
                continue;
            };
            if body.as_str().contains(LTSC_MARKER) {
                log::debug!("{}: skipping LTSC table #{}", os_major_version, table_no);
                continue;
            }
            let Some(heading) = headings.iter().rev().find(|h| h.offset < whole.start()) else {
                observer.on_event(ComplianceEvent::RecordSkipped {
                    source: format!("{} table #{}", os_major_version, table_no),
                    reason: "no release heading precedes the table".into(),
                });
                continue;
            };
            if !heading.text.contains("Version") {
                observer.on_event(ComplianceEvent::RecordSkipped {
                    source: format!("{} table #{}", os_major_version, table_no),
                    reason: format!("nearest heading {:?} is not a release heading", heading.text),
                });
                continue;
            }
            let Some(feature) = heading.text.split_whitespace().nth(1) else {
                observer.on_event(ComplianceEvent::RecordSkipped {
                    source: format!("{} table #{}", os_major_version, table_no),
                    reason: format!("heading {:?} names no feature release", heading.text),
                });
                continue;
            };

            for row in self.row.captures_iter(body.as_str()) {
                let Some(row_html) = row.get(1) else { continue };
                if let Some(record) = self.parse_row(
                    os_major_version,
                    feature,
                    &heading.text,
                    row_html.as_str(),
                    observer,
                ) {
                    records.push(record);
                }
            }
        }

        observer.on_event(ComplianceEvent::FeedParsed {
            os_major_version: os_major_version.to_string(),
            records: records.len(),
        });
        Ok(records)
    }

    fn parse_row(
        &self,
        os_major_version: &str,
        feature: &str,
        heading: &str,
        row_html: &str,
        observer: &mut dyn ComplianceObserver,
    ) -> Option<BuildRecord> {
        let mut release_date = None;
        let mut build = None;
        let mut kb = None;
        for cell in self.cell.captures_iter(row_html) {
            let text = self.text_of(cell.get(1).map(|m| m.as_str()).unwrap_or_default());
            if self.date.is_match(&text) {
                release_date = Some(text);
            } else if self.build.is_match(&text) {
                build = Some(text);
            } else if self.kb.is_match(&text) {
                kb = Some(text);
            }
        }

        // Header rows carry no date.
        let release_date = release_date?;
        let reason = match build.as_deref().map(BuildNumber::parse) {
            Some(Ok(build_number)) => {
                return Some(BuildRecord {
                    os_major_version: os_major_version.to_string(),
                    feature_release_version: feature.to_string(),
                    release_full_name: heading.to_string(),
                    release_date,
                    build_number,
                    kb,
                })
            }
            Some(Err(e)) => e.to_string(),
            None => "row has no build number".to_string(),
        };
        observer.on_event(ComplianceEvent::RecordSkipped {
            source: format!("{} {} {}", os_major_version, feature, release_date),
            reason,
        });
        None
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Download one release-information page
#[cfg(feature = "fetch")]
pub fn fetch_release_page(url: &str) -> Result<String> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(response.text()?)
}

/// Fetch and parse every configured page, in `os_checks` order
#[cfg(feature = "fetch")]
pub fn fetch_all<'a, I>(os_checks: I, observer: &mut dyn ComplianceObserver) -> Result<Vec<BuildRecord>>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let parser = ReleasePageParser::new()?;
    let mut all = Vec::new();
    for (os, url) in os_checks {
        log::info!("fetching {} release information from {}", os, url);
        let html = fetch_release_page(url)?;
        all.extend(parser.parse(os, &html, observer)?);
    }
    if all.is_empty() {
        return Err(crate::error::BuildTierError::Parse(
            "no build records found on any release information page".into(),
        ));
    }
    Ok(all)
}
