//! Block-list export for downstream firewall tooling.
//!
//! One row per final address, in report order. JSON output carries the
//! merged evidence as well; CSV keeps to flat columns.

use crate::error::SiftError;
use crate::geo::DemographicLookup;
use crate::store::{Evidence, RecordStore};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Use `format` when given, otherwise go by the file extension (default JSON).
    pub fn resolve(path: &Path, format: Option<&str>) -> Result<Self> {
        match format {
            Some(f) if f.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(f) if f.eq_ignore_ascii_case("csv") => Ok(Self::Csv),
            Some(other) => Err(anyhow!(
                "Invalid format '{}': expected 'json' or 'csv'",
                other
            )),
            None => {
                if path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
                {
                    Ok(Self::Csv)
                } else {
                    Ok(Self::Json)
                }
            }
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// One exported address.
#[derive(Debug, Clone, Serialize)]
pub struct BlocklistEntry {
    pub address: String,
    pub occurrences: usize,
    pub country: Option<String>,
    pub city: Option<String>,
    pub evidence: BTreeMap<String, Evidence>,
}

#[derive(Debug, Serialize)]
struct BlocklistEntryCsv {
    address: String,
    occurrences: usize,
    country: String,
    city: String,
}

impl From<&BlocklistEntry> for BlocklistEntryCsv {
    fn from(entry: &BlocklistEntry) -> Self {
        Self {
            address: entry.address.clone(),
            occurrences: entry.occurrences,
            country: entry.country.clone().unwrap_or_default(),
            city: entry.city.clone().unwrap_or_default(),
        }
    }
}

/// Build export rows for `addresses` from their merged log records.
pub fn blocklist_entries(
    store: &RecordStore,
    addresses: &[String],
    demographics: Option<&dyn DemographicLookup>,
) -> Result<Vec<BlocklistEntry>, SiftError> {
    addresses
        .iter()
        .map(|address| {
            let merged = store.merged(address)?;
            let (occurrences, evidence) = merged
                .map(|r| (r.occurrences, r.evidence))
                .unwrap_or_default();
            let found = demographics
                .map(|lookup| lookup.lookup(address))
                .and_then(|l| l.demographic().cloned());

            Ok(BlocklistEntry {
                address: address.clone(),
                occurrences,
                country: found.as_ref().map(|d| d.country.clone()),
                city: found.map(|d| d.city),
                evidence,
            })
        })
        .collect()
}

/// Write `entries` to `path`; returns the format used.
pub fn write_export(
    path: &Path,
    format: Option<&str>,
    entries: &[BlocklistEntry],
) -> Result<ExportFormat> {
    let export_format = ExportFormat::resolve(path, format)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;

    match export_format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(file);
            for entry in entries {
                writer
                    .serialize(BlocklistEntryCsv::from(entry))
                    .context("Failed to write CSV record")?;
            }
            writer.flush().context("Failed to flush CSV writer")?;
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(file, entries).context("Failed to write JSON export")?;
        }
    }

    Ok(export_format)
}
