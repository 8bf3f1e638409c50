//! The `report` command: sift log sources into a block-list report.
//!
//! Reads every log, white and black source, aggregates the addresses found,
//! removes anything already listed in a white or black source, and writes
//! the ordered report.
//!
//! # Usage
//!
//! ```bash
//! # Addresses from the system auth log, sorted by address
//! logsift report -i /var/log/auth.log
//!
//! # Every log under /var/log, skipping known addresses, most frequent first
//! logsift report -l /var/log -w trusted.txt -b blocked.txt -f -rr
//!
//! # Explain removals and add country/city for each address
//! logsift report -l /var/log -b blocked.txt -v -d
//!
//! # Machine-readable block-list for a firewall pipeline
//! logsift report -i auth.log --export blocklist.csv
//!
//! # Read from stdin
//! zcat /var/log/auth.log.*.gz | logsift report
//! ```
//!
//! # Output
//!
//! - Sources that were opened, sources that could not be opened, and
//!   sources without any address (unless `--quiet`)
//! - Known addresses removed from the output, grouped by the source that
//!   listed them (with `--verbose`)
//! - The main body: one entry per address at the requested report level

use crate::geo::{DemographicLookup, DemographicTable, GeoClient};
use crate::ingest::timestamp::SourceClock;
use crate::report::export::{blocklist_entries, write_export};
use crate::report::order::SortOrder;
use crate::report::render::{ReportLevel, Renderer};
use crate::report::{build_report, FinalReport, ReportSettings, SourceOutcome};
use crate::store::{InputCategory, RecordStore};
use crate::utils::discover::find_log_files;
use crate::utils::format::count_noun;
use crate::utils::parallel::{ingest_sources, SourceSpec};
use crate::utils::progress::ProgressBar;
use crate::utils::reader::STDIN_NAME;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

/// Options for one report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub inputs: Vec<String>,
    pub logdirs: Vec<String>,
    pub white: Vec<String>,
    pub black: Vec<String>,
    /// Number of `-r` flags (0-2).
    pub level: u8,
    pub demographics: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub frequency: bool,
    pub output: Option<String>,
    pub export: Option<String>,
    pub format: Option<String>,
    pub geo_url: Option<String>,
    pub geo_timeout_ms: u64,
    pub geo_concurrency: usize,
    /// Year of the first syslog stamp in each source. Without it, stamps
    /// are placed relative to today's date.
    pub year: Option<i32>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            logdirs: Vec::new(),
            white: Vec::new(),
            black: Vec::new(),
            level: 0,
            demographics: false,
            quiet: false,
            verbose: false,
            frequency: false,
            output: None,
            export: None,
            format: None,
            geo_url: None,
            geo_timeout_ms: 3000,
            geo_concurrency: 8,
            year: None,
        }
    }
}

impl ReportOptions {
    fn settings(&self) -> ReportSettings {
        ReportSettings {
            order: if self.frequency {
                SortOrder::Frequency
            } else {
                SortOrder::Address
            },
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

/// Sources to read, in order, plus directories that could not be walked.
pub fn plan_sources(options: &ReportOptions) -> (Vec<SourceSpec>, Vec<(String, String)>) {
    let discovery = find_log_files(&options.logdirs);

    let mut logs: Vec<String> = options.inputs.clone();
    logs.extend(discovery.files);
    if logs.is_empty() && options.logdirs.is_empty() {
        logs.push(STDIN_NAME.to_string());
    }

    let sources = logs
        .into_iter()
        .map(|name| SourceSpec::new(InputCategory::Log, name))
        .chain(
            options
                .white
                .iter()
                .map(|name| SourceSpec::new(InputCategory::White, name.as_str())),
        )
        .chain(
            options
                .black
                .iter()
                .map(|name| SourceSpec::new(InputCategory::Black, name.as_str())),
        )
        .collect();

    (sources, discovery.errors)
}

/// Everything a run computed.
pub struct RunResult {
    pub report: FinalReport,
    pub store: RecordStore,
    pub demographics: Option<DemographicTable>,
}

/// Ingest, reconcile and render without writing anything.
pub async fn generate(options: &ReportOptions) -> Result<RunResult> {
    let (sources, discovery_errors) = plan_sources(options);
    let clock = match options.year {
        Some(year) => SourceClock::starting(year),
        None => SourceClock::relative_to(Local::now().date_naive()),
    };

    let progress = if options.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(sources.len(), "Reading sources")
    };
    let ingested = ingest_sources(&sources, clock, &progress)?;
    progress.finish_and_clear();

    info!(
        sources = sources.len(),
        opened = ingested.opened.len(),
        unreadable = ingested.access_errors.len() + discovery_errors.len(),
        records = ingested.store.len(),
        "Ingestion complete ({})",
        count_noun(ingested.addresses_recorded, "address", "addresses")
    );

    let store = ingested.store;

    let demographics = if options.demographics {
        let client = GeoClient::from_options(
            options.geo_url.as_deref(),
            options.geo_timeout_ms,
            options.geo_concurrency,
        )?;
        let candidates = store.address_sets().candidate();
        info!(
            endpoint = client.base_url(),
            addresses = candidates.len(),
            "Resolving demographics"
        );
        Some(client.resolve_all(candidates).await)
    } else {
        None
    };

    let mut access_errors = discovery_errors;
    access_errors.extend(ingested.access_errors);
    let outcome = SourceOutcome {
        opened: ingested.opened,
        access_errors,
    };

    let report = {
        let mut renderer = Renderer::new(&store, ReportLevel::from_count(options.level));
        if let Some(table) = &demographics {
            renderer = renderer.with_demographics(table);
        }
        build_report(&renderer, &options.settings(), &outcome)?
    };

    Ok(RunResult {
        report,
        store,
        demographics,
    })
}

fn write_report(text: &str, output: Option<&str>) -> Result<()> {
    if let Some(path) = output {
        match File::create(path) {
            Ok(mut file) => {
                file.write_all(text.as_bytes())
                    .with_context(|| format!("Failed to write report to {}", path))?;
                info!(output = path, "Report written");
                return Ok(());
            }
            Err(e) => {
                warn!(output = path, error = %e, "Cannot open output file, using stdout");
                eprintln!("Unable to open output file '{}': {}", path, e);
                eprintln!("Output is being sent to stdout instead.");
            }
        }
    }

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("Failed to write report to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub async fn run(options: &ReportOptions) -> Result<()> {
    let result = generate(options).await?;

    write_report(&result.report.text, options.output.as_deref())?;

    if let Some(export_path) = &options.export {
        let lookup = result
            .demographics
            .as_ref()
            .map(|t| t as &dyn DemographicLookup);
        let entries = blocklist_entries(&result.store, &result.report.addresses, lookup)?;
        let format = write_export(Path::new(export_path), options.format.as_deref(), &entries)?;
        if !options.quiet {
            eprintln!(
                "Exported {} to {} (format: {})",
                count_noun(entries.len(), "address", "addresses"),
                export_path,
                format.as_str()
            );
        }
    }

    Ok(())
}
