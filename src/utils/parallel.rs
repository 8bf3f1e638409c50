//! Parallel ingestion of input sources.
//!
//! Each source is read into its own [`RecordStore`] on a rayon worker, so no
//! store is ever shared while it is being written. The per-source stores
//! are then folded together in input order with [`RecordStore::absorb`];
//! because record merging is commutative and associative the result is the
//! same as reading every source sequentially.

use crate::ingest::ingest_line;
use crate::ingest::timestamp::SourceClock;
use crate::store::{InputCategory, RecordStore};
use crate::utils::progress::ProgressBar;
use crate::utils::reader::{for_each_line, open_source};
use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, warn};

/// One input source to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub category: InputCategory,
    pub name: String,
}

impl SourceSpec {
    pub fn new(category: InputCategory, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }
}

/// Everything ingestion produced.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub store: RecordStore,
    /// Names of sources that were read, in input order.
    pub opened: Vec<String>,
    /// Sources that could not be read, with the reason.
    pub access_errors: Vec<(String, String)>,
    /// Addresses recorded across all sources (duplicates included).
    pub addresses_recorded: usize,
}

struct SourceResult {
    spec: SourceSpec,
    outcome: Result<(RecordStore, usize), String>,
}

fn stream_source(spec: &SourceSpec, clock: SourceClock) -> Result<(RecordStore, usize, usize)> {
    let reader = open_source(&spec.name)?;
    let mut store = RecordStore::new();
    let mut clock = clock;
    let mut recorded = 0usize;

    store.register_source(spec.category, &spec.name);
    let lines = for_each_line(reader, &spec.name, |line| {
        recorded += ingest_line(&mut store, spec.category, &spec.name, line, &mut clock);
    })?;

    Ok((store, lines, recorded))
}

fn ingest_source(spec: &SourceSpec, clock: SourceClock) -> SourceResult {
    let outcome = match stream_source(spec, clock) {
        Ok((store, lines, recorded)) => {
            debug!(
                source = %spec.name,
                category = %spec.category,
                lines,
                recorded,
                "Source ingested"
            );
            Ok((store, recorded))
        }
        Err(e) => {
            warn!(source = %spec.name, error = %e, "Source unreadable");
            Err(format!("{:#}", e))
        }
    };

    SourceResult {
        spec: spec.clone(),
        outcome,
    }
}

/// Read every source and fold the results into one store.
///
/// More than one source is read in parallel; each source is streamed line
/// by line with its own copy of `clock`. Unreadable sources are collected
/// in [`IngestOutcome::access_errors`] and do not stop the run.
pub fn ingest_sources(
    sources: &[SourceSpec],
    clock: impl Into<SourceClock>,
    progress: &ProgressBar,
) -> Result<IngestOutcome> {
    let clock = clock.into();
    let results: Vec<SourceResult> = if sources.len() > 1 {
        sources
            .par_iter()
            .map(|spec| {
                let result = ingest_source(spec, clock);
                progress.inc();
                result
            })
            .collect()
    } else {
        sources
            .iter()
            .map(|spec| {
                let result = ingest_source(spec, clock);
                progress.inc();
                result
            })
            .collect()
    };

    let mut combined = IngestOutcome::default();
    for result in results {
        match result.outcome {
            Ok((store, recorded)) => {
                combined.store.absorb(store)?;
                combined.addresses_recorded += recorded;
                combined.opened.push(result.spec.name);
            }
            Err(reason) => combined.access_errors.push((result.spec.name, reason)),
        }
    }

    Ok(combined)
}
