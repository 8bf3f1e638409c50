//! Final report assembly.
//!
//! - [`order`] - canonical address keys, address and frequency orderings
//! - [`render`] - per-address detail view at report levels 0-2
//! - [`export`] - machine-readable block-list export (JSON or CSV)
//!
//! [`build_report`] runs the post-ingestion half of the engine: derive the
//! address sets, reconcile the candidates against known sources, order what
//! is left and render the text report.

pub mod export;
pub mod order;
pub mod render;

use crate::error::SiftError;
use crate::reconcile::{reconcile, Reconciliation};
use crate::store::SourceFile;
use order::{order_addresses, SortOrder};
use render::Renderer;

/// Column caption printed above the main body.
pub const MAIN_BODY_CAPTION: &str = "__ IP Address __  _ # _   _Line Type  +/- extra info";

/// Options that shape the text report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSettings {
    pub order: SortOrder,
    /// Omit the opened-files, access-error and empty-file sections.
    pub quiet: bool,
    /// Include the reconciliation explanation.
    pub verbose: bool,
}

/// Runner-side facts the report mentions.
#[derive(Debug, Clone, Default)]
pub struct SourceOutcome {
    /// Sources that were opened and read, in input order.
    pub opened: Vec<String>,
    /// Sources that could not be read, with the reason.
    pub access_errors: Vec<(String, String)>,
}

/// Everything produced by a run.
#[derive(Debug, Clone)]
pub struct FinalReport {
    pub text: String,
    /// Final addresses in report order.
    pub addresses: Vec<String>,
    /// Candidates that could not be canonicalised.
    pub malformed: Vec<String>,
    pub reconciliation: Reconciliation,
    pub empty_sources: Vec<SourceFile>,
}

/// Reconcile, order and render everything the renderer's store holds.
pub fn build_report(
    renderer: &Renderer<'_>,
    settings: &ReportSettings,
    outcome: &SourceOutcome,
) -> Result<FinalReport, SiftError> {
    let store = renderer.store();
    let sets = store.address_sets();
    let mut candidate = sets.candidate();
    let reconciliation = reconcile(&sets, &mut candidate, renderer)?;

    let ordered = order_addresses(&candidate, settings.order, |address| {
        store.total_occurrences(address)
    });
    let empty_sources: Vec<SourceFile> = store.empty_sources().into_iter().cloned().collect();

    let mut text = String::from("## LogSift REPORT ##\n");

    if !settings.quiet {
        if !outcome.opened.is_empty() {
            text.push_str("\nThe following files were successfully opened for input:\n");
            for name in &outcome.opened {
                text.push_str(&format!("\t{}\n", name));
            }
            text.push('\n');
        }

        if !outcome.access_errors.is_empty() {
            text.push_str("\nFILE ACCESS ERRORS:\n");
            for (name, reason) in &outcome.access_errors {
                text.push_str(&format!("{}: {}\n", name, reason));
            }
            text.push_str("End of file access errors report.\n");
        }

        if !empty_sources.is_empty() {
            text.push_str("\nFILES WITHOUT IP ADDRESS\n");
            for source in &empty_sources {
                text.push_str(&format!(
                    "\t'{}' (of type '{}')\n",
                    source.name, source.category
                ));
            }
        }
        text.push('\n');
    }

    if settings.verbose {
        text.push_str(&reconciliation.explanation);
    }

    text.push_str("\n## MAIN BODY of OUTPUT ##\n");
    text.push_str(MAIN_BODY_CAPTION);
    text.push('\n');
    for address in &ordered.addresses {
        text.push_str(&renderer.render(address)?);
    }

    if !ordered.malformed.is_empty() {
        text.push_str("\nMALFORMED ADDRESSES\n");
        for address in &ordered.malformed {
            text.push_str(&format!("\t{}\n", address));
        }
    }

    Ok(FinalReport {
        text,
        addresses: ordered.addresses,
        malformed: ordered.malformed,
        reconciliation,
        empty_sources,
    })
}
