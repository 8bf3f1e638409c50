//! Reconciling the candidate block-list against white and black sources.
//!
//! Any candidate address that also appears in a known (white or black)
//! source is removed: a black-listed address is already mitigated and a
//! white-listed one is exempt. The removal is explained per source file,
//! sorted by canonical address so repeated runs produce identical text.

use crate::error::SiftError;
use crate::report::order::sort_by_address;
use crate::report::render::Renderer;
use crate::store::{AddressSets, SourceFile};
use std::collections::{BTreeMap, BTreeSet};

/// What reconciliation removed and why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Union of every overlap.
    pub removed: BTreeSet<String>,
    /// Overlap per known source; only non-empty overlaps are present.
    pub by_source: BTreeMap<SourceFile, BTreeSet<String>>,
    /// Human-readable listing; empty when nothing was removed.
    pub explanation: String,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Remove every address found in a known source from `candidate`.
///
/// Returns the overlap per known source. `candidate` is left holding the
/// filtered set.
pub fn remove_known(
    sets: &AddressSets,
    candidate: &mut BTreeSet<String>,
) -> BTreeMap<SourceFile, BTreeSet<String>> {
    let mut by_source = BTreeMap::new();
    for (source, known) in sets.known() {
        let overlap: BTreeSet<String> = known.intersection(candidate).cloned().collect();
        if !overlap.is_empty() {
            by_source.insert(source.clone(), overlap);
        }
    }

    for overlap in by_source.values() {
        for address in overlap {
            candidate.remove(address);
        }
    }
    by_source
}

/// Filter `candidate` against the known sources and explain the removals.
///
/// Detail views are embedded for each removed address when `renderer`
/// asks for more than bare addresses.
pub fn reconcile(
    sets: &AddressSets,
    candidate: &mut BTreeSet<String>,
    renderer: &Renderer<'_>,
) -> Result<Reconciliation, SiftError> {
    let by_source = remove_known(sets, candidate);
    let removed: BTreeSet<String> = by_source.values().flatten().cloned().collect();
    let explanation = explain(&by_source, &removed, renderer)?;

    Ok(Reconciliation {
        removed,
        by_source,
        explanation,
    })
}

fn explain(
    by_source: &BTreeMap<SourceFile, BTreeSet<String>>,
    removed: &BTreeSet<String>,
    renderer: &Renderer<'_>,
) -> Result<String, SiftError> {
    if by_source.is_empty() {
        return Ok(String::new());
    }

    let mut out = String::from(
        "The following IP addresses are being removed from the output\n \
         because they appear in white or black input files as shown:\n",
    );

    for (source, overlap) in by_source {
        out.push_str(&format!("#     Contents of file {}:\n", source));
        let ordered = sort_by_address(overlap);
        for address in ordered.addresses.iter().chain(&ordered.malformed) {
            out.push_str(&format!("        {}\n", address));
        }
    }

    if renderer.wants_detail() {
        out.push_str("Requested details follow:\n");
        let ordered = sort_by_address(removed);
        for address in ordered.addresses.iter().chain(&ordered.malformed) {
            out.push_str(&renderer.render(address)?);
        }
    }

    Ok(out)
}
