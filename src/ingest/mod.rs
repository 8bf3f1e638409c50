//! Turning raw lines into record-store updates.
//!
//! - [`classifier`] - maps a line to an event category plus captured fields
//! - [`extract`] - finds IPv4 literals and applies the reverse-lookup reduction
//! - [`timestamp`] - recognises the syslog and fail2ban timestamp prefixes

pub mod classifier;
pub mod extract;
pub mod timestamp;

use crate::store::{InputCategory, RecordStore};
use extract::{addresses_to_record, extract_addresses};
use timestamp::SourceClock;

/// Feed one line from `file_name` into the store.
///
/// Lines without an address are ignored. Returns how many addresses were recorded.
pub fn ingest_line(
    store: &mut RecordStore,
    category: InputCategory,
    file_name: &str,
    line: &str,
    clock: &mut SourceClock,
) -> usize {
    let addresses = addresses_to_record(category, extract_addresses(line));
    if addresses.is_empty() {
        return 0;
    }

    let seen = clock.stamp(line);
    let verdict = match category {
        InputCategory::Log => classifier::classify(line),
        InputCategory::White | InputCategory::Black => None,
    };

    for address in &addresses {
        store.record_seen(category, file_name, address, verdict.clone(), seen);
    }
    addresses.len()
}

/// Feed a whole source, in order. Lines are trimmed and blank lines skipped.
///
/// `clock` is a [`SourceClock`] or the year of the first syslog stamp.
pub fn ingest_lines<I, S>(
    store: &mut RecordStore,
    category: InputCategory,
    file_name: &str,
    lines: I,
    clock: impl Into<SourceClock>,
) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut clock = clock.into();
    store.register_source(category, file_name);
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref().trim();
            (!line.is_empty()).then(|| ingest_line(store, category, file_name, line, &mut clock))
        })
        .sum()
}
