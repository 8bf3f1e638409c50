//! The record store: address x category x source file -> aggregate record.
//!
//! Records are held in a single ordered map keyed by a composite
//! [`RecordKey`], so all records for one address are adjacent and log
//! records come before known-set records. Every source read during the run
//! is also tracked with a running count of the addresses it produced.

use crate::error::SiftError;
use crate::ingest::classifier::Classification;
use crate::store::types::{AggregateRecord, InputCategory, SourceFile};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};

/// Composite key for one aggregate record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub address: String,
    pub source: SourceFile,
}

impl RecordKey {
    /// Smallest possible key for `address`; log records sort first.
    fn lower_bound(address: &str) -> Self {
        Self {
            address: address.to_string(),
            source: SourceFile::new(InputCategory::Log, String::new()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: BTreeMap<RecordKey, AggregateRecord>,
    sources: BTreeMap<SourceFile, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a source known to the store even if it never yields an address.
    pub fn register_source(&mut self, category: InputCategory, file_name: &str) {
        self.sources
            .entry(SourceFile::new(category, file_name))
            .or_insert(0);
    }

    /// Record one occurrence of `address` in `file_name`.
    ///
    /// For log sources the classifier verdict chooses the evidence bucket;
    /// for white and black sources it is ignored.
    pub fn record(
        &mut self,
        category: InputCategory,
        file_name: &str,
        address: &str,
        classification: Option<Classification>,
    ) {
        self.record_seen(category, file_name, address, classification, None);
    }

    /// Like [`record`](Self::record), also noting when the line was logged.
    pub fn record_seen(
        &mut self,
        category: InputCategory,
        file_name: &str,
        address: &str,
        classification: Option<Classification>,
        seen: Option<NaiveDateTime>,
    ) {
        let source = SourceFile::new(category, file_name);
        *self.sources.entry(source.clone()).or_insert(0) += 1;

        self.records
            .entry(RecordKey {
                address: address.to_string(),
                source,
            })
            .or_insert_with(|| AggregateRecord::new(address, category))
            .observe(classification, seen);
    }

    pub fn get(
        &self,
        address: &str,
        category: InputCategory,
        file_name: &str,
    ) -> Option<&AggregateRecord> {
        self.records.get(&RecordKey {
            address: address.to_string(),
            source: SourceFile::new(category, file_name),
        })
    }

    pub fn records(&self) -> impl Iterator<Item = (&RecordKey, &AggregateRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Address occurrence counts (duplicates included) per source.
    pub fn source_counts(&self) -> &BTreeMap<SourceFile, usize> {
        &self.sources
    }

    /// Sources that were read but produced no address at all.
    pub fn empty_sources(&self) -> Vec<&SourceFile> {
        self.sources
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(source, _)| source)
            .collect()
    }

    fn log_records<'a>(&'a self, address: &'a str) -> impl Iterator<Item = &'a AggregateRecord> {
        self.records
            .range(RecordKey::lower_bound(address)..)
            .take_while(move |(key, _)| {
                key.address == address && key.source.category == InputCategory::Log
            })
            .map(|(_, record)| record)
    }

    /// All log records for `address` folded into a single record.
    ///
    /// Returns `Ok(None)` when the address never appeared in a log source.
    pub fn merged(&self, address: &str) -> Result<Option<AggregateRecord>, SiftError> {
        let mut merged: Option<AggregateRecord> = None;
        for record in self.log_records(address) {
            merged = Some(match merged {
                Some(acc) => acc.combine(record)?,
                None => AggregateRecord::new(address, InputCategory::Log).combine(record)?,
            });
        }
        Ok(merged)
    }

    /// Occurrences of `address` summed over every log source.
    pub fn total_occurrences(&self, address: &str) -> usize {
        self.log_records(address).map(|r| r.occurrences).sum()
    }

    /// Distinct addresses per source.
    pub fn address_sets(&self) -> AddressSets {
        let mut sets: BTreeMap<SourceFile, BTreeSet<String>> = self
            .sources
            .keys()
            .map(|source| (source.clone(), BTreeSet::new()))
            .collect();
        for key in self.records.keys() {
            sets.entry(key.source.clone())
                .or_default()
                .insert(key.address.clone());
        }
        AddressSets { sets }
    }

    /// Fold another store into this one, combining records that share a key.
    pub fn absorb(&mut self, other: RecordStore) -> Result<(), SiftError> {
        for (source, count) in other.sources {
            *self.sources.entry(source).or_insert(0) += count;
        }
        for (key, record) in other.records {
            let merged = match self.records.get(&key) {
                Some(ours) => ours.combine(&record)?,
                None => record,
            };
            self.records.insert(key, merged);
        }
        Ok(())
    }
}

/// Distinct addresses observed in each source, derived once after ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSets {
    sets: BTreeMap<SourceFile, BTreeSet<String>>,
}

impl AddressSets {
    pub fn get(&self, source: &SourceFile) -> Option<&BTreeSet<String>> {
        self.sets.get(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceFile, &BTreeSet<String>)> {
        self.sets.iter()
    }

    /// White and black sources with their address sets.
    pub fn known(&self) -> impl Iterator<Item = (&SourceFile, &BTreeSet<String>)> {
        self.sets
            .iter()
            .filter(|(source, _)| source.category.is_known())
    }

    /// Union of every log source's addresses: the initial output candidates.
    pub fn candidate(&self) -> BTreeSet<String> {
        self.sets
            .iter()
            .filter(|(source, _)| source.category == InputCategory::Log)
            .flat_map(|(_, addresses)| addresses.iter().cloned())
            .collect()
    }
}

impl FromIterator<(SourceFile, BTreeSet<String>)> for AddressSets {
    fn from_iter<I: IntoIterator<Item = (SourceFile, BTreeSet<String>)>>(iter: I) -> Self {
        Self {
            sets: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::classifier::LineType;
    use crate::store::types::{Evidence, UNCLASSIFIED};

    fn invalid_user(name: &str) -> Option<Classification> {
        Some(Classification {
            line_type: LineType::InvalidUser,
            fields: Some(vec![name.to_string()]),
        })
    }

    #[test]
    fn test_record_updates_record_and_source() {
        let mut store = RecordStore::new();
        store.record(InputCategory::Log, "auth.log", "1.2.3.4", invalid_user("ro"));
        store.record(InputCategory::Log, "auth.log", "1.2.3.4", None);
        store.record(InputCategory::Black, "black.txt", "1.2.3.4", None);

        let record = store.get("1.2.3.4", InputCategory::Log, "auth.log").unwrap();
        assert_eq!(record.occurrences, 2);
        assert_eq!(record.evidence.get(UNCLASSIFIED), Some(&Evidence::Counter(1)));

        let counts = store.source_counts();
        assert_eq!(counts[&SourceFile::new(InputCategory::Log, "auth.log")], 2);
        assert_eq!(counts[&SourceFile::new(InputCategory::Black, "black.txt")], 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_empty_sources() {
        let mut store = RecordStore::new();
        store.register_source(InputCategory::Log, "quiet.log");
        store.register_source(InputCategory::Log, "busy.log");
        store.record(InputCategory::Log, "busy.log", "1.2.3.4", None);

        let empty = store.empty_sources();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].name, "quiet.log");
    }

    #[test]
    fn test_merged_across_log_files_only() {
        let mut store = RecordStore::new();
        store.record(InputCategory::Log, "a.log", "1.2.3.4", invalid_user("ro"));
        store.record(InputCategory::Log, "b.log", "1.2.3.4", None);
        store.record(InputCategory::Log, "b.log", "1.2.3.40", None);
        store.record(InputCategory::White, "white.txt", "1.2.3.4", None);

        let merged = store.merged("1.2.3.4").unwrap().unwrap();
        assert_eq!(merged.occurrences, 2);
        assert_eq!(merged.evidence.len(), 2);
        assert_eq!(merged.evidence_total(), 2);
        assert_eq!(store.total_occurrences("1.2.3.4"), 2);
        assert_eq!(store.total_occurrences("1.2.3.40"), 1);
        assert!(store.merged("9.9.9.9").unwrap().is_none());
    }

    #[test]
    fn test_address_sets_and_candidate() {
        let mut store = RecordStore::new();
        store.register_source(InputCategory::Log, "empty.log");
        store.record(InputCategory::Log, "a.log", "1.1.1.1", None);
        store.record(InputCategory::Log, "b.log", "2.2.2.2", None);
        store.record(InputCategory::Black, "black.txt", "2.2.2.2", None);
        store.record(InputCategory::Black, "black.txt", "3.3.3.3", None);

        let sets = store.address_sets();
        let candidate: Vec<_> = sets.candidate().into_iter().collect();
        assert_eq!(candidate, vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()]);
        assert_eq!(sets.known().count(), 1);
        assert!(sets
            .get(&SourceFile::new(InputCategory::Log, "empty.log"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_absorb_matches_sequential_ingestion() {
        let mut sequential = RecordStore::new();
        sequential.record(InputCategory::Log, "a.log", "1.2.3.4", invalid_user("ro"));
        sequential.record(InputCategory::Log, "b.log", "1.2.3.4", None);
        sequential.record(InputCategory::Log, "a.log", "1.2.3.4", invalid_user("pi"));

        let mut first = RecordStore::new();
        first.record(InputCategory::Log, "a.log", "1.2.3.4", invalid_user("ro"));
        let mut second = RecordStore::new();
        second.record(InputCategory::Log, "b.log", "1.2.3.4", None);
        second.record(InputCategory::Log, "a.log", "1.2.3.4", invalid_user("pi"));

        first.absorb(second).unwrap();
        assert_eq!(first.source_counts(), sequential.source_counts());
        assert_eq!(
            first.merged("1.2.3.4").unwrap(),
            sequential.merged("1.2.3.4").unwrap()
        );
    }
}
