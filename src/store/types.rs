//! Data structures for per-address evidence.
//!
//! An [`AggregateRecord`] holds everything observed about one address in one
//! source file. Records for the same address are folded together with
//! [`combine`], which is commutative and associative so that the final
//! report does not depend on the order in which files were read.

use crate::error::SiftError;
use crate::ingest::classifier::Classification;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Evidence label used for occurrences on lines the classifier did not recognise.
pub const UNCLASSIFIED: &str = "unclassified";

/// The role a source plays in the run.
///
/// Log sources contribute classified evidence. White and black sources are
/// "known" sets: only the presence of an address matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputCategory {
    Log,
    White,
    Black,
}

impl InputCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// White and black sources are known sets.
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Log)
    }
}

impl fmt::Display for InputCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named input source of a given category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceFile {
    pub category: InputCategory,
    pub name: String,
}

impl SourceFile {
    pub fn new(category: InputCategory, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (type '{}')", self.name, self.category)
    }
}

/// One evidence bucket.
///
/// Events without captured fields are counted; events with captured fields
/// keep every field group so they can be listed in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Evidence {
    Counter(usize),
    Entries(Vec<Vec<String>>),
}

impl Evidence {
    /// Number of occurrences this bucket accounts for.
    pub fn size(&self) -> usize {
        match self {
            Self::Counter(n) => *n,
            Self::Entries(entries) => entries.len(),
        }
    }

    fn combine(&self, other: &Self, label: &str) -> Result<Self, SiftError> {
        match (self, other) {
            (Self::Counter(a), Self::Counter(b)) => Ok(Self::Counter(a + b)),
            (Self::Entries(a), Self::Entries(b)) => {
                let mut entries = Vec::with_capacity(a.len() + b.len());
                entries.extend(a.iter().cloned());
                entries.extend(b.iter().cloned());
                Ok(Self::Entries(entries))
            }
            _ => Err(SiftError::MismatchedEvidence {
                label: label.to_string(),
            }),
        }
    }
}

/// Everything observed about one address in one category (and, inside the
/// record store, one source file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRecord {
    pub address: String,
    pub category: InputCategory,
    pub occurrences: usize,
    pub evidence: BTreeMap<String, Evidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<NaiveDateTime>,
}

impl AggregateRecord {
    pub fn new(address: impl Into<String>, category: InputCategory) -> Self {
        Self {
            address: address.into(),
            category,
            occurrences: 0,
            evidence: BTreeMap::new(),
            first_seen: None,
            last_seen: None,
        }
    }

    /// Count one occurrence.
    ///
    /// For log records the classifier verdict selects the evidence bucket; a
    /// missing verdict lands in [`UNCLASSIFIED`]. Known-set records only count.
    pub fn observe(&mut self, classification: Option<Classification>, seen: Option<NaiveDateTime>) {
        self.occurrences += 1;
        self.note_seen(seen);

        if self.category.is_known() {
            return;
        }

        let (label, fields) = match classification {
            Some(c) => (c.line_type.as_str().to_string(), c.fields),
            None => (UNCLASSIFIED.to_string(), None),
        };

        match fields {
            None => {
                let bucket = self.evidence.entry(label).or_insert(Evidence::Counter(0));
                match bucket {
                    Evidence::Counter(n) => *n += 1,
                    Evidence::Entries(entries) => entries.push(Vec::new()),
                }
            }
            Some(fields) => {
                let bucket = self
                    .evidence
                    .entry(label)
                    .or_insert_with(|| Evidence::Entries(Vec::new()));
                match bucket {
                    Evidence::Entries(entries) => entries.push(fields),
                    Evidence::Counter(n) => *n += 1,
                }
            }
        }
    }

    fn note_seen(&mut self, seen: Option<NaiveDateTime>) {
        self.first_seen = earliest(self.first_seen, seen);
        self.last_seen = latest(self.last_seen, seen);
    }

    /// Sum of all evidence bucket sizes.
    pub fn evidence_total(&self) -> usize {
        self.evidence.values().map(Evidence::size).sum()
    }

    /// For log records, every occurrence is accounted for by exactly one bucket.
    pub fn is_balanced(&self) -> bool {
        self.category.is_known() || self.evidence_total() == self.occurrences
    }

    /// Merge two records for the same address and category into a new record.
    pub fn combine(&self, other: &Self) -> Result<Self, SiftError> {
        if self.address != other.address {
            return Err(SiftError::MismatchedAddress {
                left: self.address.clone(),
                right: other.address.clone(),
            });
        }
        if self.category != other.category {
            return Err(SiftError::MismatchedCategory {
                left: self.category,
                right: other.category,
            });
        }

        let mut evidence = self.evidence.clone();
        for (label, theirs) in &other.evidence {
            let merged = match evidence.get(label) {
                Some(ours) => ours.combine(theirs, label)?,
                None => theirs.clone(),
            };
            evidence.insert(label.clone(), merged);
        }
        // Merged entry lists are sorted so the result is independent of operand order.
        for bucket in evidence.values_mut() {
            if let Evidence::Entries(entries) = bucket {
                entries.sort();
            }
        }

        Ok(Self {
            address: self.address.clone(),
            category: self.category,
            occurrences: self.occurrences + other.occurrences,
            evidence,
            first_seen: earliest(self.first_seen, other.first_seen),
            last_seen: latest(self.last_seen, other.last_seen),
        })
    }
}

/// Free-function form of [`AggregateRecord::combine`].
pub fn combine(a: &AggregateRecord, b: &AggregateRecord) -> Result<AggregateRecord, SiftError> {
    a.combine(b)
}

fn earliest(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn latest(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}
