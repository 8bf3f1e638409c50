//! Per-address detail view.
//!
//! Level 0 shows the address alone, level 1 adds the merged occurrence
//! count, level 2 adds every evidence bucket (labels in alphabetical order)
//! with its captured field groups. The demographic line is independent of
//! the level.

use crate::error::SiftError;
use crate::geo::{DemographicLookup, Lookup};
use crate::ingest::timestamp::format_seen;
use crate::store::{AggregateRecord, Evidence, InputCategory, RecordStore};

/// Marker rendered when a demographic lookup failed.
pub const DEMOGRAPHICS_UNAVAILABLE: &str = "demographics unavailable";

/// How much to say about each address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReportLevel {
    #[default]
    Addresses,
    Counts,
    Details,
}

impl ReportLevel {
    /// From the number of `-r` flags; anything above 2 is treated as 2.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Addresses,
            1 => Self::Counts,
            _ => Self::Details,
        }
    }
}

/// Renders detail views out of a finished record store.
pub struct Renderer<'a> {
    store: &'a RecordStore,
    level: ReportLevel,
    demographics: Option<&'a dyn DemographicLookup>,
}

impl<'a> Renderer<'a> {
    pub fn new(store: &'a RecordStore, level: ReportLevel) -> Self {
        Self {
            store,
            level,
            demographics: None,
        }
    }

    /// Append a demographic line to every entry.
    #[must_use]
    pub fn with_demographics(mut self, lookup: &'a dyn DemographicLookup) -> Self {
        self.demographics = Some(lookup);
        self
    }

    pub fn level(&self) -> ReportLevel {
        self.level
    }

    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    /// True when entries carry more than the bare address.
    pub fn wants_detail(&self) -> bool {
        self.level > ReportLevel::Addresses || self.demographics.is_some()
    }

    /// Render one address from its merged log record.
    pub fn render(&self, address: &str) -> Result<String, SiftError> {
        let record = self
            .store
            .merged(address)?
            .unwrap_or_else(|| AggregateRecord::new(address, InputCategory::Log));
        Ok(self.render_record(&record))
    }

    pub fn render_record(&self, record: &AggregateRecord) -> String {
        let mut out = match self.level {
            ReportLevel::Addresses => format!("{:^16}", record.address),
            _ => format!("{:^16}  {:^5}", record.address, record.occurrences),
        }
        .trim_end()
        .to_string();
        out.push('\n');

        if let Some(lookup) = self.demographics {
            match lookup.lookup(&record.address) {
                Lookup::Found(d) => out.push_str(&format!("\t{}  {}\n", d.country, d.city)),
                Lookup::Unavailable => out.push_str(&format!("\t{}\n", DEMOGRAPHICS_UNAVAILABLE)),
            }
        }

        if self.level == ReportLevel::Details {
            for (label, evidence) in &record.evidence {
                out.push_str(&format!("{:>33}:  {}\n", label, evidence.size()));
                if let Evidence::Entries(entries) = evidence {
                    for entry in entries {
                        out.push_str(&format!("{:>51}\n", entry.join(" ")));
                    }
                }
            }
            if let (Some(first), Some(last)) = (record.first_seen, record.last_seen) {
                out.push_str(&format!(
                    "{:>33}:  {} .. {}\n",
                    "seen",
                    format_seen(&first),
                    format_seen(&last)
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Demographic, DemographicTable};
    use crate::ingest::ingest_lines;

    fn sample_store() -> RecordStore {
        let mut store = RecordStore::new();
        ingest_lines(
            &mut store,
            InputCategory::Log,
            "auth.log",
            [
                "Dec 22 22:18:07 localhost sshd[17238]: Invalid user ro from 133.242.167.91",
                "Dec 22 22:18:08 localhost sshd[17238]: Invalid user admin from 133.242.167.91",
                "Dec 22 22:18:09 localhost sshd[17238]: Received disconnect from 133.242.167.91: 11: Bye",
            ],
            2013,
        );
        store
    }

    #[test]
    fn test_level_zero_is_address_only() {
        let store = sample_store();
        let renderer = Renderer::new(&store, ReportLevel::Addresses);
        assert_eq!(renderer.render("133.242.167.91").unwrap(), " 133.242.167.91\n");
        assert!(!renderer.wants_detail());
    }

    #[test]
    fn test_level_one_adds_count() {
        let store = sample_store();
        let renderer = Renderer::new(&store, ReportLevel::Counts);
        let text = renderer.render("133.242.167.91").unwrap();
        assert_eq!(text, " 133.242.167.91     3\n");
        assert!(renderer.wants_detail());
    }

    #[test]
    fn test_level_two_lists_evidence() {
        let store = sample_store();
        let renderer = Renderer::new(&store, ReportLevel::Details);
        let text = renderer.render("133.242.167.91").unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1].trim(), "invalid_user:  2");
        assert_eq!(lines[2].trim(), "admin");
        assert_eq!(lines[3].trim(), "ro");
        assert_eq!(lines[4].trim(), "received_disconnect:  1");
        assert_eq!(lines[5].trim(), "seen:  2013-12-22 22:18:07 .. 2013-12-22 22:18:09");
        assert!(lines[2].starts_with("                "));
    }

    #[test]
    fn test_demographic_line() {
        let store = sample_store();
        let mut table = DemographicTable::new();
        table.insert(
            "133.242.167.91",
            Lookup::Found(Demographic {
                country: "Japan".to_string(),
                city: "Tokyo".to_string(),
                latitude: 35.69,
                longitude: 139.69,
            }),
        );

        let renderer = Renderer::new(&store, ReportLevel::Addresses).with_demographics(&table);
        assert_eq!(
            renderer.render("133.242.167.91").unwrap(),
            " 133.242.167.91\n\tJapan  Tokyo\n"
        );

        let empty = DemographicTable::new();
        let renderer = Renderer::new(&store, ReportLevel::Addresses).with_demographics(&empty);
        assert!(renderer
            .render("133.242.167.91")
            .unwrap()
            .contains(DEMOGRAPHICS_UNAVAILABLE));
    }

    #[test]
    fn test_report_level_from_count() {
        assert_eq!(ReportLevel::from_count(0), ReportLevel::Addresses);
        assert_eq!(ReportLevel::from_count(1), ReportLevel::Counts);
        assert_eq!(ReportLevel::from_count(2), ReportLevel::Details);
        assert_eq!(ReportLevel::from_count(7), ReportLevel::Details);
    }
}
