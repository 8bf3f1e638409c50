//! Timestamp normalisation for the two supported log styles.
//!
//! - syslog: `Dec 22 22:18:07 host sshd[..]: ...` (no year; the caller supplies one)
//! - fail2ban: `2013-12-30 01:17:43,514 fail2ban.actions: ...`
//!
//! A line without a recognisable timestamp yields `None`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static FAIL2BAN_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})(?:,(\d{1,3}))?").expect("fail2ban timestamp")
});

static SYSLOG_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][a-z]{2})\s+(\d{1,2})\s+(\d{2}:\d{2}:\d{2})\b").expect("syslog timestamp")
});

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_number(abbrev: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(abbrev))
        .map(|i| i as u32 + 1)
}

fn parse_fail2ban(line: &str) -> Option<NaiveDateTime> {
    let caps = FAIL2BAN_PREFIX.captures(line)?;
    let base = NaiveDateTime::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d %H:%M:%S").ok()?;
    // ",5" is half a second.
    let millis = caps
        .get(2)
        .and_then(|m| format!("{:0<3}", m.as_str()).parse::<i64>().ok())
        .unwrap_or(0);
    Some(base + Duration::milliseconds(millis))
}

fn parse_syslog(line: &str, year_for: impl FnOnce(u32) -> i32) -> Option<NaiveDateTime> {
    let caps = SYSLOG_PREFIX.captures(line)?;
    let month = month_number(&caps[1])?;
    let stamp = format!("{} {} {} {}", year_for(month), month, &caps[2], &caps[3]);
    NaiveDateTime::parse_from_str(&stamp, "%Y %m %d %H:%M:%S").ok()
}

/// Parse the leading timestamp of a single line.
///
/// `year` fills in the year missing from syslog-style stamps.
pub fn parse(line: &str, year: i32) -> Option<NaiveDateTime> {
    parse_fail2ban(line).or_else(|| parse_syslog(line, |_| year))
}

/// Year bookkeeping for the syslog stamps of one source, read in order.
///
/// A month earlier than the previous line's month means the log crossed
/// New Year. With a reference date, a first stamp in a month after the
/// reference month belongs to the previous year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceClock {
    year: i32,
    reference_month: Option<u32>,
    last_month: Option<u32>,
}

impl SourceClock {
    /// The first syslog stamp is taken to be in `year`.
    pub fn starting(year: i32) -> Self {
        Self {
            year,
            reference_month: None,
            last_month: None,
        }
    }

    /// Stamps are placed no later than `today`'s month.
    pub fn relative_to(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            reference_month: Some(today.month()),
            last_month: None,
        }
    }

    fn year_for(&mut self, month: u32) -> i32 {
        match self.last_month {
            None => {
                if self.reference_month.is_some_and(|reference| month > reference) {
                    self.year -= 1;
                }
            }
            Some(last) if month < last => self.year += 1,
            Some(_) => {}
        }
        self.last_month = Some(month);
        self.year
    }

    /// Parse the leading timestamp of the next line of the source.
    pub fn stamp(&mut self, line: &str) -> Option<NaiveDateTime> {
        parse_fail2ban(line).or_else(|| parse_syslog(line, |month| self.year_for(month)))
    }
}

impl From<i32> for SourceClock {
    fn from(year: i32) -> Self {
        Self::starting(year)
    }
}

/// Display form used in reports.
pub fn format_seen(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
