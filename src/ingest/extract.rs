//! IPv4 address extraction.
//!
//! Matching is deliberately permissive: any dotted quad of 1-3 digit groups
//! is accepted, octets above 255 included.

use crate::store::types::InputCategory;
use regex::Regex;
use std::sync::LazyLock;

static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("ipv4 pattern"));

/// Every dotted-quad literal in `line`, in order of appearance.
pub fn extract_addresses(line: &str) -> Vec<String> {
    IPV4.find_iter(line).map(|m| m.as_str().to_string()).collect()
}

/// Reduce the addresses found on one line to the ones that get recorded.
///
/// A log line carrying more than one address is a reverse-lookup echo; only
/// the second (resolved) address is kept. Known-set lines keep everything.
pub fn addresses_to_record(category: InputCategory, mut addresses: Vec<String>) -> Vec<String> {
    if category == InputCategory::Log && addresses.len() > 1 {
        return vec![addresses.swap_remove(1)];
    }
    addresses
}
