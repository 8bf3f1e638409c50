//! Canonical address keys and the two report orderings.
//!
//! Addresses are compared through a zero-padded form (`9.9.9.9` ->
//! `009.009.009.009`) so plain string comparison gives numeric dotted-quad
//! order. Strings that cannot be canonicalised are never given a key; they
//! are set aside and reported on their own.

use crate::error::SiftError;
use std::fmt;

/// Zero-padded, totally ordered form of a dotted-quad address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalAddress(String);

impl CanonicalAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pad each of the four octets to three digits.
///
/// Anything other than exactly four groups of 1-3 ASCII digits, or a
/// multi-digit group with a leading zero, is a
/// [`SiftError::MalformedAddress`]. Octet values are not range checked.
pub fn canonicalize(address: &str) -> Result<CanonicalAddress, SiftError> {
    let malformed = || SiftError::MalformedAddress {
        address: address.to_string(),
    };

    let octets: Vec<&str> = address.split('.').collect();
    if octets.len() != 4 {
        return Err(malformed());
    }

    let mut padded = Vec::with_capacity(4);
    for octet in octets {
        if octet.is_empty() || octet.len() > 3 || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        // "01" would pad to the same key as "1".
        if octet.len() > 1 && octet.starts_with('0') {
            return Err(malformed());
        }
        padded.push(format!("{:0>3}", octet));
    }
    Ok(CanonicalAddress(padded.join(".")))
}

/// Strip the padding again.
pub fn decanonicalize(canonical: &CanonicalAddress) -> String {
    canonical
        .0
        .split('.')
        .map(|octet| {
            let trimmed = octet.trim_start_matches('0');
            if trimmed.is_empty() {
                "0"
            } else {
                trimmed
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Which total order the report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending canonical address.
    #[default]
    Address,
    /// Descending occurrence count, ties by ascending canonical address.
    Frequency,
}

/// Result of ordering a set of addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordered {
    pub addresses: Vec<String>,
    /// Inputs that failed canonicalisation, sorted as plain strings.
    pub malformed: Vec<String>,
}

fn partition<'a, I>(addresses: I) -> (Vec<(CanonicalAddress, String)>, Vec<String>)
where
    I: IntoIterator<Item = &'a String>,
{
    let mut keyed = Vec::new();
    let mut malformed = Vec::new();
    for address in addresses {
        match canonicalize(address) {
            Ok(key) => keyed.push((key, address.clone())),
            Err(_) => malformed.push(address.clone()),
        }
    }
    malformed.sort();
    malformed.dedup();
    (keyed, malformed)
}

/// Sort by canonical address, ascending.
pub fn sort_by_address<'a, I>(addresses: I) -> Ordered
where
    I: IntoIterator<Item = &'a String>,
{
    let (mut keyed, malformed) = partition(addresses);
    keyed.sort();
    Ordered {
        addresses: keyed.into_iter().map(|(_, address)| address).collect(),
        malformed,
    }
}

/// Sort by `frequency` descending, ties by canonical address ascending.
pub fn sort_by_frequency<'a, I, F>(addresses: I, frequency: F) -> Ordered
where
    I: IntoIterator<Item = &'a String>,
    F: Fn(&str) -> usize,
{
    let (keyed, malformed) = partition(addresses);
    let mut ranked: Vec<(usize, CanonicalAddress, String)> = keyed
        .into_iter()
        .map(|(key, address)| (frequency(&address), key, address))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ordered {
        addresses: ranked.into_iter().map(|(_, _, address)| address).collect(),
        malformed,
    }
}

/// Dispatch on [`SortOrder`].
pub fn order_addresses<'a, I, F>(addresses: I, order: SortOrder, frequency: F) -> Ordered
where
    I: IntoIterator<Item = &'a String>,
    F: Fn(&str) -> usize,
{
    match order {
        SortOrder::Address => sort_by_address(addresses),
        SortOrder::Frequency => sort_by_frequency(addresses, frequency),
    }
}
