//! # LogSift
//!
//! Aggregate the IPv4 addresses found in sshd and fail2ban logs, drop the
//! ones already listed in white or black lists, and report what is left
//! as a block-list candidate.
//!
//! ## Overview
//!
//! Every address found in an input line becomes an aggregate record keyed
//! by the address and the source it came from. Records from log sources
//! carry per-category evidence (which kind of sshd or fail2ban line, and
//! with which user name or port); records from white and black sources
//! only count occurrences. The reconciler intersects the candidate
//! addresses with each known list, removes the overlap and explains it.
//! The remaining addresses are ordered by address or by frequency and
//! rendered at one of three report levels.
//!
//! ## Features
//!
//! - **Line classification** for 14 sshd and fail2ban line types
//! - **Reconciliation** against any number of white and black lists
//! - **Parallel ingestion** of multiple sources
//! - **Compressed input** - `.gz` and `.zst` files are read directly
//! - **Demographics** - optional country/city lookup per address
//! - **Export** of the final block-list as JSON or CSV
//! - **Shell completion** for bash, zsh, fish, powershell, and elvish
//!
//! ## Architecture
//!
//! - [`store`] - aggregate records, evidence merging and the record store
//! - [`ingest`] - address extraction, line classification and timestamps
//! - [`reconcile`] - removal of white/black listed addresses with explanation
//! - [`report`] - address ordering, record rendering, report assembly, export
//! - [`geo`] - demographic lookups over HTTP
//! - [`commands`] - command implementations
//! - [`utils`] - source reading, log discovery, parallel ingestion, progress
//!
//! ## Example Usage
//!
//! ```bash
//! # Addresses seen in the auth log, sorted by address
//! logsift report -i /var/log/auth.log
//!
//! # All logs under /var/log, skipping known addresses, with full details
//! logsift report -l /var/log -w trusted.txt -b blocked.txt -rr
//!
//! # Most frequent offenders first, exported for a firewall script
//! logsift report -l /var/log -b blocked.txt -f --export new-blocks.csv
//!
//! # Compressed rotations work directly
//! logsift report -i auth.log.2.gz -i auth.log.3.zst
//! ```
//!
//! ## Library Usage
//!
//! ```
//! use logsift::ingest::ingest_lines;
//! use logsift::store::{InputCategory, RecordStore};
//!
//! let mut store = RecordStore::new();
//! ingest_lines(
//!     &mut store,
//!     InputCategory::Log,
//!     "auth.log",
//!     ["Dec 22 22:18:07 host sshd[1]: Invalid user ro from 61.174.51.214"],
//!     2013,
//! );
//! assert_eq!(store.total_occurrences("61.174.51.214"), 1);
//! ```

pub mod commands;
pub mod error;
pub mod geo;
pub mod ingest;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod utils;
