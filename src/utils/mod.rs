//! Utility functions and helpers.
//!
//! - [`reader`] - source reader with automatic decompression and stdin support
//! - [`discover`] - `--logdir` log file discovery
//! - [`parallel`] - parallel per-source ingestion
//! - [`progress`] - progress bar over input sources
//! - [`format`] - number formatting for run summaries
//!
//! # Examples
//!
//! ```no_run
//! use logsift::store::InputCategory;
//! use logsift::utils::parallel::{ingest_sources, SourceSpec};
//! use logsift::utils::progress::ProgressBar;
//!
//! let sources = vec![
//!     SourceSpec::new(InputCategory::Log, "/var/log/auth.log"),
//!     SourceSpec::new(InputCategory::Black, "/etc/iptables/blocked.txt"),
//! ];
//! let outcome = ingest_sources(&sources, 2024, &ProgressBar::hidden()).unwrap();
//! println!("{} records", outcome.store.len());
//! ```

pub mod discover;
pub mod format;
pub mod parallel;
pub mod progress;
pub mod reader;
