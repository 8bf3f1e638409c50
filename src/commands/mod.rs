//! Command implementations.
//!
//! - [`report`] - sift log, white and black sources into an ordered
//!   block-list report, optionally exported as JSON or CSV
//!
//! Shell completion generation lives in the binary since it only needs the
//! clap command definition.

pub mod report;
