//! Per-address evidence model and the record store that accumulates it.
//!
//! - [`types`] - input categories, evidence buckets, aggregate records and `combine`
//! - [`record_store`] - the address x category x source map and derived address sets

pub mod record_store;
pub mod types;

pub use record_store::{AddressSets, RecordKey, RecordStore};
pub use types::{combine, AggregateRecord, Evidence, InputCategory, SourceFile, UNCLASSIFIED};
