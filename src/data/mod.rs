//! Core data structures and GeneMapper ingestion.

mod peak;
mod reader;

pub use peak::{round2, Peak, PrimaryPeakSet, RawPeakRecord, OFF_LADDER};
pub use reader::{group_by_sample, read_genemapper_tsv, rows_for_marker};
