//! Forensic STR peak calling and contamination screening.
//!
//! This library turns raw capillary-electrophoresis peak calls (GeneMapper
//! genotype exports) into a filtered set of primary peaks per STR marker,
//! and flags markers whose peak pattern suggests a mixed sample rather than
//! a single contributor.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **config**: dye channels, height cutoffs, and the marker panel
//! - **data**: core data structures and GeneMapper TSV ingestion
//! - **call**: primary peak selection (dye-aware thresholding)
//! - **contamination**: main-profile vs. contamination clustering
//! - **pipeline**: per-sample orchestration and parallel batch analysis
//! - **report**: per-sample JSON result shaping
//!
//! # Example
//!
//! ```no_run
//! use faster_str::prelude::*;
//!
//! let config = AnalysisConfig::default();
//! let records = read_genemapper_tsv("genotypes.tsv").unwrap();
//!
//! for analysis in analyze_batch(records, &config) {
//!     let report = SampleReport::build(&analysis, &config);
//!     report.save("results/").unwrap();
//! }
//! ```

pub mod call;
pub mod config;
pub mod contamination;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::call::{call_peaks, select_primary_peaks, RELATIVE_HEIGHT_FLOOR};
    pub use crate::config::{AnalysisConfig, Dye, DyeCutoffs, HeightBounds, MarkerInfo};
    pub use crate::contamination::{
        classify_contamination, ContaminationResult, MAX_RELATIVE_DISTANCE,
        MIN_RELATIVE_DISTANCE,
    };
    pub use crate::data::{
        group_by_sample, read_genemapper_tsv, Peak, PrimaryPeakSet, RawPeakRecord,
    };
    pub use crate::error::{Result, StrError};
    pub use crate::pipeline::{analyze_batch, analyze_sample, MarkerCall, SampleAnalysis};
    pub use crate::report::SampleReport;
}
