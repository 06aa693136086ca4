//! GeneMapper TSV ingestion.
//!
//! Reads the tab-separated genotype export produced by the instrument
//! software and normalizes each row into a [`RawPeakRecord`]. Rows without
//! marker information are dropped; numeric fields that fail to parse are
//! carried as missing rather than rejected, so one malformed row never
//! aborts a batch.

use crate::data::RawPeakRecord;
use crate::error::{Result, StrError};
use csv::ReaderBuilder;
use std::path::Path;

/// Required columns of a GeneMapper genotype export.
const SAMPLE_COL: &str = "Sample File Name";
const MARKER_COL: &str = "Marker";
const ALLELE_COL: &str = "Allele";
const SIZE_COL: &str = "Size";
const HEIGHT_COL: &str = "Height";
const DYE_COL: &str = "Dye/Sample Peak";

/// Read all peak rows from a GeneMapper export.
///
/// Rows with an empty `Marker` field are discarded. Off-ladder rows are
/// kept here and filtered during primary selection.
pub fn read_genemapper_tsv<P: AsRef<Path>>(path: P) -> Result<Vec<RawPeakRecord>> {
    // Quoting off: exports are plain TSV, and stray quote characters in the
    // dye field must reach `normalize_dye` verbatim.
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_path(path.as_ref())?;

    let headers = reader.headers()?.clone();
    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| StrError::MissingColumn(name.to_string()))
    };
    let sample_idx = col(SAMPLE_COL)?;
    let marker_idx = col(MARKER_COL)?;
    let allele_idx = col(ALLELE_COL)?;
    let size_idx = col(SIZE_COL)?;
    let height_idx = col(HEIGHT_COL)?;
    let dye_idx = col(DYE_COL)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |idx: usize| row.get(idx).unwrap_or("").trim();

        let marker = field(marker_idx);
        if marker.is_empty() {
            continue;
        }

        records.push(RawPeakRecord {
            sample_id: field(sample_idx).to_string(),
            marker: marker.to_string(),
            dye: normalize_dye(field(dye_idx)),
            allele: field(allele_idx).to_string(),
            size: parse_lenient(field(size_idx)),
            height: parse_lenient(field(height_idx)),
        });
    }

    Ok(records)
}

/// Extract the channel code from a `Dye/Sample Peak` field.
///
/// The field reads like `B,12` (code, peak number); exports sometimes carry
/// a stray leading quote on the code.
fn normalize_dye(field: &str) -> String {
    let code = field.split(',').next().unwrap_or("");
    code.trim().trim_start_matches('"').to_string()
}

/// Parse a numeric export field, treating anything non-numeric as missing.
fn parse_lenient(field: &str) -> Option<f64> {
    let value: f64 = field.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Group records by sample, preserving first-appearance order of samples.
pub fn group_by_sample(records: Vec<RawPeakRecord>) -> Vec<(String, Vec<RawPeakRecord>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: std::collections::HashMap<String, Vec<RawPeakRecord>> =
        std::collections::HashMap::new();

    for record in records {
        if !groups.contains_key(&record.sample_id) {
            order.push(record.sample_id.clone());
        }
        groups.entry(record.sample_id.clone()).or_default().push(record);
    }

    order
        .into_iter()
        .map(|sample| {
            let rows = groups.remove(&sample).unwrap_or_default();
            (sample, rows)
        })
        .collect()
}

/// Restrict one sample's rows to a single marker, preserving row order.
pub fn rows_for_marker<'a>(rows: &'a [RawPeakRecord], marker: &str) -> Vec<&'a RawPeakRecord> {
    rows.iter().filter(|r| r.marker == marker).collect()
}
