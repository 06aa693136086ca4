//! Per-sample result shaping and JSON output.
//!
//! Turns a [`SampleAnalysis`] into the persisted report schema: per-locus
//! peak statistics and genotype, per-locus contamination detail, and a
//! sample-level contamination summary. One JSON file is written per sample,
//! named `{SampleId}.STR_analysis.json`.

use crate::config::{AnalysisConfig, Dye, HeightBounds};
use crate::contamination::ContaminationResult;
use crate::data::round2;
use crate::error::Result;
use crate::pipeline::SampleAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Full report for one sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleReport {
    #[serde(rename = "LocusResults")]
    pub locus_results: BTreeMap<String, LocusResult>,
    #[serde(rename = "SampleParameters")]
    pub sample_parameters: SampleParameters,
    #[serde(rename = "SampleContamination")]
    pub sample_contamination: ContaminationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleParameters {
    #[serde(rename = "SampleId")]
    pub sample_id: String,
    pub analysis_date: String,
}

/// Results for one marker of one sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocusResult {
    pub allele_count: usize,
    pub median_height: Option<f64>,
    pub dye: String,
    pub std_height: Option<f64>,
    pub height_limits: HeightBounds,
    /// Keyed by chromosome position (`{chr}_{start}_{end}`).
    pub variants: BTreeMap<String, VariantInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantInfo {
    /// Top-two alleles by height, lexically sorted and `/`-joined.
    pub genotype: String,
    pub allele_count: usize,
    pub motif: String,
    pub peaks: Vec<ReportPeak>,
    pub contamination: Option<ContaminationResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPeak {
    pub allele: String,
    pub height: f64,
    pub size: f64,
}

/// Sample-level contamination summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminationSummary {
    /// Percentage of valid markers flagged, 1 decimal.
    pub contamination_rate: f64,
    pub contaminated_markers: Vec<ContaminatedMarker>,
    pub total_valid_markers: usize,
    pub total_contaminated_markers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminatedMarker {
    pub marker: String,
    /// Main-profile alleles, `/`-joined in descending height order.
    pub main_profile: String,
    /// Contamination alleles formatted `allele(rel%)`, comma-joined.
    pub contamination_peaks: String,
    pub relative_distance: f64,
}

impl SampleReport {
    /// Shape one sample's analysis into the report schema.
    pub fn build(analysis: &SampleAnalysis, config: &AnalysisConfig) -> SampleReport {
        let analysis_date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        Self::build_at(analysis, config, analysis_date)
    }

    /// As [`build`](Self::build), with the timestamp supplied by the caller.
    pub fn build_at(
        analysis: &SampleAnalysis,
        config: &AnalysisConfig,
        analysis_date: String,
    ) -> SampleReport {
        let mut locus_results = BTreeMap::new();
        let mut contaminated_markers = Vec::new();

        for call in &analysis.calls {
            if call.peaks.is_empty() {
                continue;
            }
            let peaks = call.peaks.peaks();
            let heights = call.peaks.heights();

            let genotype = {
                let mut top: Vec<&str> =
                    peaks.iter().take(2).map(|p| p.allele.as_str()).collect();
                top.sort_unstable();
                top.join("/")
            };

            if let Some(contamination) = &call.contamination {
                contaminated_markers.push(ContaminatedMarker {
                    marker: call.marker.clone(),
                    main_profile: contamination
                        .main_profile_peaks
                        .iter()
                        .map(|p| p.allele.as_str())
                        .collect::<Vec<_>>()
                        .join("/"),
                    contamination_peaks: contamination
                        .contamination_peaks
                        .iter()
                        .map(|p| format!("{}({:.1}%)", p.allele, p.relative_height))
                        .collect::<Vec<_>>()
                        .join(", "),
                    relative_distance: contamination.relative_distance,
                });
            }

            let variant = VariantInfo {
                genotype,
                allele_count: peaks.len(),
                motif: config.motif(&call.marker),
                peaks: peaks
                    .iter()
                    .map(|p| ReportPeak {
                        allele: p.allele.clone(),
                        height: p.height,
                        size: round2(p.size),
                    })
                    .collect(),
                contamination: call.contamination.clone(),
            };

            let mut variants = BTreeMap::new();
            variants.insert(config.variant_key(&call.marker), variant);

            locus_results.insert(
                call.marker.clone(),
                LocusResult {
                    allele_count: peaks.len(),
                    median_height: median(&heights),
                    dye: call.peaks.dye.clone(),
                    std_height: population_std(&heights),
                    height_limits: config
                        .dye_cutoffs
                        .bounds(Dye::from_code(&call.peaks.dye)),
                    variants,
                },
            );
        }

        let total_valid_markers = locus_results.len();
        let total_contaminated_markers = contaminated_markers.len();
        let contamination_rate = if total_valid_markers > 0 {
            round1(total_contaminated_markers as f64 / total_valid_markers as f64 * 100.0)
        } else {
            0.0
        };

        SampleReport {
            locus_results,
            sample_parameters: SampleParameters {
                sample_id: clean_sample_name(&analysis.sample_id),
                analysis_date,
            },
            sample_contamination: ContaminationSummary {
                contamination_rate,
                contaminated_markers,
                total_valid_markers,
                total_contaminated_markers,
            },
        }
    }

    /// The on-disk file name for this report.
    pub fn file_name(&self) -> String {
        format!("{}.STR_analysis.json", self.sample_parameters.sample_id)
    }

    /// Write the report as pretty-printed JSON into `dir`.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let path = dir.as_ref().join(self.file_name());
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Strip the instrument suffix (`_AC…`) and file extension from a sample
/// file name.
pub fn clean_sample_name(name: &str) -> String {
    let stem = name.split("_AC").next().unwrap_or(name);
    stem.split('.').next().unwrap_or(stem).to_string()
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Population standard deviation; `None` below two values.
fn population_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some(variance.sqrt())
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
