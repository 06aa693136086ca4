//! Analysis configuration: dye channels, height cutoffs, and the marker panel.
//!
//! Configuration is loaded once, before any per-sample processing, and passed
//! into the pipeline as an immutable value. A malformed or missing
//! configuration file is the one fatal condition in the crate; everything
//! downstream degrades gracefully instead of erroring.

use crate::error::{Result, StrError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Fluorescent dye channels supported by the assay.
///
/// Cutoff lookup branches on this closed set; codes outside it fall through
/// to the single fallback cutoff record in [`DyeCutoffs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dye {
    Blue,
    Green,
    Yellow,
    Red,
    Purple,
}

impl Dye {
    /// Parse a single-letter channel code. Returns `None` for unknown codes.
    pub fn from_code(code: &str) -> Option<Dye> {
        match code {
            "B" => Some(Dye::Blue),
            "G" => Some(Dye::Green),
            "Y" => Some(Dye::Yellow),
            "R" => Some(Dye::Red),
            "P" => Some(Dye::Purple),
            _ => None,
        }
    }

}

/// Inclusive height bounds for one dye channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightBounds {
    pub min: f64,
    pub max: f64,
}

/// Per-channel height cutoffs with a single fallback for unknown channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DyeCutoffs {
    pub blue: HeightBounds,
    pub green: HeightBounds,
    pub yellow: HeightBounds,
    pub red: HeightBounds,
    pub purple: HeightBounds,
    /// Applied when the dye code is absent from the supported set.
    pub fallback: HeightBounds,
}

/// Default maximum height applied when a configuration does not override it.
pub const DEFAULT_MAX_HEIGHT: f64 = 50_000.0;

/// Minimum height of the fallback cutoff record.
pub const DEFAULT_MIN_HEIGHT: f64 = 1_000.0;

impl Default for DyeCutoffs {
    fn default() -> Self {
        DyeCutoffs {
            blue: HeightBounds { min: 2_500.0, max: DEFAULT_MAX_HEIGHT },
            green: HeightBounds { min: 5_000.0, max: DEFAULT_MAX_HEIGHT },
            yellow: HeightBounds { min: 9_000.0, max: DEFAULT_MAX_HEIGHT },
            red: HeightBounds { min: 1_000.0, max: DEFAULT_MAX_HEIGHT },
            purple: HeightBounds { min: 1_000.0, max: DEFAULT_MAX_HEIGHT },
            fallback: HeightBounds { min: DEFAULT_MIN_HEIGHT, max: DEFAULT_MAX_HEIGHT },
        }
    }
}

impl DyeCutoffs {
    /// Resolve the bounds for a channel, falling back for unknown channels.
    pub fn bounds(&self, dye: Option<Dye>) -> HeightBounds {
        match dye {
            Some(Dye::Blue) => self.blue,
            Some(Dye::Green) => self.green,
            Some(Dye::Yellow) => self.yellow,
            Some(Dye::Red) => self.red,
            Some(Dye::Purple) => self.purple,
            None => self.fallback,
        }
    }
}

/// Reference annotation for one STR marker, used only to decorate reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerInfo {
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub motif: String,
}

/// Immutable analysis configuration shared by both pipeline stages.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub dye_cutoffs: DyeCutoffs,
    pub markers: HashMap<String, MarkerInfo>,
    /// Panel order; markers are called and reported in this order.
    pub marker_order: Vec<String>,
}

/// On-disk configuration layout (`marker_info.json`).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    dye_cutoffs: HashMap<String, HeightBounds>,
    markers: HashMap<String, MarkerInfo>,
    marker_order: Vec<String>,
}

impl AnalysisConfig {
    /// Load configuration from a JSON file.
    ///
    /// Every dye channel may be overridden individually; channels absent
    /// from the file keep their built-in defaults. An empty marker panel is
    /// rejected.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig> {
        let file = File::open(path.as_ref())?;
        let raw: ConfigFile = serde_json::from_reader(BufReader::new(file))?;

        if raw.marker_order.is_empty() {
            return Err(StrError::Config(
                "marker_order must list at least one marker".to_string(),
            ));
        }
        for (code, bounds) in &raw.dye_cutoffs {
            if bounds.min < 0.0 || bounds.max < bounds.min {
                return Err(StrError::InvalidParameter(format!(
                    "cutoffs for dye '{}': min {} max {}",
                    code, bounds.min, bounds.max
                )));
            }
        }

        let mut cutoffs = DyeCutoffs::default();
        for (code, bounds) in &raw.dye_cutoffs {
            match Dye::from_code(code) {
                Some(Dye::Blue) => cutoffs.blue = *bounds,
                Some(Dye::Green) => cutoffs.green = *bounds,
                Some(Dye::Yellow) => cutoffs.yellow = *bounds,
                Some(Dye::Red) => cutoffs.red = *bounds,
                Some(Dye::Purple) => cutoffs.purple = *bounds,
                None => {
                    return Err(StrError::Config(format!(
                        "unknown dye channel '{}' in dye_cutoffs",
                        code
                    )))
                }
            }
        }

        Ok(AnalysisConfig {
            dye_cutoffs: cutoffs,
            markers: raw.markers,
            marker_order: raw.marker_order,
        })
    }

    /// Replace the fallback maximum height (CLI `--max-height`).
    pub fn with_max_height(mut self, max_height: f64) -> AnalysisConfig {
        self.dye_cutoffs.fallback.max = max_height;
        self
    }

    /// Chromosome position key for a marker (`{chr}_{start}_{end}`), or
    /// `unknown_position` for markers missing from the reference table.
    pub fn variant_key(&self, marker: &str) -> String {
        match self.markers.get(marker) {
            Some(info) => format!("{}_{}_{}", info.chr, info.start, info.end),
            None => "unknown_position".to_string(),
        }
    }

    /// Repeat motif for a marker, defaulting for unannotated markers.
    pub fn motif(&self, marker: &str) -> String {
        self.markers
            .get(marker)
            .map(|info| info.motif.clone())
            .unwrap_or_else(|| "[ATCT]*".to_string())
    }
}

impl Default for AnalysisConfig {
    /// Built-in configuration: the 22-marker forensic panel with hg38
    /// coordinates and the validated per-dye cutoffs.
    fn default() -> Self {
        let table: [(&str, &str, u64, u64, &str); 22] = [
            ("CSF1PO", "chr5", 150_076_323, 150_076_375, "[ATCT]*"),
            ("D10S1248", "chr10", 129_294_243, 129_294_295, "[GGAA]*"),
            ("D12S391", "chr12", 12_297_019, 12_297_095, "[AGAT]+[AGAC]+AGAT"),
            ("D13S317", "chr13", 82_148_024, 82_148_068, "[TATC]*"),
            ("D16S539", "chr16", 86_352_701, 86_352_745, "[GATA]*"),
            ("D18S51", "chr18", 63_281_666, 63_281_738, "[AGAA]*"),
            ("D19S433", "chr19", 29_926_234, 29_926_298, "[CCTT]*cctaCCTTctttCCTT"),
            ("D1S1656", "chr1", 230_769_615, 230_769_683, "CCTA[TCTA]*"),
            (
                "D21S11",
                "chr21",
                19_181_972,
                19_182_099,
                "[TCTA]+[TCTG]+[TCTA]+ta[TCTA]+tca[TCTA]+tccata[TCTA]+",
            ),
            ("D22S1045", "chr22", 37_140_286, 37_140_337, "[ATT]+ACT[ATT]+"),
            ("D2S1338", "chr2", 218_014_858, 218_014_950, "[GGAA]+GGAC[GGAA]+[GGCA]+"),
            ("D2S441", "chr2", 68_011_947, 68_011_994, "[TCTA]*"),
            ("D3S1358", "chr3", 45_540_738, 45_540_802, "TCTATCTG[TCTA]*"),
            ("D5S818", "chr5", 123_775_555, 123_775_599, "[ATCT]*"),
            ("D7S820", "chr7", 84_160_225, 84_160_277, "[TATC]*"),
            ("D8S1179", "chr8", 124_894_864, 124_894_916, "TCTATCTG[TCTA]*"),
            (
                "FGA",
                "chr4",
                154_587_735,
                154_587_823,
                "[GGAA]+GGAG[AAAG]+AGAAAAAA[GAAA]+",
            ),
            ("SE33", "chr6", 88_277_143, 88_277_245, "[CTTT]+TT[CTTT]+"),
            ("TH01", "chr11", 2_171_087, 2_171_115, "[AATG]*"),
            ("TPOX", "chr2", 1_489_652, 1_489_684, "[AATG]*"),
            ("vWA", "chr12", 5_983_976, 5_984_044, "[TAGA]*[CAGA]*TAGA"),
            ("AMEL", "chrX", 11_293_412, 11_300_761, "null"),
        ];

        let mut markers = HashMap::new();
        let mut marker_order = Vec::with_capacity(table.len());
        for (name, chr, start, end, motif) in table {
            marker_order.push(name.to_string());
            markers.insert(
                name.to_string(),
                MarkerInfo {
                    chr: chr.to_string(),
                    start,
                    end,
                    motif: motif.to_string(),
                },
            );
        }

        AnalysisConfig {
            dye_cutoffs: DyeCutoffs::default(),
            markers,
            marker_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_dye_codes() {
        assert_eq!(Dye::from_code("B"), Some(Dye::Blue));
        assert_eq!(Dye::from_code("G"), Some(Dye::Green));
        assert_eq!(Dye::from_code("Y"), Some(Dye::Yellow));
        assert_eq!(Dye::from_code("R"), Some(Dye::Red));
        assert_eq!(Dye::from_code("P"), Some(Dye::Purple));
        assert_eq!(Dye::from_code("X"), None);
        assert_eq!(Dye::from_code(""), None);
    }

    #[test]
    fn test_default_cutoffs() {
        let cutoffs = DyeCutoffs::default();
        assert_eq!(cutoffs.bounds(Some(Dye::Blue)).min, 2_500.0);
        assert_eq!(cutoffs.bounds(Some(Dye::Yellow)).min, 9_000.0);
        // Unknown channels resolve to the fallback record.
        let fallback = cutoffs.bounds(None);
        assert_eq!(fallback.min, 1_000.0);
        assert_eq!(fallback.max, 50_000.0);
    }

    #[test]
    fn test_default_panel() {
        let config = AnalysisConfig::default();
        assert_eq!(config.marker_order.len(), 22);
        assert_eq!(config.variant_key("TH01"), "chr11_2171087_2171115");
        assert_eq!(config.variant_key("NOT_A_MARKER"), "unknown_position");
        assert_eq!(config.motif("TPOX"), "[AATG]*");
        assert_eq!(config.motif("NOT_A_MARKER"), "[ATCT]*");
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "dye_cutoffs": {{"B": {{"min": 3000, "max": 40000}}}},
                "markers": {{
                    "TH01": {{"chr": "chr11", "start": 2171087, "end": 2171115, "motif": "[AATG]*"}}
                }},
                "marker_order": ["TH01"]
            }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.dye_cutoffs.blue.min, 3_000.0);
        assert_eq!(config.dye_cutoffs.blue.max, 40_000.0);
        // Channels not listed keep defaults.
        assert_eq!(config.dye_cutoffs.green.min, 5_000.0);
        assert_eq!(config.marker_order, vec!["TH01".to_string()]);
    }

    #[test]
    fn test_from_file_rejects_bad_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "dye_cutoffs": {{"Q": {{"min": 1000, "max": 50000}}}},
                "markers": {{}},
                "marker_order": ["TH01"]
            }}"#
        )
        .unwrap();
        file.flush().unwrap();
        assert!(AnalysisConfig::from_file(file.path()).is_err());

        let mut empty_panel = NamedTempFile::new().unwrap();
        write!(
            empty_panel,
            r#"{{"dye_cutoffs": {{}}, "markers": {{}}, "marker_order": []}}"#
        )
        .unwrap();
        empty_panel.flush().unwrap();
        assert!(AnalysisConfig::from_file(empty_panel.path()).is_err());

        assert!(AnalysisConfig::from_file("/nonexistent/marker_info.json").is_err());
    }

    #[test]
    fn test_with_max_height() {
        let config = AnalysisConfig::default().with_max_height(30_000.0);
        assert_eq!(config.dye_cutoffs.fallback.max, 30_000.0);
    }
}
