//! End-to-end tests: GeneMapper TSV in, per-sample JSON reports out.

use faster_str::prelude::*;
use faster_str::report::clean_sample_name;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// A small export covering a clean sample, a contaminated marker, noise
/// below the cutoffs, off-ladder rows, and a negative control.
fn write_fixture() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Sample File Name\tMarker\tAllele\tSize\tHeight\tDye/Sample Peak"
    )
    .unwrap();

    let rows = [
        // case1: TH01 clean heterozygote on the blue channel.
        ("case1_AC22041.fsa", "TH01", "6", "180.11", "8000", "B,1"),
        ("case1_AC22041.fsa", "TH01", "9.3", "195.40", "7600", "B,2"),
        // case1: TH01 noise below the blue minimum, plus an off-ladder call.
        ("case1_AC22041.fsa", "TH01", "7", "184.02", "600", "B,3"),
        ("case1_AC22041.fsa", "TH01", "OL", "188.57", "9500", "\"B,4"),
        // case1: TPOX carries a third, weak allele on the red channel.
        ("case1_AC22041.fsa", "TPOX", "8", "222.33", "9000", "R,1"),
        ("case1_AC22041.fsa", "TPOX", "11", "234.70", "8500", "R,2"),
        ("case1_AC22041.fsa", "TPOX", "9", "226.51", "1200", "R,3"),
        // case1: D3S1358 entirely below the blue minimum cutoff.
        ("case1_AC22041.fsa", "D3S1358", "15", "120.00", "900", "B,5"),
        // case1: unparseable height is treated as missing, not an error.
        ("case1_AC22041.fsa", "vWA", "17", "170.00", "NA", "Y,1"),
        // Negative control: signal above the maximum cutoff is still kept.
        ("NEG_CTRL_AC9.fsa", "TH01", "6", "180.15", "60000", "B,1"),
        ("NEG_CTRL_AC9.fsa", "TH01", "7", "184.44", "55000", "B,2"),
    ];
    for (sample, marker, allele, size, height, dye) in rows {
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t{}\t{}",
            sample, marker, allele, size, height, dye
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_full_pipeline_from_export() {
    let file = write_fixture();
    let config = AnalysisConfig::default();

    let records = read_genemapper_tsv(file.path()).unwrap();
    let analyses = analyze_batch(records, &config);
    assert_eq!(analyses.len(), 2);

    // --- case1 ---
    let case1 = &analyses[0];
    assert_eq!(case1.sample_id, "case1_AC22041.fsa");
    // D3S1358 (all noise) and vWA (missing height) are omitted entirely.
    let markers: Vec<&str> = case1.calls.iter().map(|c| c.marker.as_str()).collect();
    assert_eq!(markers, vec!["TH01", "TPOX"]);

    let th01 = &case1.calls[0];
    assert_eq!(th01.peaks.len(), 2);
    assert_eq!(th01.peaks.peaks()[0].relative_height, 100.0);
    assert_eq!(th01.peaks.peaks()[1].relative_height, 95.0);
    assert!(th01.contamination.is_none());

    let tpox = &case1.calls[1];
    assert_eq!(tpox.peaks.len(), 3);
    let contamination = tpox.contamination.as_ref().unwrap();
    assert_eq!(contamination.main_profile_peaks.len(), 2);
    assert_eq!(contamination.contamination_peaks[0].allele, "9");
    assert_eq!(contamination.relative_distance, 0.14);

    // --- negative control ---
    let neg = &analyses[1];
    let th01 = &neg.calls[0];
    assert_eq!(th01.peaks.len(), 2, "negative control keeps over-max peaks");
    assert_eq!(th01.peaks.max_height(), Some(60_000.0));
}

#[test]
fn test_reports_on_disk() {
    let file = write_fixture();
    let config = AnalysisConfig::default();
    let records = read_genemapper_tsv(file.path()).unwrap();

    let out = tempdir().unwrap();
    for analysis in analyze_batch(records, &config) {
        SampleReport::build(&analysis, &config).save(out.path()).unwrap();
    }

    let case1_path = out.path().join("case1.STR_analysis.json");
    let neg_path = out.path().join("NEG_CTRL.STR_analysis.json");
    assert!(case1_path.exists());
    assert!(neg_path.exists());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&case1_path).unwrap()).unwrap();

    assert_eq!(value["SampleParameters"]["SampleId"], "case1");
    assert_eq!(value["SampleContamination"]["total_valid_markers"], 2);
    assert_eq!(value["SampleContamination"]["total_contaminated_markers"], 1);
    assert_eq!(value["SampleContamination"]["contamination_rate"], 50.0);

    let tpox = &value["LocusResults"]["TPOX"];
    assert_eq!(tpox["dye"], "R");
    assert_eq!(tpox["allele_count"], 3);
    let variant = &tpox["variants"]["chr2_1489652_1489684"];
    assert_eq!(variant["genotype"], "11/8");
    assert_eq!(variant["motif"], "[AATG]*");
    assert_eq!(variant["contamination"]["relative_distance"], 0.14);

    let th01 = &value["LocusResults"]["TH01"];
    assert_eq!(th01["variants"]["chr11_2171087_2171115"]["contamination"], serde_json::Value::Null);
}

#[test]
fn test_batch_results_are_reproducible() {
    let file = write_fixture();
    let config = AnalysisConfig::default();

    let records = read_genemapper_tsv(file.path()).unwrap();
    let first = analyze_batch(records.clone(), &config);
    for _ in 0..5 {
        assert_eq!(analyze_batch(records.clone(), &config), first);
    }

    // Shaped reports are byte-identical too, once the timestamp is pinned.
    let date = "2026-08-29 12:00:00".to_string();
    let render = |analyses: &[SampleAnalysis]| -> String {
        analyses
            .iter()
            .map(|a| {
                serde_json::to_string(&SampleReport::build_at(a, &config, date.clone())).unwrap()
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let again = analyze_batch(records, &config);
    assert_eq!(render(&first), render(&again));
}

#[test]
fn test_sample_name_cleaning_matches_file_naming() {
    assert_eq!(clean_sample_name("case1_AC22041.fsa"), "case1");
    assert_eq!(clean_sample_name("NEG_CTRL_AC9.fsa"), "NEG_CTRL");
}
