//! faster - Forensic STR analysis CLI
//!
//! Reads a GeneMapper genotype export, calls primary peaks and screens for
//! contamination per marker, and writes one JSON report per sample.

use clap::Parser;
use faster_str::config::AnalysisConfig;
use faster_str::data::read_genemapper_tsv;
use faster_str::error::Result;
use faster_str::pipeline::analyze_batch;
use faster_str::report::SampleReport;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

/// Forensic analysis of STR capillary electrophoresis results
#[derive(Parser)]
#[command(name = "faster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input genotype export (tab-separated)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for per-sample JSON reports
    #[arg(short, long)]
    output: PathBuf,

    /// Marker configuration file (JSON); built-in panel when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum peak height cutoff for unconfigured dye channels
    #[arg(long, default_value_t = 50_000.0)]
    max_height: f64,
}

fn run(cli: Cli) -> Result<()> {
    // Configuration problems are fatal, before any per-sample work starts.
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    }
    .with_max_height(cli.max_height);

    std::fs::create_dir_all(&cli.output)?;

    let records = read_genemapper_tsv(&cli.input)?;
    info!("read {} peak rows from {}", records.len(), cli.input.display());

    let analyses = analyze_batch(records, &config);
    for analysis in &analyses {
        let report = SampleReport::build(analysis, &config);
        report.save(&cli.output)?;

        let contaminated = analysis.contaminated_markers();
        info!(
            "processed sample {}: {} markers called, {} contaminated",
            analysis.sample_id,
            analysis.calls.len(),
            contaminated.len()
        );
        if !contaminated.is_empty() {
            info!("  contaminated markers: {}", contaminated.join(", "));
        }
        println!("Processed sample: {}", analysis.sample_id);
    }

    println!("Results saved to: {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
