use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use fits_offset_rs::logger;
use fits_offset_rs::offset_pipeline::{
    BatchCorrector, CorrectionConfig, OffsetCorrectionJob, ProgressObserver,
};

/// Batch-correct the OFFSET baked into a folder of FITS frames.
#[derive(Parser)]
#[command(name = "fits-offset")]
#[command(version, about = "Batch OFFSET correction for FITS frames", long_about = None)]
struct Cli {
    /// Input folder holding .fits/.fit frames
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// Output folder for the corrected copies
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Target offset in ADU
    #[arg(short, long, value_name = "ADU")]
    target: i64,

    /// Source offset in ADU; read from the first frame's header when omitted
    #[arg(short, long, value_name = "ADU")]
    source: Option<i64>,
}

struct ConsoleObserver;

impl ProgressObserver for ConsoleObserver {
    fn on_log(&mut self, line: &str) {
        println!("{line}");
    }

    fn on_progress(&mut self, current: usize, total: usize) {
        tracing::debug!("Progress: {current}/{total}");
    }
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let cli = Cli::parse();

    info!("Starting fits-offset...");

    let job = OffsetCorrectionJob {
        input_dir: cli.input,
        output_dir: cli.output,
        source_offset: cli.source,
        target_offset: cli.target,
    };

    let corrector = BatchCorrector::new(CorrectionConfig::default());
    let report = corrector
        .run(&job, &mut ConsoleObserver)
        .context("batch correction failed")?;

    info!("Processed {} files", report.frames.len());
    Ok(())
}
