//! Batch offset correction
//!
//! The central routine: for each discovered frame, load pixel data and
//! header, measure, apply the uniform delta, stamp provenance, write the
//! corrected copy, and accumulate statistics. Processing is sequential;
//! a read or write failure aborts the remaining batch.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::offset_pipeline::batch::config::CorrectionConfig;
use crate::offset_pipeline::batch::progress::ProgressObserver;
use crate::offset_pipeline::batch::report::format_summary;
use crate::offset_pipeline::common::error::{CorrectionError, Result};
use crate::offset_pipeline::discovery::discover_frames;
use crate::offset_pipeline::fits::{
    FitsImage, FitsReader, FitsWriter, StandardFitsReader, StandardFitsWriter,
};
use crate::offset_pipeline::offset::probe_source_offset;
use crate::offset_pipeline::stats::{BatchSummary, FrameStatistics};

/// Parameters of one correction job.
///
/// The delta applied to every frame is `target_offset - source_offset`,
/// computed once; it does not vary per frame even if individual frames
/// carry different original offsets.
#[derive(Debug, Clone)]
pub struct OffsetCorrectionJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Baseline offset; None auto-detects from the first discovered frame.
    pub source_offset: Option<i64>,
    pub target_offset: i64,
}

/// Record of one corrected frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub before: FrameStatistics,
    pub after: FrameStatistics,
}

/// Result of a completed batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub frames: Vec<FrameReport>,
    pub summary: BatchSummary,
}

pub struct BatchCorrector<R: FitsReader, W: FitsWriter> {
    reader: R,
    writer: W,
    config: CorrectionConfig,
}

impl BatchCorrector<StandardFitsReader, StandardFitsWriter> {
    pub fn new(config: CorrectionConfig) -> Self {
        Self {
            reader: StandardFitsReader,
            writer: StandardFitsWriter,
            config,
        }
    }
}

impl<R: FitsReader, W: FitsWriter> BatchCorrector<R, W> {
    pub fn with_custom(reader: R, writer: W, config: CorrectionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    /// Runs a whole job: discovery, source-offset resolution, output
    /// directory creation, then the correction loop.
    ///
    /// The output directory is only created once discovery has succeeded,
    /// so an empty input directory leaves no side effects.
    #[instrument(skip(self, job, observer), fields(input = %job.input_dir.display()))]
    pub fn run(
        &self,
        job: &OffsetCorrectionJob,
        observer: &mut dyn ProgressObserver,
    ) -> Result<BatchReport> {
        let frames = discover_frames(&job.input_dir)?;

        let source_offset = match job.source_offset {
            Some(value) => value,
            None => {
                let reading = probe_source_offset(&frames[0]);
                if let Some(warning) = reading.warning() {
                    observer.on_log(&format!("Warning: {warning}"));
                }
                reading.value()
            }
        };

        fs::create_dir_all(&job.output_dir).map_err(|e| {
            CorrectionError::OutputWriteError(format!("{}: {}", job.output_dir.display(), e))
        })?;

        self.correct_batch(
            &frames,
            source_offset,
            job.target_offset,
            &job.output_dir,
            observer,
        )
    }

    /// Corrects every frame in order, emitting one log record and one
    /// progress tick per frame through the observer.
    pub fn correct_batch(
        &self,
        frames: &[PathBuf],
        source_offset: i64,
        target_offset: i64,
        output_dir: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<BatchReport> {
        let total = frames.len();
        let delta = target_offset - source_offset;

        info!(
            total,
            source_offset, target_offset, delta, "Starting batch correction"
        );
        observer.on_log(&format!("Processing {total} files..."));
        observer.on_log(&format!(
            "Offset correction: {source_offset} → {target_offset} (Δ={delta})"
        ));
        observer.on_log("");

        let mut reports = Vec::with_capacity(total);
        for (index, path) in frames.iter().enumerate() {
            let report =
                self.correct_frame(path, delta, source_offset, target_offset, output_dir)?;

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            observer.on_log(&format!("[{}/{}] {}:", index + 1, total, name));
            observer.on_log(&format!(
                "   Median : {:.1} → {:.1}",
                report.before.median, report.after.median
            ));
            observer.on_log(&format!(
                "   Mean   : {:.1} → {:.1}",
                report.before.mean, report.after.mean
            ));
            observer.on_log(&format!(
                "   StdDev : {:.1} → {:.1}",
                report.before.std_dev, report.after.std_dev
            ));
            observer.on_log(&format!("   Saved to: {}", report.output.display()));
            observer.on_log("");
            observer.on_progress(index + 1, total);

            reports.push(report);
        }

        let stats: Vec<_> = reports.iter().map(|r| (r.before, r.after)).collect();
        let summary = BatchSummary::from_stats(&stats);
        for line in format_summary(&summary) {
            observer.on_log(&line);
        }

        info!(total, "Batch correction complete");
        Ok(BatchReport {
            frames: reports,
            summary,
        })
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(CorrectionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!(
                    "Image dimensions {}x{} exceed maximum {}",
                    width, height, max
                );
                return Err(CorrectionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    fn correct_frame(
        &self,
        path: &Path,
        delta: i64,
        source_offset: i64,
        target_offset: i64,
        output_dir: &Path,
    ) -> Result<FrameReport> {
        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            fs::read(path).map_err(|e| {
                CorrectionError::InputReadError(format!("{}: {}", path.display(), e))
            })?
        };

        let (image, mut header) = {
            let _span = tracing::info_span!("decode_fits").entered();
            self.reader.read_fits(&input_data)?
        };
        self.validate_dimensions(image.width, image.height)?;

        let before = FrameStatistics::compute(&image.data);

        let corrected = FitsImage {
            width: image.width,
            height: image.height,
            data: image.data.iter().map(|&v| v + delta as f32).collect(),
        };
        let after = FrameStatistics::compute(&corrected.data);

        header.set_int("OFFSET", target_offset);
        let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%S");
        header.add_history(format!(
            "Offset adjusted by {delta:+} ADU (from {source_offset} to {target_offset}) on {stamp} UTC"
        ));

        let file_name = path.file_name().ok_or_else(|| {
            CorrectionError::InputReadError(format!("{}: no file name", path.display()))
        })?;
        let output_path = output_dir.join(file_name);

        {
            let _span = tracing::info_span!("encode_fits").entered();
            let mut output_file = fs::File::create(&output_path).map_err(|e| {
                CorrectionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
            self.writer.write_fits(&corrected, &header, &mut output_file)?;
        }

        Ok(FrameReport {
            input: path.to_path_buf(),
            output: output_path,
            before,
            after,
        })
    }
}
