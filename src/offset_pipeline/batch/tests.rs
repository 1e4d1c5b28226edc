use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::offset_pipeline::batch::{
    BatchCorrector, CorrectionConfig, NullObserver, OffsetCorrectionJob, ProgressObserver,
};
use crate::offset_pipeline::common::error::{CorrectionError, Result};
use crate::offset_pipeline::fits::{
    FitsHeader, FitsImage, FitsReader, FitsWriter, StandardFitsReader, StandardFitsWriter,
};

struct CollectingObserver {
    logs: Vec<String>,
    ticks: Vec<(usize, usize)>,
}

impl CollectingObserver {
    fn new() -> Self {
        Self {
            logs: Vec::new(),
            ticks: Vec::new(),
        }
    }
}

impl ProgressObserver for CollectingObserver {
    fn on_log(&mut self, line: &str) {
        self.logs.push(line.to_string());
    }

    fn on_progress(&mut self, current: usize, total: usize) {
        self.ticks.push((current, total));
    }
}

struct MockReader {
    should_fail: bool,
    mock_image: Option<FitsImage>,
}

impl FitsReader for MockReader {
    fn read_fits(&self, _data: &[u8]) -> Result<(FitsImage, FitsHeader)> {
        if self.should_fail {
            return Err(CorrectionError::DecodeError("Mock decode error".to_string()));
        }
        let image = self.mock_image.clone().unwrap_or(FitsImage {
            width: 4,
            height: 4,
            data: vec![10.0; 16],
        });
        Ok((image, FitsHeader::new()))
    }
}

struct MockWriter {
    should_fail: bool,
    written: Arc<Mutex<Vec<(FitsImage, FitsHeader)>>>,
}

impl FitsWriter for MockWriter {
    fn write_fits(
        &self,
        image: &FitsImage,
        header: &FitsHeader,
        _output: &mut dyn std::io::Write,
    ) -> Result<()> {
        if self.should_fail {
            return Err(CorrectionError::EncodeError("Mock encode error".to_string()));
        }
        self.written
            .lock()
            .unwrap()
            .push((image.clone(), header.clone()));
        Ok(())
    }
}

fn write_constant_frame(path: &Path, value: f32, offset: Option<i64>) {
    let image = FitsImage {
        width: 8,
        height: 8,
        data: vec![value; 64],
    };
    let mut header = FitsHeader::new();
    header.set_str("IMAGETYP", "Flat");
    if let Some(offset) = offset {
        header.set_int("OFFSET", offset);
    }
    let mut file = fs::File::create(path).unwrap();
    StandardFitsWriter
        .write_fits(&image, &header, &mut file)
        .unwrap();
}

fn read_back(path: &Path) -> (FitsImage, FitsHeader) {
    let bytes = fs::read(path).unwrap();
    StandardFitsReader.read_fits(&bytes).unwrap()
}

fn dummy_input(dir: &Path) -> PathBuf {
    let path = dir.join("frame.fits");
    fs::write(&path, b"not really a fits file").unwrap();
    path
}

#[test]
fn mock_batch_applies_delta_and_stamps_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = dummy_input(dir.path());
    let output_dir = dir.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    let written = Arc::new(Mutex::new(Vec::new()));
    let corrector = BatchCorrector::with_custom(
        MockReader {
            should_fail: false,
            mock_image: None,
        },
        MockWriter {
            should_fail: false,
            written: written.clone(),
        },
        CorrectionConfig::default(),
    );

    let report = corrector
        .correct_batch(&[input], 0, 5, &output_dir, &mut NullObserver)
        .unwrap();

    assert_eq!(report.frames.len(), 1);
    assert_eq!(report.frames[0].before.mean, 10.0);
    assert_eq!(report.frames[0].after.mean, 15.0);

    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    let (image, header) = &written[0];
    assert!(image.data.iter().all(|&v| v == 15.0));
    assert_eq!(header.get_int("OFFSET"), Some(5));

    let history = header.history().join("");
    assert!(history.contains("Offset adjusted by +5 ADU (from 0 to 5)"));
    assert!(history.contains(" UTC"));
}

#[test]
fn reader_failure_aborts_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dummy_input(dir.path());
    let output_dir = dir.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    let corrector = BatchCorrector::with_custom(
        MockReader {
            should_fail: true,
            mock_image: None,
        },
        MockWriter {
            should_fail: false,
            written: Arc::new(Mutex::new(Vec::new())),
        },
        CorrectionConfig::default(),
    );

    let result = corrector.correct_batch(&[input], 0, 5, &output_dir, &mut NullObserver);
    assert!(matches!(result.unwrap_err(), CorrectionError::DecodeError(_)));
}

#[test]
fn writer_failure_aborts_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dummy_input(dir.path());
    let output_dir = dir.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    let corrector = BatchCorrector::with_custom(
        MockReader {
            should_fail: false,
            mock_image: None,
        },
        MockWriter {
            should_fail: true,
            written: Arc::new(Mutex::new(Vec::new())),
        },
        CorrectionConfig::default(),
    );

    let result = corrector.correct_batch(&[input], 0, 5, &output_dir, &mut NullObserver);
    assert!(matches!(result.unwrap_err(), CorrectionError::EncodeError(_)));
}

#[test]
fn oversized_frame_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dummy_input(dir.path());
    let output_dir = dir.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    let corrector = BatchCorrector::with_custom(
        MockReader {
            should_fail: false,
            mock_image: Some(FitsImage {
                width: 100,
                height: 100,
                data: vec![0.0; 10_000],
            }),
        },
        MockWriter {
            should_fail: false,
            written: Arc::new(Mutex::new(Vec::new())),
        },
        CorrectionConfig::builder().max_dimension(Some(50)).build(),
    );

    let result = corrector.correct_batch(&[input], 0, 5, &output_dir, &mut NullObserver);
    assert!(matches!(
        result.unwrap_err(),
        CorrectionError::InvalidDimensions(100, 100)
    ));
}

#[test]
fn end_to_end_batch_matches_expected_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    write_constant_frame(&input_dir.join("flat_1.fits"), 100.0, None);
    write_constant_frame(&input_dir.join("flat_2.fits"), 200.0, None);
    write_constant_frame(&input_dir.join("flat_3.fits"), 300.0, None);

    let job = OffsetCorrectionJob {
        input_dir,
        output_dir: output_dir.clone(),
        source_offset: Some(0),
        target_offset: 42,
    };

    let mut observer = CollectingObserver::new();
    let corrector = BatchCorrector::new(CorrectionConfig::default());
    let report = corrector.run(&job, &mut observer).unwrap();

    assert_eq!(report.frames.len(), 3);
    let means_after: Vec<f64> = report.frames.iter().map(|f| f.after.mean).collect();
    assert_eq!(means_after, vec![142.0, 242.0, 342.0]);
    assert!(report.frames.iter().all(|f| f.after.std_dev == 0.0));

    assert_eq!(report.summary.mean.mean_before, 200.0);
    assert_eq!(report.summary.mean.mean_after, 242.0);
    assert_eq!(report.summary.mean.min_before, 100.0);
    assert_eq!(report.summary.mean.max_before, 300.0);
    assert_eq!(report.summary.mean.min_after, 142.0);
    assert_eq!(report.summary.mean.max_after, 342.0);

    // Corrected copies land under the output directory with the same names.
    let (image, header) = read_back(&output_dir.join("flat_1.fits"));
    assert!(image.data.iter().all(|&v| v == 142.0));
    assert_eq!(header.get_int("OFFSET"), Some(42));
    assert_eq!(header.get_str("IMAGETYP"), Some("Flat"));
    assert!(
        header
            .history()
            .join("")
            .contains("Offset adjusted by +42 ADU (from 0 to 42)")
    );

    assert!(observer.logs[0].contains("Processing 3 files..."));
    assert!(observer.logs.iter().any(|l| l.contains("[1/3] flat_1.fits:")));
    assert!(observer.logs.iter().any(|l| l.contains("Mean   : 100.0 → 142.0")));
    assert!(
        observer
            .logs
            .iter()
            .any(|l| l.contains("Median : 200.0 → 242.0"))
    );
    assert_eq!(observer.ticks, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn source_offset_is_detected_from_first_frame() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    // Sorted first; carries the baseline the whole batch uses.
    write_constant_frame(&input_dir.join("a.fits"), 100.0, Some(10));
    write_constant_frame(&input_dir.join("b.fits"), 100.0, None);

    let job = OffsetCorrectionJob {
        input_dir,
        output_dir: output_dir.clone(),
        source_offset: None,
        target_offset: 42,
    };

    let corrector = BatchCorrector::new(CorrectionConfig::default());
    let report = corrector.run(&job, &mut NullObserver).unwrap();

    // delta = 42 - 10, applied uniformly even to the frame without OFFSET.
    assert!(report.frames.iter().all(|f| f.after.mean == 132.0));

    let (_, header) = read_back(&output_dir.join("b.fits"));
    assert_eq!(header.get_int("OFFSET"), Some(42));
    assert!(
        header
            .history()
            .join("")
            .contains("Offset adjusted by +32 ADU (from 10 to 42)")
    );
}

#[test]
fn unreadable_probe_warns_then_decode_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    fs::create_dir(&input_dir).unwrap();
    fs::write(input_dir.join("bad.fits"), vec![0u8; 4096]).unwrap();

    let job = OffsetCorrectionJob {
        input_dir,
        output_dir: dir.path().join("out"),
        source_offset: None,
        target_offset: 42,
    };

    let mut observer = CollectingObserver::new();
    let corrector = BatchCorrector::new(CorrectionConfig::default());
    let result = corrector.run(&job, &mut observer);

    assert!(matches!(result.unwrap_err(), CorrectionError::DecodeError(_)));
    assert!(
        observer
            .logs
            .iter()
            .any(|l| l.contains("Warning: Could not read OFFSET"))
    );
}

#[test]
fn empty_input_fails_without_output_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    fs::write(input_dir.join("notes.txt"), b"no frames here").unwrap();

    let job = OffsetCorrectionJob {
        input_dir,
        output_dir: output_dir.clone(),
        source_offset: None,
        target_offset: 42,
    };

    let corrector = BatchCorrector::new(CorrectionConfig::default());
    let result = corrector.run(&job, &mut NullObserver);

    assert!(matches!(result.unwrap_err(), CorrectionError::NoFilesFound(_)));
    assert!(!output_dir.exists());
}

#[test]
fn rerun_is_byte_identical_outside_history_cards() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    write_constant_frame(&input_dir.join("flat.fits"), 7.0, Some(3));

    let job = OffsetCorrectionJob {
        input_dir,
        output_dir: output_dir.clone(),
        source_offset: None,
        target_offset: 42,
    };

    let corrector = BatchCorrector::new(CorrectionConfig::default());
    corrector.run(&job, &mut NullObserver).unwrap();
    let first = fs::read(output_dir.join("flat.fits")).unwrap();

    corrector.run(&job, &mut NullObserver).unwrap();
    let second = fs::read(output_dir.join("flat.fits")).unwrap();

    assert_eq!(first.len(), second.len());
    for (offset, (a, b)) in first.iter().zip(&second).enumerate() {
        if a != b {
            // Only the provenance timestamp may drift between runs.
            let card_start = offset - offset % 80;
            assert_eq!(
                &first[card_start..card_start + 8],
                b"HISTORY ",
                "unexpected difference at byte {offset}"
            );
        }
    }
}
