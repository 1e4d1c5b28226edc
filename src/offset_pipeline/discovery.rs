//! FITS frame discovery
//!
//! Produces the ordered work list that drives the batch corrector.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::offset_pipeline::common::error::{CorrectionError, Result};

/// Recognized filename suffixes. Matching is case-sensitive.
const FITS_SUFFIXES: [&str; 2] = [".fits", ".fit"];

/// Lists the FITS frames directly inside `dir`, sorted ascending by
/// filename. Does not recurse into subdirectories.
///
/// Returns `CorrectionError::NoFilesFound` when no frame matches, so a
/// caller never starts a batch over an empty work list.
pub fn discover_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if FITS_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            frames.push(path);
        }
    }
    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if frames.is_empty() {
        return Err(CorrectionError::NoFilesFound(dir.to_path_buf()));
    }

    debug!("Discovered {} FITS frames in {}", frames.len(), dir.display());
    Ok(frames)
}
