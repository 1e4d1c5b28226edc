//! Header offset probe
//!
//! Reads the integer OFFSET field from a frame's header to establish the
//! batch's source offset. A failed probe is a warning, never an error:
//! the job proceeds with a zero baseline.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::offset_pipeline::fits::StandardFitsReader;

const OFFSET_KEYWORD: &str = "OFFSET";

/// Outcome of probing a frame for its baked-in offset.
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetReading {
    /// The header carries the field.
    Present(i64),
    /// The field is absent; the baseline defaults to 0.
    Missing,
    /// The file or header could not be read; the baseline defaults to 0.
    Unreadable(String),
}

impl OffsetReading {
    /// The source offset to use for the batch.
    pub fn value(&self) -> i64 {
        match self {
            OffsetReading::Present(value) => *value,
            OffsetReading::Missing | OffsetReading::Unreadable(_) => 0,
        }
    }

    /// A user-visible warning for the unreadable case.
    pub fn warning(&self) -> Option<String> {
        match self {
            OffsetReading::Unreadable(reason) => {
                Some(format!("Could not read OFFSET: {reason}"))
            }
            _ => None,
        }
    }
}

/// Probes `path` for the integer OFFSET header field.
///
/// Only the header is parsed, so a frame with a corrupt data section can
/// still report its offset.
pub fn probe_source_offset(path: &Path) -> OffsetReading {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Offset probe failed to read {}: {}", path.display(), e);
            return OffsetReading::Unreadable(format!("{}: {}", path.display(), e));
        }
    };

    match StandardFitsReader.read_header(&bytes) {
        Ok(header) => match header.get_int(OFFSET_KEYWORD) {
            Some(value) => OffsetReading::Present(value),
            None => OffsetReading::Missing,
        },
        Err(e) => {
            warn!("Offset probe failed to parse {}: {}", path.display(), e);
            OffsetReading::Unreadable(e.to_string())
        }
    }
}
