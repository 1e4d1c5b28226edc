use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorrectionError {
    #[error("No FITS files found in {0}")]
    NoFilesFound(PathBuf),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode FITS file: {0}")]
    DecodeError(String),

    #[error("Failed to encode FITS file: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CorrectionError>;
