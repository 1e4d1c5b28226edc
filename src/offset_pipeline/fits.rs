//! FITS container module
//!
//! This module provides reading and writing of single-HDU FITS files:
//! an 80-byte-card header in 2880-byte blocks followed by a big-endian
//! 2D pixel array.

mod header;
mod reader;
mod standard_reader;
mod standard_writer;
mod types;
mod writer;

pub use header::{FitsHeader, FitsValue};
pub use reader::FitsReader;
pub use standard_reader::StandardFitsReader;
pub use standard_writer::StandardFitsWriter;
pub use types::FitsImage;
pub use writer::FitsWriter;
