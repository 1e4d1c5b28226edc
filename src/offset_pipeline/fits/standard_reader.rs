//! FITS reader implementation for single-HDU files.
//!
//! Parses the primary header card stream and decodes the pixel array from
//! any standard BITPIX type into `f32`, applying BSCALE/BZERO calibration
//! so downstream code always sees physical values.

use tracing::debug;

use crate::offset_pipeline::common::error::{CorrectionError, Result};
use crate::offset_pipeline::fits::header::{
    BLOCK_LEN, CARD_LEN, FitsHeader, FitsValue, is_structural, parse_value,
};
use crate::offset_pipeline::fits::reader::FitsReader;
use crate::offset_pipeline::fits::types::FitsImage;

pub struct StandardFitsReader;

/// Structural keywords consumed during the header walk.
struct PrimaryInfo {
    bitpix: Option<i64>,
    naxis: Option<i64>,
    naxis1: Option<i64>,
    naxis2: Option<i64>,
    bscale: f64,
    bzero: f64,
    data_start: usize,
}

impl StandardFitsReader {
    /// Parses the header only, stopping at END.
    ///
    /// A file with a corrupt or truncated data section can still be probed
    /// for metadata this way.
    pub fn read_header(&self, data: &[u8]) -> Result<FitsHeader> {
        let (header, _) = parse_primary(data)?;
        Ok(header)
    }
}

impl FitsReader for StandardFitsReader {
    fn read_fits(&self, data: &[u8]) -> Result<(FitsImage, FitsHeader)> {
        let (header, info) = parse_primary(data)?;

        let bitpix = info
            .bitpix
            .ok_or_else(|| CorrectionError::DecodeError("missing keyword BITPIX".to_string()))?;
        let naxis = info
            .naxis
            .ok_or_else(|| CorrectionError::DecodeError("missing keyword NAXIS".to_string()))?;
        if naxis != 2 {
            return Err(CorrectionError::DecodeError(format!(
                "expected a 2-dimensional primary array, got NAXIS = {naxis}"
            )));
        }
        let width = axis_len(info.naxis1, "NAXIS1")?;
        let height = axis_len(info.naxis2, "NAXIS2")?;

        let npixels = width.checked_mul(height).ok_or_else(|| {
            CorrectionError::DecodeError(format!("image dimensions overflow: {width}x{height}"))
        })?;
        let bpp = bytes_per_pixel(bitpix)?;
        let data_len = npixels * bpp;

        let end = info.data_start + data_len;
        if end > data.len() {
            return Err(CorrectionError::DecodeError(format!(
                "truncated pixel data: need {data_len} bytes, found {}",
                data.len().saturating_sub(info.data_start)
            )));
        }
        let raw = &data[info.data_start..end];

        let scale = info.bscale;
        let zero = info.bzero;
        let physical = |v: f64| (v * scale + zero) as f32;

        let pixels: Vec<f32> = match bitpix {
            8 => raw.iter().map(|&v| physical(v as f64)).collect(),
            16 => raw
                .chunks_exact(2)
                .map(|c| physical(i16::from_be_bytes([c[0], c[1]]) as f64))
                .collect(),
            32 => raw
                .chunks_exact(4)
                .map(|c| physical(i32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f64))
                .collect(),
            64 => raw
                .chunks_exact(8)
                .map(|c| {
                    physical(i64::from_be_bytes([
                        c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7],
                    ]) as f64)
                })
                .collect(),
            -32 => raw
                .chunks_exact(4)
                .map(|c| physical(f32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f64))
                .collect(),
            -64 => raw
                .chunks_exact(8)
                .map(|c| {
                    physical(f64::from_be_bytes([
                        c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7],
                    ]))
                })
                .collect(),
            other => return Err(CorrectionError::DecodeError(format!(
                "unsupported BITPIX: {other}"
            ))),
        };

        debug!("Decoded FITS image: {}x{} (BITPIX {})", width, height, bitpix);

        Ok((
            FitsImage {
                width,
                height,
                data: pixels,
            },
            header,
        ))
    }
}

fn axis_len(value: Option<i64>, keyword: &str) -> Result<usize> {
    let value = value.ok_or_else(|| {
        CorrectionError::DecodeError(format!("missing keyword {keyword}"))
    })?;
    usize::try_from(value)
        .map_err(|_| CorrectionError::DecodeError(format!("invalid {keyword}: {value}")))
}

fn bytes_per_pixel(bitpix: i64) -> Result<usize> {
    match bitpix {
        8 => Ok(1),
        16 => Ok(2),
        32 | -32 => Ok(4),
        64 | -64 => Ok(8),
        other => Err(CorrectionError::DecodeError(format!(
            "unsupported BITPIX: {other}"
        ))),
    }
}

/// Walks the header card stream, splitting structural keywords from the
/// retained cards and locating the start of the data section.
fn parse_primary(data: &[u8]) -> Result<(FitsHeader, PrimaryInfo)> {
    if data.len() < BLOCK_LEN {
        return Err(CorrectionError::DecodeError(format!(
            "file shorter than one FITS block ({} bytes)",
            data.len()
        )));
    }
    if &data[..6] != b"SIMPLE" {
        return Err(CorrectionError::DecodeError(
            "missing SIMPLE marker in first card".to_string(),
        ));
    }

    let mut header = FitsHeader::new();
    let mut info = PrimaryInfo {
        bitpix: None,
        naxis: None,
        naxis1: None,
        naxis2: None,
        bscale: 1.0,
        bzero: 0.0,
        data_start: 0,
    };

    let mut offset = 0;
    loop {
        if offset + CARD_LEN > data.len() {
            return Err(CorrectionError::DecodeError(
                "header not terminated by END".to_string(),
            ));
        }
        let record = &data[offset..offset + CARD_LEN];
        offset += CARD_LEN;

        let keyword_field = String::from_utf8_lossy(&record[..8]);
        let keyword = keyword_field.trim();

        if keyword == "END" {
            break;
        }
        if keyword.is_empty() {
            continue;
        }
        if keyword == "HISTORY" {
            let text = String::from_utf8_lossy(&record[8..]);
            header.push_history(text.trim_end().to_string());
            continue;
        }
        if keyword == "COMMENT" {
            let text = String::from_utf8_lossy(&record[8..]);
            header.push_card(
                "COMMENT".to_string(),
                FitsValue::Comment(text.trim_end().to_string()),
            );
            continue;
        }
        if &record[8..10] != b"= " {
            // Keyword without a value indicator; nothing to retain.
            continue;
        }

        let field = String::from_utf8_lossy(&record[10..]);
        let value = parse_value(&field);

        if is_structural(keyword) {
            match keyword {
                "SIMPLE" => {
                    if value.as_bool() != Some(true) {
                        return Err(CorrectionError::DecodeError(
                            "SIMPLE is not T".to_string(),
                        ));
                    }
                }
                "BITPIX" => info.bitpix = value.as_i64(),
                "NAXIS" => info.naxis = value.as_i64(),
                "NAXIS1" => info.naxis1 = value.as_i64(),
                "NAXIS2" => info.naxis2 = value.as_i64(),
                "BSCALE" => info.bscale = value.as_f64().unwrap_or(1.0),
                "BZERO" => info.bzero = value.as_f64().unwrap_or(0.0),
                _ => {}
            }
        } else {
            header.push_card(keyword.to_string(), value);
        }
    }

    // Data begins at the next 2880-byte boundary after END.
    info.data_start = offset.div_ceil(BLOCK_LEN) * BLOCK_LEN;
    Ok((header, info))
}
