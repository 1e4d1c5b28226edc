//! FITS writer implementation.
//!
//! Serializes a pixel grid and header to a canonical single-HDU file:
//! the structural block, the retained cards in stored order, HISTORY
//! cards, END, then big-endian float32 data. Output is deterministic for
//! identical input.

use std::io::Write;

use tracing::debug;

use crate::offset_pipeline::common::error::{CorrectionError, Result};
use crate::offset_pipeline::fits::header::{
    BLOCK_LEN, FitsHeader, FitsValue, format_text_card, format_value_card, history_cards,
    is_structural,
};
use crate::offset_pipeline::fits::types::FitsImage;
use crate::offset_pipeline::fits::writer::FitsWriter;

pub struct StandardFitsWriter;

impl FitsWriter for StandardFitsWriter {
    fn write_fits(
        &self,
        image: &FitsImage,
        header: &FitsHeader,
        output: &mut dyn Write,
    ) -> Result<()> {
        debug!("Encoding FITS image: {}x{}", image.width, image.height);

        if image.data.len() != image.width * image.height {
            return Err(CorrectionError::EncodeError(format!(
                "pixel buffer of {} values does not match {}x{} dimensions",
                image.data.len(),
                image.width,
                image.height
            )));
        }

        let mut buffer = Vec::new();

        // Structural block. Data is always written as IEEE float32.
        buffer.extend_from_slice(&format_value_card("SIMPLE", &FitsValue::Logical(true))?);
        buffer.extend_from_slice(&format_value_card("BITPIX", &FitsValue::Int(-32))?);
        buffer.extend_from_slice(&format_value_card("NAXIS", &FitsValue::Int(2))?);
        buffer.extend_from_slice(&format_value_card(
            "NAXIS1",
            &FitsValue::Int(image.width as i64),
        )?);
        buffer.extend_from_slice(&format_value_card(
            "NAXIS2",
            &FitsValue::Int(image.height as i64),
        )?);

        for (keyword, value) in header.cards() {
            if is_structural(keyword) {
                continue;
            }
            match value {
                FitsValue::Comment(text) => {
                    buffer.extend_from_slice(&format_text_card("COMMENT", text));
                }
                _ => buffer.extend_from_slice(&format_value_card(keyword, value)?),
            }
        }

        for line in header.history() {
            for card in history_cards(line) {
                buffer.extend_from_slice(&card);
            }
        }

        buffer.extend_from_slice(&format_text_card("END", ""));
        while buffer.len() % BLOCK_LEN != 0 {
            buffer.push(b' ');
        }

        for &value in &image.data {
            buffer.extend_from_slice(&value.to_be_bytes());
        }
        while buffer.len() % BLOCK_LEN != 0 {
            buffer.push(0);
        }

        output.write_all(&buffer)?;

        debug!("FITS encoding complete");
        Ok(())
    }
}
