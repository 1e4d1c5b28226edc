//! FITS header model
//!
//! An ordered sequence of keyword cards plus append-only HISTORY lines.
//! Card-level parsing and formatting follows the FITS standard: 80-byte
//! records, keyword in columns 1-8, value indicator "= " in columns 9-10,
//! fixed-format values ending at column 30.

use crate::offset_pipeline::common::error::{CorrectionError, Result};

pub(crate) const CARD_LEN: usize = 80;
pub(crate) const BLOCK_LEN: usize = 2880;

/// Text columns available on a HISTORY or COMMENT card after the keyword.
const TEXT_COLS: usize = CARD_LEN - 8;

/// A parsed FITS card value.
#[derive(Debug, Clone, PartialEq)]
pub enum FitsValue {
    Str(String),
    Int(i64),
    Float(f64),
    Logical(bool),
    /// Free-text COMMENT card, preserved in position.
    Comment(String),
}

impl FitsValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FitsValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FitsValue::Int(i) => Some(*i),
            FitsValue::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FitsValue::Float(f) => Some(*f),
            FitsValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FitsValue::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

/// Ordered keyword cards and HISTORY lines of a primary HDU.
///
/// Structural keywords (SIMPLE, BITPIX, NAXIS*, BZERO, BSCALE, EXTEND) are
/// not stored here; the reader consumes them for geometry and the writer
/// emits its own canonical block, so a header round-trips deterministically.
#[derive(Debug, Clone, Default)]
pub struct FitsHeader {
    cards: Vec<(String, FitsValue)>,
    history: Vec<String>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, keyword: &str) -> Option<&FitsValue> {
        let keyword = keyword.to_uppercase();
        self.cards
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, v)| v)
    }

    pub fn get_int(&self, keyword: &str) -> Option<i64> {
        self.get(keyword).and_then(|v| v.as_i64())
    }

    pub fn get_float(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(|v| v.as_f64())
    }

    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(|v| v.as_str())
    }

    /// Sets a card, overwriting an existing one in place so card order is
    /// stable across rewrites.
    pub fn set(&mut self, keyword: &str, value: FitsValue) {
        let keyword = keyword.to_uppercase();
        match self.cards.iter_mut().find(|(k, _)| *k == keyword) {
            Some((_, v)) => *v = value,
            None => self.cards.push((keyword, value)),
        }
    }

    pub fn set_int(&mut self, keyword: &str, value: i64) {
        self.set(keyword, FitsValue::Int(value));
    }

    pub fn set_float(&mut self, keyword: &str, value: f64) {
        self.set(keyword, FitsValue::Float(value));
    }

    pub fn set_str(&mut self, keyword: &str, value: &str) {
        self.set(keyword, FitsValue::Str(value.to_string()));
    }

    pub fn set_logical(&mut self, keyword: &str, value: bool) {
        self.set(keyword, FitsValue::Logical(value));
    }

    /// Appends a free-text HISTORY line. Lines longer than one card are
    /// wrapped over consecutive HISTORY cards when written.
    pub fn add_history(&mut self, text: impl Into<String>) {
        self.history.push(text.into());
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub(crate) fn push_history(&mut self, text: String) {
        self.history.push(text);
    }

    pub(crate) fn push_card(&mut self, keyword: String, value: FitsValue) {
        self.cards.push((keyword, value));
    }

    pub fn cards(&self) -> &[(String, FitsValue)] {
        &self.cards
    }
}

/// Keywords owned by the reader/writer rather than the card list.
pub(crate) fn is_structural(keyword: &str) -> bool {
    matches!(
        keyword,
        "SIMPLE" | "BITPIX" | "NAXIS" | "NAXIS1" | "NAXIS2" | "NAXIS3" | "BZERO" | "BSCALE"
            | "EXTEND" | "END"
    )
}

/// Formats a keyword card with a value indicator.
pub(crate) fn format_value_card(keyword: &str, value: &FitsValue) -> Result<[u8; CARD_LEN]> {
    let mut record = [b' '; CARD_LEN];

    let keyword_bytes = keyword.as_bytes();
    if keyword_bytes.len() > 8 {
        return Err(CorrectionError::EncodeError(format!(
            "keyword longer than 8 characters: {keyword}"
        )));
    }
    record[..keyword_bytes.len()].copy_from_slice(keyword_bytes);
    record[8] = b'=';
    record[9] = b' ';

    let rendered = match value {
        // Quotes inside the value are doubled per the standard; short
        // strings are padded to the minimum 8 characters.
        FitsValue::Str(s) => format!("'{:<8}'", s.replace('\'', "''")),
        FitsValue::Int(i) => format!("{i:>20}"),
        FitsValue::Float(f) => format!("{f:>20.10E}"),
        FitsValue::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
        FitsValue::Comment(_) => {
            return Err(CorrectionError::EncodeError(format!(
                "comment text cannot carry a value indicator: {keyword}"
            )));
        }
    };

    let bytes = rendered.as_bytes();
    let len = bytes.len().min(CARD_LEN - 10);
    record[10..10 + len].copy_from_slice(&bytes[..len]);
    Ok(record)
}

/// Formats a value-less text card (HISTORY, COMMENT, END).
pub(crate) fn format_text_card(keyword: &str, text: &str) -> [u8; CARD_LEN] {
    let mut record = [b' '; CARD_LEN];
    let keyword_bytes = keyword.as_bytes();
    let keyword_len = keyword_bytes.len().min(8);
    record[..keyword_len].copy_from_slice(&keyword_bytes[..keyword_len]);

    let bytes = text.as_bytes();
    let len = bytes.len().min(TEXT_COLS);
    record[8..8 + len].copy_from_slice(&bytes[..len]);
    record
}

/// Wraps one HISTORY line over as many cards as its length requires.
pub(crate) fn history_cards(text: &str) -> Vec<[u8; CARD_LEN]> {
    if text.is_empty() {
        return vec![format_text_card("HISTORY", "")];
    }
    text.as_bytes()
        .chunks(TEXT_COLS)
        .map(|chunk| {
            // Chunks split on byte boundaries; history text is ASCII.
            let piece = std::str::from_utf8(chunk).unwrap_or("");
            format_text_card("HISTORY", piece)
        })
        .collect()
}

/// Parses the value field of a card, stripping any inline `/` comment.
pub(crate) fn parse_value(field: &str) -> FitsValue {
    let field = field.trim();

    if let Some(rest) = field.strip_prefix('\'') {
        // Scan for the closing quote, honoring '' escapes.
        let mut out = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        // Trailing blanks inside the quotes are padding.
        return FitsValue::Str(out.trim_end().to_string());
    }

    let value_part = match field.find('/') {
        Some(idx) => field[..idx].trim(),
        None => field,
    };

    match value_part {
        "T" => return FitsValue::Logical(true),
        "F" => return FitsValue::Logical(false),
        _ => {}
    }

    if let Ok(i) = value_part.parse::<i64>() {
        return FitsValue::Int(i);
    }

    // FITS allows a Fortran-style D exponent.
    if let Ok(f) = value_part.replace(['D', 'd'], "E").parse::<f64>() {
        return FitsValue::Float(f);
    }

    FitsValue::Str(value_part.to_string())
}
