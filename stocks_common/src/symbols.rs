//! Ticker symbols and helpers for reading symbol lists.
//!
//! A `Symbol` is an opaque exchange ticker. It is validated on construction so
//! that it never contains the menu pad glyph or the column separator: rendered
//! menu labels are parsed back into symbols by splitting on the pad glyph.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

/// Filler glyph used to align menu columns (U+2007 FIGURE SPACE).
pub const PAD_CHAR: char = '\u{2007}';
/// Separator between the symbol column and the price column.
pub const SEPARATOR: char = '\t';

/// Immutable ticker identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Validates and wraps `raw`. Surrounding whitespace is trimmed.
    pub fn new(raw: &str) -> Result<Self, IndicatorError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IndicatorError::InvalidSymbol(raw.to_string()));
        }
        if trimmed
            .chars()
            .any(|c| c == PAD_CHAR || c == SEPARATOR || c.is_whitespace() || c.is_control())
        {
            return Err(IndicatorError::InvalidSymbol(raw.to_string()));
        }
        Ok(Symbol(trimmed.to_string()))
    }

    /// The ticker text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, the unit the label padding is counted in.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = IndicatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trait providing list parsing for symbols.
pub trait SymbolParser: Sized {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, whitespace or new lines; blank
    /// entries are skipped and order is preserved. Returns an error if any
    /// entry is not a valid symbol.
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Self>, IndicatorError>;
}

impl SymbolParser for Symbol {
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Self>, IndicatorError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result?;
            for entry in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if entry.is_empty() {
                    continue;
                }
                symbols.push(entry.parse::<Self>()?);
            }
        }
        Ok(symbols)
    }
}
