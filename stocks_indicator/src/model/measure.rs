//! Pixel width measurement of label text.
//!
//! The measurer is an oracle for the alignment code: it only answers "how wide
//! is this text" for the default menu font. It carries no layout decisions.

use std::collections::HashMap;

use stocks_common::symbols::PAD_CHAR;

/// Measures rendered text width in pixels.
pub trait WidthMeasurer {
    /// Width of `text` in pixels for the default font. Must be deterministic
    /// for the lifetime of the measurer.
    fn measure(&self, text: &str) -> u32;
}

/// Approximate advance widths for a proportional sans font.
///
/// The advances are hand-picked per glyph class, not read from a real font,
/// so alignment is only as good as the approximation. A host with access to
/// its menu font should measure with that font instead. The table is built once when the measurer is created and then reused for
/// every label. Characters without an entry use `default_advance`, wide
/// characters (CJK and similar) use `wide_advance`.
#[derive(Debug, Clone)]
pub struct GlyphTableMeasurer {
    advances: HashMap<char, u32>,
    default_advance: u32,
    wide_advance: u32,
}

impl GlyphTableMeasurer {
    /// Builds the approximation table.
    pub fn new() -> Self {
        let mut advances = HashMap::new();
        let groups: [(&str, u32); 9] = [
            ("il.,:;!|'`", 3),
            (" fjtrI()[]-", 4),
            ("\"*/\\", 5),
            ("sczJ^", 6),
            ("0123456789$#_?abdeghknopquvxyLFTZ", 7),
            ("ABCEKPRSVXY&+=<>~", 8),
            ("DGHNOQU", 9),
            ("mwM%@", 10),
            ("W", 12),
        ];
        for (glyphs, advance) in groups {
            for glyph in glyphs.chars() {
                advances.insert(glyph, advance);
            }
        }
        // Figure space is defined to be as wide as a digit.
        advances.insert(PAD_CHAR, 7);
        advances.insert('\t', 0);

        Self {
            advances,
            default_advance: 7,
            wide_advance: 12,
        }
    }

    fn advance(&self, glyph: char) -> u32 {
        if let Some(advance) = self.advances.get(&glyph) {
            return *advance;
        }
        if is_wide(glyph) {
            self.wide_advance
        } else if glyph.is_control() {
            0
        } else {
            self.default_advance
        }
    }
}

impl Default for GlyphTableMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl WidthMeasurer for GlyphTableMeasurer {
    fn measure(&self, text: &str) -> u32 {
        text.chars().map(|glyph| self.advance(glyph)).sum()
    }
}

/// East Asian wide and fullwidth ranges.
fn is_wide(glyph: char) -> bool {
    matches!(glyph as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

/// Measurer giving every character the same width. Monospace fonts and tests.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    /// Width of each character.
    pub advance: u32,
}

impl WidthMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str) -> u32 {
        self.advance * text.chars().count() as u32
    }
}
