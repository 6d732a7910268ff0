//! Column alignment of menu labels.
//!
//! A label is `<symbol><pad><TAB><price>`. Symbols are rendered in a
//! proportional font, so the padding after each symbol is derived from its pixel
//! shortfall against the widest symbol, converted to a count of pad glyphs:
//!
//! ```text
//! pad_count = (max_width - cur_width) / pad_char_width + len(symbol) + 1
//! ```
//!
//! The symbol is then left-justified into a field of `pad_count` characters
//! filled with `PAD_CHAR`. The widest symbol always gets exactly one pad glyph.
//! The result is a heuristic: misalignment stays below one pad glyph width but
//! is not pixel exact.

use stocks_common::symbols::{PAD_CHAR, SEPARATOR};
use stocks_common::{Quote, Symbol};

use crate::model::measure::WidthMeasurer;

/// Text shown in place of a price that could not be fetched.
pub const UNKNOWN_QUOTE: &str = "???";
/// Width in characters of the right-aligned price field.
pub const PRICE_FIELD_WIDTH: usize = 8;

/// Measurements derived from the current symbol set.
///
/// Recomputed whenever the symbol set is replaced, read-only otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMetrics {
    /// Pixel width of one `PAD_CHAR`, never zero.
    pub pad_char_width: u32,
    /// Widest symbol in pixels.
    pub max_width: u32,
    /// Pixel width of each symbol, positionally aligned with the symbol set.
    pub widths: Vec<u32>,
}

impl LayoutMetrics {
    /// Measures the pad glyph and every symbol once.
    pub fn compute<M: WidthMeasurer + ?Sized>(measurer: &M, symbols: &[Symbol]) -> Self {
        let pad_char_width = measurer.measure(PAD_CHAR.encode_utf8(&mut [0; 4])).max(1);
        let widths: Vec<u32> = symbols
            .iter()
            .map(|symbol| measurer.measure(symbol.as_str()))
            .collect();
        let max_width = widths.iter().copied().max().unwrap_or(0);

        Self {
            pad_char_width,
            max_width,
            widths,
        }
    }

    /// Total length in characters of the padded symbol field.
    pub fn pad_count(&self, symbol: &Symbol, cur_width: u32) -> usize {
        let deficit = self.max_width.saturating_sub(cur_width) / self.pad_char_width;
        deficit as usize + symbol.char_len() + 1
    }

    /// Label for the symbol at `index`, using its cached width.
    pub fn label_at(&self, index: usize, symbol: &Symbol, quote: Quote) -> String {
        let cur_width = self.widths.get(index).copied().unwrap_or(self.max_width);
        format_label(self, symbol, cur_width, quote)
    }
}

/// Renders one aligned menu label.
pub fn format_label(metrics: &LayoutMetrics, symbol: &Symbol, cur_width: u32, quote: Quote) -> String {
    let pad_count = metrics.pad_count(symbol, cur_width);
    let mut label = String::with_capacity(pad_count * PAD_CHAR.len_utf8() + 2 * PRICE_FIELD_WIDTH);

    label.push_str(symbol.as_str());
    pad_to(&mut label, symbol.char_len(), pad_count);
    label.push(SEPARATOR);

    match quote {
        Quote::Price(price) => {
            let price = format!("{:.2}", price);
            pad_to(&mut label, price.chars().count(), PRICE_FIELD_WIDTH);
            label.push_str(&price);
        }
        Quote::Unknown => label.push_str(UNKNOWN_QUOTE),
    }
    label
}

fn pad_to(label: &mut String, len: usize, width: usize) {
    for _ in len..width {
        label.push(PAD_CHAR);
    }
}

/// Recovers the symbol from a rendered label: everything before the first pad
/// glyph. Returns `None` if the label carries no pad glyph.
pub fn symbol_from_label(label: &str) -> Option<&str> {
    label
        .find(PAD_CHAR)
        .map(|end| &label[..end])
        .filter(|symbol| !symbol.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::measure::{GlyphTableMeasurer, MonospaceMeasurer};

    fn symbols(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|name| Symbol::new(name).unwrap()).collect()
    }

    fn pads(n: usize) -> String {
        std::iter::repeat_n(PAD_CHAR, n).collect()
    }

    #[test]
    fn aapl_goog_scenario() {
        let measurer = GlyphTableMeasurer::new();
        let set = symbols(&["AAPL", "GOOG"]);
        let metrics = LayoutMetrics::compute(&measurer, &set);
        assert_eq!(metrics.max_width, measurer.measure("GOOG"));
        assert!(metrics.widths[0] < metrics.widths[1]);

        let aapl = metrics.label_at(0, &set[0], Quote::Price(150.5));
        let aapl_pad = metrics.pad_count(&set[0], metrics.widths[0]);
        assert_eq!(aapl_pad, 5);
        assert_eq!(aapl, format!("AAPL{}\t{}150.50", pads(aapl_pad - 4), pads(2)));

        let goog = metrics.label_at(1, &set[1], Quote::Unknown);
        assert_eq!(metrics.pad_count(&set[1], metrics.widths[1]), 5);
        assert_eq!(goog, format!("GOOG{}\t???", pads(1)));
    }

    #[test]
    fn pixel_deficit_becomes_pad_glyphs() {
        let measurer = GlyphTableMeasurer::new();
        let set = symbols(&["IBM", "GOOGL"]);
        let metrics = LayoutMetrics::compute(&measurer, &set);
        // (43 - 22) / 7 = 3 glyphs of deficit.
        assert_eq!(metrics.pad_count(&set[0], metrics.widths[0]), 3 + 3 + 1);
        assert_eq!(metrics.pad_count(&set[1], metrics.widths[1]), 5 + 1);
        assert_eq!(
            metrics.label_at(0, &set[0], Quote::Price(1.0)),
            format!("IBM{}\t{}1.00", pads(4), pads(4))
        );
    }

    #[test]
    fn single_symbol_gets_exactly_one_pad() {
        let measurer = GlyphTableMeasurer::new();
        let set = symbols(&["NESN.SW"]);
        let metrics = LayoutMetrics::compute(&measurer, &set);
        assert_eq!(metrics.pad_count(&set[0], metrics.widths[0]), 8);
        assert!(metrics.label_at(0, &set[0], Quote::Unknown).starts_with("NESN.SW\u{2007}\t"));
    }

    #[test]
    fn widest_symbol_always_has_a_pad_before_separator() {
        let measurer = GlyphTableMeasurer::new();
        let sets = [
            vec!["A"],
            vec!["W", "i"],
            vec!["MMM", "WWW", "III", "GOOG"],
            vec!["^GDAXI", "BRK-B", "7203.T"],
        ];
        for names in sets {
            let set = symbols(&names);
            let metrics = LayoutMetrics::compute(&measurer, &set);
            let widest = metrics
                .widths
                .iter()
                .position(|w| *w == metrics.max_width)
                .unwrap();
            let label = metrics.label_at(widest, &set[widest], Quote::Price(3.0));
            let (left, _) = label.split_once(SEPARATOR).unwrap();
            assert!(left.ends_with(PAD_CHAR), "{:?}", label);
        }
    }

    #[test]
    fn price_field_is_right_aligned_to_eight_chars() {
        let metrics = LayoutMetrics::compute(&MonospaceMeasurer { advance: 7 }, &symbols(&["X"]));
        let symbol = Symbol::new("X").unwrap();
        for (price, text) in [(0.0, "0.00"), (12.346, "12.35"), (98765.4, "98765.40")] {
            let label = metrics.label_at(0, &symbol, Quote::Price(price));
            let field = label.split_once(SEPARATOR).unwrap().1;
            assert_eq!(field.chars().count(), PRICE_FIELD_WIDTH);
            assert!(field.ends_with(text));
        }
        let wide = metrics.label_at(0, &symbol, Quote::Price(123456789.0));
        assert!(wide.ends_with("\t123456789.00"));
    }

    #[test]
    fn zero_width_pad_glyph_does_not_divide_by_zero() {
        struct Blank;
        impl WidthMeasurer for Blank {
            fn measure(&self, text: &str) -> u32 {
                text.chars().filter(|c| *c != PAD_CHAR).count() as u32 * 5
            }
        }
        let set = symbols(&["AB", "ABCD"]);
        let metrics = LayoutMetrics::compute(&Blank, &set);
        assert_eq!(metrics.pad_char_width, 1);
        assert_eq!(metrics.pad_count(&set[0], metrics.widths[0]), 10 + 2 + 1);
    }

    #[test]
    fn labels_round_trip_to_symbols() {
        let measurer = GlyphTableMeasurer::new();
        let set = symbols(&["AAPL", "^GDAXI", "SAP.DE", "日本", "W"]);
        let metrics = LayoutMetrics::compute(&measurer, &set);
        for (index, symbol) in set.iter().enumerate() {
            for quote in [Quote::Unknown, Quote::Price(42.0)] {
                let label = metrics.label_at(index, symbol, quote);
                assert_eq!(symbol_from_label(&label), Some(symbol.as_str()));
            }
        }
    }

    #[test]
    fn labels_without_pad_are_not_rows() {
        assert_eq!(symbol_from_label("Preferences"), None);
        assert_eq!(symbol_from_label("\u{2007}\t???"), None);
    }
}
