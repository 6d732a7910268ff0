//! Quote values produced by a refresh cycle.
//!
//! A `Quote` is either a price or the `Unknown` sentinel used when the source
//! had no usable value for a symbol. Quotes are recomputed every cycle and never
//! persisted.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Price for a single symbol, or the sentinel for a failed/missing fetch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Quote {
    /// A finite, non-negative price.
    Price(f64),
    /// No usable value this cycle.
    #[default]
    Unknown,
}

impl Quote {
    /// Maps a raw value from a quote source, rejecting NaN, infinities and
    /// negative prices.
    pub fn from_raw(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            Quote::Price(value)
        } else {
            Quote::Unknown
        }
    }

    /// Maps an optional raw value; `None` is `Unknown`.
    pub fn from_optional(value: Option<f64>) -> Self {
        value.map_or(Quote::Unknown, Quote::from_raw)
    }

    /// The price, if known.
    pub fn price(&self) -> Option<f64> {
        match self {
            Quote::Price(price) => Some(*price),
            Quote::Unknown => None,
        }
    }

    /// Returns `true` for the `Unknown` sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Quote::Unknown)
    }
}

/// Which price of the book the quote source is asked for.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lower")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum QuoteField {
    #[default]
    Bid,
    Ask,
    Last,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_outside_price_domain_are_unknown() {
        assert_eq!(Quote::from_raw(150.5), Quote::Price(150.5));
        assert_eq!(Quote::from_raw(0.0), Quote::Price(0.0));
        assert!(Quote::from_raw(-1.0).is_unknown());
        assert!(Quote::from_raw(f64::NAN).is_unknown());
        assert!(Quote::from_raw(f64::INFINITY).is_unknown());
        assert!(Quote::from_optional(None).is_unknown());
    }

    #[test]
    fn quote_field_names() {
        assert_eq!(QuoteField::Bid.to_string(), "bid");
        assert_eq!("LAST".parse::<QuoteField>().unwrap(), QuoteField::Last);
        let field: QuoteField = serde_json::from_str(r#""ask""#).unwrap();
        assert_eq!(field, QuoteField::Ask);
    }
}
