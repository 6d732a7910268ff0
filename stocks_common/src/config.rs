//! Indicator configuration and the sources it is loaded from.
//!
//! The configuration is a plain value handed to the registry and the scheduler
//! at construction; reloading after a preferences edit means loading a new value
//! from the same `ConfigSource` and injecting it again.
//!
//! Invalid values never fail a load. `Configuration::from_json` and
//! `Configuration::sanitized` recover them locally:
//! - an update interval of zero is raised to `MIN_UPDATE_INTERVAL_SECS`;
//! - symbols that do not validate are dropped with a warning;
//! - a chart URL without the `{symbol}` placeholder is replaced by the default.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;
use crate::quote::QuoteField;
use crate::symbols::{Symbol, SymbolParser};

/// Refresh interval used when none is configured.
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 60;
/// Smallest refresh interval accepted; lower values are raised to it.
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 5;
/// Placeholder substituted with the symbol in `chart_url`.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";
/// Chart page opened when a menu row is activated.
pub const DEFAULT_CHART_URL: &str = "https://finance.yahoo.com/chart/{symbol}";

/// Everything but RFC 3986 unreserved characters is escaped in symbols.
const SYMBOL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Symbols shown on first start.
const DEFAULT_SYMBOLS: [&str; 3] = ["AAPL", "GOOG", "MSFT"];

/// Runtime configuration of the indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    /// Symbols to track, in menu order.
    pub symbols: Vec<Symbol>,
    /// Seconds between two refresh cycles, always `>= MIN_UPDATE_INTERVAL_SECS`.
    pub update_interval_secs: u64,
    /// Price requested from the quote source.
    pub quote_field: QuoteField,
    /// Chart page template containing `{symbol}`.
    pub chart_url: String,
}

/// On-disk shape of the configuration; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    symbols: Option<Vec<String>>,
    update_interval_secs: Option<u64>,
    quote_field: Option<QuoteField>,
    chart_url: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS
                .iter()
                .filter_map(|raw| Symbol::new(raw).ok())
                .collect(),
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
            quote_field: QuoteField::default(),
            chart_url: DEFAULT_CHART_URL.to_string(),
        }
    }
}

impl Configuration {
    /// Decodes a JSON document, filling missing fields with defaults.
    pub fn from_json(text: &str) -> Result<Self, IndicatorError> {
        let file: ConfigFile = serde_json::from_str(text)?;
        let defaults = Configuration::default();

        let symbols = match file.symbols {
            Some(raw) => raw
                .iter()
                .filter_map(|entry| match Symbol::new(entry) {
                    Ok(symbol) => Some(symbol),
                    Err(e) => {
                        warn!("Skipping configured symbol: {}", e);
                        None
                    }
                })
                .collect(),
            None => defaults.symbols,
        };

        Ok(Configuration {
            symbols,
            update_interval_secs: file
                .update_interval_secs
                .unwrap_or(defaults.update_interval_secs),
            quote_field: file.quote_field.unwrap_or(defaults.quote_field),
            chart_url: file.chart_url.unwrap_or(defaults.chart_url),
        }
        .sanitized())
    }

    /// Applies the local recovery rules for out-of-range values.
    pub fn sanitized(mut self) -> Self {
        if self.update_interval_secs < MIN_UPDATE_INTERVAL_SECS {
            warn!(
                "Update interval of {}s is below the minimum, using {}s",
                self.update_interval_secs, MIN_UPDATE_INTERVAL_SECS
            );
            self.update_interval_secs = MIN_UPDATE_INTERVAL_SECS;
        }
        if !self.chart_url.contains(SYMBOL_PLACEHOLDER) {
            warn!(
                "Chart URL {:?} has no {} placeholder, using the default",
                self.chart_url, SYMBOL_PLACEHOLDER
            );
            self.chart_url = DEFAULT_CHART_URL.to_string();
        }
        if self.symbols.is_empty() {
            warn!("No symbols configured, the menu will be empty");
        }
        self
    }

    /// Interval between refresh cycles.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// Chart page for `symbol`, percent-encoded so the URL is safe to hand
    /// to a shell opener.
    pub fn chart_url_for(&self, symbol: &Symbol) -> String {
        let encoded = utf8_percent_encode(symbol.as_str(), SYMBOL_ENCODE_SET).to_string();
        self.chart_url.replace(SYMBOL_PLACEHOLDER, &encoded)
    }
}

/// Provider the configuration is (re)loaded from.
pub trait ConfigSource: Send {
    /// Loads the current configuration.
    fn load(&self) -> Result<Configuration, IndicatorError>;

    /// Loads the configuration, falling back to defaults on any error.
    fn load_or_default(&self) -> Configuration {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load configuration, using defaults: {}", e);
                Configuration::default()
            }
        }
    }
}

/// Configuration stored in a JSON file, optionally with the symbol list kept in
/// a separate plain text file.
#[derive(Debug, Clone, Default)]
pub struct JsonFileConfig {
    /// JSON configuration file; defaults are used when absent.
    pub path: Option<PathBuf>,
    /// Symbol list overriding the JSON `symbols` field.
    pub symbols_path: Option<PathBuf>,
}

impl JsonFileConfig {
    /// Creates a source reading `path`.
    pub fn new(path: Option<PathBuf>, symbols_path: Option<PathBuf>) -> Self {
        Self { path, symbols_path }
    }

    fn read_symbols(path: &Path) -> Result<Vec<Symbol>, IndicatorError> {
        let file = fs::File::open(path)?;
        Symbol::parse_from_reader(BufReader::new(file))
    }
}

impl ConfigSource for JsonFileConfig {
    fn load(&self) -> Result<Configuration, IndicatorError> {
        let mut config = match &self.path {
            Some(path) => Configuration::from_json(&fs::read_to_string(path)?)?,
            None => Configuration::default(),
        };
        if let Some(symbols_path) = &self.symbols_path {
            config.symbols = Self::read_symbols(symbols_path)?;
        }
        Ok(config.sanitized())
    }
}

/// In-memory configuration, used by hosts that manage preferences themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub Configuration);

impl ConfigSource for StaticConfig {
    fn load(&self) -> Result<Configuration, IndicatorError> {
        Ok(self.0.clone().sanitized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = Configuration::from_json(r#"{ "symbols": ["SAP.DE"] }"#).unwrap();
        assert_eq!(config.symbols, vec![Symbol::new("SAP.DE").unwrap()]);
        assert_eq!(config.update_interval_secs, DEFAULT_UPDATE_INTERVAL_SECS);
        assert_eq!(config.quote_field, QuoteField::Bid);
        assert_eq!(config.chart_url, DEFAULT_CHART_URL);
    }

    #[test]
    fn zero_interval_is_raised_to_minimum() {
        let config = Configuration::from_json(r#"{ "update_interval_secs": 0 }"#).unwrap();
        assert_eq!(config.update_interval_secs, MIN_UPDATE_INTERVAL_SECS);
        assert_eq!(
            config.update_interval(),
            Duration::from_secs(MIN_UPDATE_INTERVAL_SECS)
        );
    }

    #[test]
    fn invalid_symbols_are_dropped_not_fatal() {
        let config =
            Configuration::from_json(r#"{ "symbols": ["AAPL", "", "BAD\tONE", "GOOG"] }"#).unwrap();
        let names: Vec<&str> = config.symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, ["AAPL", "GOOG"]);
    }

    #[test]
    fn empty_symbol_list_is_kept() {
        let config = Configuration::from_json(r#"{ "symbols": [] }"#).unwrap();
        assert!(config.symbols.is_empty());
    }

    #[test]
    fn chart_url_substitutes_symbol() {
        let config =
            Configuration::from_json(r#"{ "chart_url": "https://example.com/q?s={symbol}" }"#)
                .unwrap();
        let symbol = Symbol::new("AAPL").unwrap();
        assert_eq!(config.chart_url_for(&symbol), "https://example.com/q?s=AAPL");

        let broken = Configuration::from_json(r#"{ "chart_url": "https://example.com" }"#).unwrap();
        assert_eq!(broken.chart_url, DEFAULT_CHART_URL);
    }

    #[test]
    fn chart_url_escapes_reserved_characters() {
        let config = Configuration::default();
        assert_eq!(
            config.chart_url_for(&Symbol::new("A&calc").unwrap()),
            "https://finance.yahoo.com/chart/A%26calc"
        );
        assert_eq!(
            config.chart_url_for(&Symbol::new("^GSPC").unwrap()),
            "https://finance.yahoo.com/chart/%5EGSPC"
        );
        assert_eq!(
            config.chart_url_for(&Symbol::new("BRK.B").unwrap()),
            "https://finance.yahoo.com/chart/BRK.B"
        );
    }

    #[test]
    fn malformed_json_falls_back_in_load_or_default() {
        struct Broken;
        impl ConfigSource for Broken {
            fn load(&self) -> Result<Configuration, IndicatorError> {
                Configuration::from_json("{ not json")
            }
        }
        assert_eq!(Broken.load_or_default(), Configuration::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let source = JsonFileConfig::new(Some(PathBuf::from("/nonexistent/stocks.json")), None);
        assert!(matches!(source.load(), Err(IndicatorError::Io(_))));
    }
}
