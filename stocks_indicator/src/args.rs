//! Command-line arguments of the indicator.
//!
//! This module defines the CLI interface using `clap`. Values given here
//! override the configuration file and are kept across reloads.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stocks_common::config::{ConfigSource, JsonFileConfig};
use stocks_common::{Configuration, IndicatorError, QuoteField};

/// Parsed command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Stock quotes in a status-bar style menu", long_about = None)]
pub struct Args {
    /// JSON configuration file (symbols, update_interval_secs, quote_field, chart_url).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Text file with symbols separated by commas, spaces or new lines.
    #[arg(long)]
    pub symbols: Option<PathBuf>,

    /// Seconds between two refreshes.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Price to show.
    #[arg(long, value_enum)]
    pub field: Option<QuoteField>,

    /// Probability that the simulated source fails a whole refresh.
    #[arg(long, default_value_t = 0.0, value_parser = parse_probability)]
    pub failure_rate: f64,

    /// Probability that the simulated source has no quote for a symbol.
    #[arg(long, default_value_t = 0.0, value_parser = parse_probability)]
    pub missing_rate: f64,

    /// Font the menu labels are aligned for.
    #[arg(long, value_enum, default_value_t = FontKind::Proportional)]
    pub font: FontKind,

    /// Log chart URLs instead of opening them.
    #[arg(long)]
    pub no_open: bool,
}

/// Parses a probability in `[0, 1]`.
fn parse_probability(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{} is not between 0 and 1", raw))
    }
}

/// Font model used to measure label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FontKind {
    /// Approximated proportional sans font of a desktop menu.
    Proportional,
    /// Fixed-width font, e.g. a terminal.
    Monospace,
}

/// Configuration files with command-line overrides applied on every load.
#[derive(Debug, Clone)]
pub struct CliConfig {
    files: JsonFileConfig,
    interval: Option<u64>,
    field: Option<QuoteField>,
}

impl From<&Args> for CliConfig {
    fn from(args: &Args) -> Self {
        Self {
            files: JsonFileConfig::new(args.config.clone(), args.symbols.clone()),
            interval: args.interval,
            field: args.field,
        }
    }
}

impl ConfigSource for CliConfig {
    fn load(&self) -> Result<Configuration, IndicatorError> {
        let mut config = self.files.load()?;
        if let Some(interval) = self.interval {
            config.update_interval_secs = interval;
        }
        if let Some(field) = self.field {
            config.quote_field = field;
        }
        Ok(config.sanitized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocks_common::config::MIN_UPDATE_INTERVAL_SECS;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let args = Args::parse_from(["stocks_indicator", "--interval", "0", "--field", "ask"]);
        let config = CliConfig::from(&args).load().unwrap();
        assert_eq!(config.update_interval_secs, MIN_UPDATE_INTERVAL_SECS);
        assert_eq!(config.quote_field, QuoteField::Ask);
        assert_eq!(config.symbols, Configuration::default().symbols);
    }

    #[test]
    fn rates_must_be_probabilities() {
        let args = Args::parse_from(["stocks_indicator", "--failure-rate", "0.25"]);
        assert_eq!(args.failure_rate, 0.25);
        for bad in ["NaN", "inf", "1.5", "-0.1"] {
            assert!(Args::try_parse_from(["stocks_indicator", "--missing-rate", bad]).is_err());
        }
    }
}
