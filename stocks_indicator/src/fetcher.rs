//! Quote sources.
//!
//! The network client is outside the indicator; it is reached through the
//! `QuoteFetcher` trait. `SimulatedFetcher` stands in for it when the indicator
//! runs standalone: prices follow a small random walk and failures can be
//! injected for whole batches or single symbols.

use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;
use rand::Rng;
use stocks_common::{IndicatorError, Quote, QuoteField, Symbol};

/// Batch quote source.
pub trait QuoteFetcher: Send + Sync {
    /// Fetches `field` for every symbol. The result is positionally aligned
    /// with `symbols`; entries without data are `Quote::Unknown`. An error
    /// means the whole batch failed.
    fn fetch(&self, symbols: &[Symbol], field: QuoteField) -> Result<Vec<Quote>, IndicatorError>;
}

/// Relative bid/ask spread of the simulated book.
const SPREAD: f64 = 0.002;

/// Random-walk quote source.
pub struct SimulatedFetcher {
    prices: Mutex<HashMap<Symbol, f64>>,
    failure_rate: f64,
    missing_rate: f64,
}

impl SimulatedFetcher {
    /// Creates a source failing whole batches with probability `failure_rate`
    /// and single entries with probability `missing_rate`.
    pub fn new(failure_rate: f64, missing_rate: f64) -> Self {
        Self {
            prices: Mutex::new(HashMap::new()),
            failure_rate: probability(failure_rate),
            missing_rate: probability(missing_rate),
        }
    }

    /// Next price from a uniform step in `[-1%, +1%]`, kept strictly positive.
    pub fn next_price(current_price: f64) -> f64 {
        let mut rng = rand::rng();
        let change: f64 = rng.random_range(-0.01..0.01);
        (current_price * (1.0 + change)).max(0.01)
    }

    fn quote_for(price: f64, field: QuoteField) -> f64 {
        match field {
            QuoteField::Bid => price * (1.0 - SPREAD / 2.0),
            QuoteField::Ask => price * (1.0 + SPREAD / 2.0),
            QuoteField::Last => price,
        }
    }
}

/// Clamps `rate` into `[0, 1]`; NaN counts as never.
fn probability(rate: f64) -> f64 {
    if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) }
}

impl Default for SimulatedFetcher {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl QuoteFetcher for SimulatedFetcher {
    fn fetch(&self, symbols: &[Symbol], field: QuoteField) -> Result<Vec<Quote>, IndicatorError> {
        let mut rng = rand::rng();
        if rng.random_bool(self.failure_rate) {
            return Err(IndicatorError::Fetch("simulated network failure".to_string()));
        }

        let mut prices = self.prices.lock()?;
        let quotes = symbols
            .iter()
            .map(|symbol| {
                let price = prices
                    .entry(symbol.clone())
                    .or_insert_with(|| rng.random_range(20.0..500.0));
                *price = Self::next_price(*price);
                if rng.random_bool(self.missing_rate) {
                    Quote::Unknown
                } else {
                    Quote::from_raw(Self::quote_for(*price, field))
                }
            })
            .collect::<Vec<_>>();
        debug!("Simulated {} {} quotes", quotes.len(), field);
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|name| Symbol::new(name).unwrap()).collect()
    }

    #[test]
    fn returns_one_quote_per_symbol() {
        let fetcher = SimulatedFetcher::default();
        let set = symbols(&["AAPL", "GOOG", "AAPL"]);
        let quotes = fetcher.fetch(&set, QuoteField::Last).unwrap();
        assert_eq!(quotes.len(), 3);
        assert!(quotes.iter().all(|q| q.price().is_some_and(|p| p > 0.0)));
        // Duplicates share one simulated price series.
        assert_eq!(fetcher.prices.lock().unwrap().len(), 2);
    }

    #[test]
    fn bid_is_below_ask() {
        assert!(
            SimulatedFetcher::quote_for(100.0, QuoteField::Bid)
                < SimulatedFetcher::quote_for(100.0, QuoteField::Ask)
        );
    }

    #[test]
    fn injected_failures() {
        let failing = SimulatedFetcher::new(1.0, 0.0);
        assert!(matches!(
            failing.fetch(&symbols(&["AAPL"]), QuoteField::Bid),
            Err(IndicatorError::Fetch(_))
        ));

        let sparse = SimulatedFetcher::new(0.0, 1.0);
        let quotes = sparse.fetch(&symbols(&["AAPL", "GOOG"]), QuoteField::Bid).unwrap();
        assert!(quotes.iter().all(Quote::is_unknown));
    }

    #[test]
    fn non_finite_rates_do_not_panic() {
        let fetcher = SimulatedFetcher::new(f64::NAN, f64::NAN);
        let quotes = fetcher.fetch(&symbols(&["AAPL"]), QuoteField::Bid).unwrap();
        assert!(quotes[0].price().is_some());

        let always = SimulatedFetcher::new(f64::INFINITY, f64::NEG_INFINITY);
        assert!(always.fetch(&symbols(&["AAPL"]), QuoteField::Bid).is_err());
    }

    #[test]
    fn random_walk_stays_positive() {
        let mut price = 0.02;
        for _ in 0..1000 {
            price = SimulatedFetcher::next_price(price);
            assert!(price >= 0.01);
        }
    }
}
