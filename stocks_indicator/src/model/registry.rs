//! Ordered list of tracked symbols, shared between the UI thread and the
//! refresh worker.
//!
//! The list is only ever replaced wholesale. Each replacement gets a new epoch so
//! a refresh cycle can tell whether the quotes it fetched still belong to the
//! list the menu shows.

use std::sync::{Arc, RwLock};

use log::info;
use stocks_common::{IndicatorError, Symbol};

/// One version of the symbol list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    /// Version of the list; bumped by every replace.
    pub epoch: u64,
    /// Symbols in menu order.
    pub symbols: Arc<[Symbol]>,
}

impl SymbolSet {
    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if no symbols are tracked.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Thread-safe holder of the current `SymbolSet`. Clones share the same list.
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    current: Arc<RwLock<SymbolSet>>,
}

impl SymbolRegistry {
    /// Creates the registry with the initial list at epoch 0.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            current: Arc::new(RwLock::new(SymbolSet {
                epoch: 0,
                symbols: symbols.into(),
            })),
        }
    }

    /// Current list and its epoch, read atomically.
    pub fn snapshot(&self) -> Result<SymbolSet, IndicatorError> {
        Ok(self.current.read()?.clone())
    }

    /// Replaces the whole list and returns the new version. An empty list is
    /// accepted and yields an empty menu.
    ///
    /// Callers rebuild the menu and the layout metrics from the returned set;
    /// see `Indicator::replace_symbols`.
    pub fn replace(&self, symbols: Vec<Symbol>) -> Result<SymbolSet, IndicatorError> {
        let mut current = self.current.write()?;
        *current = SymbolSet {
            epoch: current.epoch + 1,
            symbols: symbols.into(),
        };
        info!(
            "Symbol list replaced: epoch {}, {} symbols",
            current.epoch,
            current.len()
        );
        Ok(current.clone())
    }
}
