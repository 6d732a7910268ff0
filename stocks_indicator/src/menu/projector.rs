//! Projection of the symbol set onto menu rows.
//!
//! Rows are bound to symbols by position at build time. Replacing the symbol
//! set rebuilds every row; quote updates only change row text. The projector
//! lives on the UI thread and is only reached from there.

use log::{debug, warn};
use stocks_common::{IndicatorError, Quote, Symbol};

use crate::menu::surface::RowSurface;
use crate::model::layout::{LayoutMetrics, symbol_from_label};
use crate::model::measure::WidthMeasurer;
use crate::model::registry::SymbolSet;

/// One menu row and the symbol it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow<H> {
    /// Symbol at this position when the menu was built.
    pub symbol: Symbol,
    /// Surface handle of the row.
    pub handle: H,
}

/// Owns the menu rows of the current symbol set.
pub struct MenuProjector<S: RowSurface> {
    surface: S,
    measurer: Box<dyn WidthMeasurer>,
    rows: Vec<MenuRow<S::Handle>>,
    metrics: LayoutMetrics,
    epoch: Option<u64>,
}

impl<S: RowSurface> MenuProjector<S> {
    /// Creates a projector with no rows. `measurer` is kept for the lifetime
    /// of the projector.
    pub fn new(surface: S, measurer: Box<dyn WidthMeasurer>) -> Self {
        let metrics = LayoutMetrics::compute(measurer.as_ref(), &[]);
        Self {
            surface,
            measurer,
            rows: Vec::new(),
            metrics,
            epoch: None,
        }
    }

    /// Discards all rows and creates one per symbol, in order, each showing
    /// the symbol and the unknown placeholder. Layout metrics are recomputed
    /// for the new set.
    pub fn rebuild(&mut self, set: &SymbolSet) -> Result<(), IndicatorError> {
        self.surface.clear_all_rows();
        self.rows.clear();
        self.epoch = None;
        self.metrics = LayoutMetrics::compute(self.measurer.as_ref(), &set.symbols);

        for (index, symbol) in set.symbols.iter().enumerate() {
            let label = self.metrics.label_at(index, symbol, Quote::Unknown);
            let handle = match self.surface.create_row(&label) {
                Ok(handle) => handle,
                Err(e) => {
                    warn!("Menu rebuild failed at row {}, menu left empty: {}", index, e);
                    self.clear();
                    return Err(e);
                }
            };
            self.rows.push(MenuRow {
                symbol: symbol.clone(),
                handle,
            });
        }
        self.epoch = Some(set.epoch);
        self.surface.present();
        debug!("Menu rebuilt with {} rows at epoch {}", self.rows.len(), set.epoch);
        Ok(())
    }

    /// Updates every row with the quote at the same position. Rows without a
    /// quote show the unknown placeholder.
    ///
    /// Quotes fetched for another epoch than the rows were built for are
    /// rejected with `IndicatorError::StaleSnapshot`. Without a built menu
    /// there is nothing to update.
    pub fn apply_quotes(&mut self, epoch: u64, quotes: &[Quote]) -> Result<usize, IndicatorError> {
        let Some(expected) = self.epoch else {
            debug!("No menu to update for epoch {}", epoch);
            return Ok(0);
        };
        if expected != epoch {
            return Err(IndicatorError::StaleSnapshot {
                expected,
                actual: epoch,
            });
        }

        for (index, row) in self.rows.iter().enumerate() {
            let quote = quotes.get(index).copied().unwrap_or(Quote::Unknown);
            let label = self.metrics.label_at(index, &row.symbol, quote);
            self.surface.set_row_text(row.handle, &label)?;
        }
        self.surface.present();
        Ok(self.rows.len())
    }

    /// Recovers the symbol of an activated row from its label.
    pub fn symbol_for_row(&self, handle: S::Handle) -> Result<Symbol, IndicatorError> {
        let label = self
            .surface
            .row_text(handle)
            .ok_or_else(|| IndicatorError::UnknownRow(format!("{:?}", handle)))?;
        let raw = symbol_from_label(label)
            .ok_or_else(|| IndicatorError::UnknownRow(label.to_string()))?;
        Symbol::new(raw)
    }

    /// Removes every row, e.g. on shutdown.
    pub fn clear(&mut self) {
        self.surface.clear_all_rows();
        self.rows.clear();
        self.epoch = None;
        self.surface.present();
    }

    /// Rows of the current menu.
    pub fn rows(&self) -> &[MenuRow<S::Handle>] {
        &self.rows
    }

    /// Epoch of the symbol set the rows were built for.
    pub fn epoch(&self) -> Option<u64> {
        self.epoch
    }

    /// The underlying surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::surface::MemorySurface;
    use crate::model::layout::UNKNOWN_QUOTE;
    use crate::model::measure::GlyphTableMeasurer;
    use crate::model::registry::SymbolRegistry;
    use stocks_common::symbols::PAD_CHAR;

    fn symbols(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|name| Symbol::new(name).unwrap()).collect()
    }

    fn projector() -> MenuProjector<MemorySurface> {
        MenuProjector::new(MemorySurface::new(), Box::new(GlyphTableMeasurer::new()))
    }

    #[test]
    fn rebuild_creates_one_row_per_symbol_in_order() {
        let registry = SymbolRegistry::new(symbols(&["AAPL", "GOOG", "AAPL"]));
        let mut projector = projector();
        projector.rebuild(&registry.snapshot().unwrap()).unwrap();

        let texts = projector.surface().texts();
        assert_eq!(texts.len(), 3);
        assert!(texts[0].starts_with("AAPL\u{2007}"));
        assert!(texts[1].starts_with("GOOG\u{2007}"));
        assert!(texts.iter().all(|t| t.ends_with(UNKNOWN_QUOTE)));
        assert_eq!(projector.epoch(), Some(0));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let registry = SymbolRegistry::new(symbols(&["AAPL", "GOOG"]));
        let mut projector = projector();
        projector.rebuild(&registry.snapshot().unwrap()).unwrap();
        let first = projector.surface().texts().to_vec();

        let set = registry.replace(symbols(&["AAPL", "GOOG"])).unwrap();
        projector.rebuild(&set).unwrap();
        assert_eq!(projector.surface().texts(), &first[..]);
    }

    #[test]
    fn apply_quotes_keeps_rows_and_fills_missing_entries() {
        let registry = SymbolRegistry::new(symbols(&["AAPL", "GOOG", "MSFT"]));
        let mut projector = projector();
        projector.rebuild(&registry.snapshot().unwrap()).unwrap();
        let handles: Vec<_> = projector.rows().iter().map(|r| r.handle).collect();

        let updated = projector
            .apply_quotes(0, &[Quote::Price(150.5), Quote::Unknown])
            .unwrap();
        assert_eq!(updated, 3);

        let handles_after: Vec<_> = projector.rows().iter().map(|r| r.handle).collect();
        assert_eq!(handles, handles_after);

        let texts = projector.surface().texts();
        assert!(texts[0].ends_with("\t\u{2007}\u{2007}150.50"));
        assert!(texts[1].ends_with("\t???"));
        assert!(texts[2].ends_with("\t???"));
    }

    #[test]
    fn stale_epoch_is_rejected_without_touching_rows() {
        let registry = SymbolRegistry::new(symbols(&["AAPL"]));
        let mut projector = projector();
        projector.rebuild(&registry.snapshot().unwrap()).unwrap();
        let set = registry.replace(symbols(&["GOOG"])).unwrap();
        projector.rebuild(&set).unwrap();
        let before = projector.surface().texts().to_vec();

        let result = projector.apply_quotes(0, &[Quote::Price(1.0)]);
        assert!(matches!(
            result,
            Err(IndicatorError::StaleSnapshot { expected: 1, actual: 0 })
        ));
        assert_eq!(projector.surface().texts(), &before[..]);
    }

    #[test]
    fn symbol_is_recovered_from_row_label() {
        let registry = SymbolRegistry::new(symbols(&["AAPL", "^GDAXI"]));
        let mut projector = projector();
        projector.rebuild(&registry.snapshot().unwrap()).unwrap();
        projector.apply_quotes(0, &[Quote::Price(3.0), Quote::Price(4.0)]).unwrap();

        let handle = projector.rows()[1].handle;
        assert_eq!(projector.symbol_for_row(handle).unwrap().as_str(), "^GDAXI");
    }

    #[test]
    fn empty_set_builds_empty_menu() {
        let registry = SymbolRegistry::new(Vec::new());
        let mut projector = projector();
        projector.rebuild(&registry.snapshot().unwrap()).unwrap();
        assert!(projector.rows().is_empty());
        assert_eq!(projector.apply_quotes(0, &[]).unwrap(), 0);
    }

    /// Creates `capacity` rows, then fails.
    struct FullSurface {
        inner: MemorySurface,
        capacity: usize,
    }

    impl RowSurface for FullSurface {
        type Handle = <MemorySurface as RowSurface>::Handle;

        fn create_row(&mut self, initial_text: &str) -> Result<Self::Handle, IndicatorError> {
            if self.inner.texts().len() >= self.capacity {
                return Err(IndicatorError::UiDispatch("menu is full".to_string()));
            }
            self.inner.create_row(initial_text)
        }

        fn set_row_text(&mut self, row: Self::Handle, text: &str) -> Result<(), IndicatorError> {
            self.inner.set_row_text(row, text)
        }

        fn row_text(&self, row: Self::Handle) -> Option<&str> {
            self.inner.row_text(row)
        }

        fn clear_all_rows(&mut self) {
            self.inner.clear_all_rows();
        }
    }

    #[test]
    fn failed_rebuild_leaves_an_empty_menu() {
        let registry = SymbolRegistry::new(symbols(&["AAPL", "GOOG", "MSFT"]));
        let surface = FullSurface {
            inner: MemorySurface::new(),
            capacity: 2,
        };
        let mut projector = MenuProjector::new(surface, Box::new(GlyphTableMeasurer::new()));
        assert!(projector.rebuild(&registry.snapshot().unwrap()).is_err());
        assert!(projector.rows().is_empty());
        assert!(projector.surface().inner.texts().is_empty());
        assert_eq!(projector.epoch(), None);

        // Later cycles find nothing to update instead of failing.
        assert_eq!(projector.apply_quotes(0, &[Quote::Price(1.0); 3]).unwrap(), 0);
    }

    #[test]
    fn widest_row_has_single_pad() {
        let registry = SymbolRegistry::new(symbols(&["AAPL", "GOOG"]));
        let mut projector = projector();
        projector.rebuild(&registry.snapshot().unwrap()).unwrap();
        let goog = &projector.surface().texts()[1];
        let expected = format!("GOOG{}\t???", PAD_CHAR);
        assert_eq!(goog, &expected);
    }
}
