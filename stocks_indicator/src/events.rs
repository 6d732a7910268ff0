//! Events delivered to the indicator on the UI thread.
use stocks_common::Symbol;

/// Everything the host can ask the indicator to do.
///
/// `H` is the row handle type of the host surface.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorEvent<H> {
    /// Refresh quotes now instead of waiting for the timer.
    Tick,
    /// A menu row was activated; resolved to `SymbolSelected` from its label.
    RowActivated(H),
    /// Open the chart of a symbol.
    SymbolSelected(Symbol),
    /// Track a new symbol list.
    ReplaceSymbols(Vec<Symbol>),
    /// The preferences collaborator returned; load the configuration again.
    ReloadConfiguration,
    /// Stop refreshing and leave the UI loop.
    Quit,
}
