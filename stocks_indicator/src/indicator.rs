//! The indicator: UI-thread owner of the menu, wired to the refresh worker.
//!
//! `Indicator` holds everything that must only be touched from the UI thread
//! (the menu projector and its surface) together with the handles it needs to
//! drive the background side (the shared symbol registry and the scheduler).
//! Refreshed quotes come back as callbacks queued through the `UiDispatcher`
//! and are applied in `QuoteTarget::apply_refresh`.

use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use stocks_common::config::ConfigSource;
use stocks_common::{Configuration, IndicatorError, Symbol};

use crate::dispatch::UiDispatcher;
use crate::events::IndicatorEvent;
use crate::fetcher::QuoteFetcher;
use crate::launcher::UrlLauncher;
use crate::menu::projector::MenuProjector;
use crate::menu::surface::RowSurface;
use crate::model::measure::WidthMeasurer;
use crate::model::registry::SymbolRegistry;
use crate::scheduler::{QuoteTarget, RefreshScheduler, RefreshedQuotes};

/// Collaborators the indicator is built from.
pub struct IndicatorParts<S> {
    /// Configuration provider, read at startup and on reload.
    pub config_source: Box<dyn ConfigSource>,
    /// Menu rows of the host.
    pub surface: S,
    /// Text measurement for the default menu font.
    pub measurer: Box<dyn WidthMeasurer>,
    /// Quote source.
    pub fetcher: Arc<dyn QuoteFetcher>,
    /// Opener for chart pages.
    pub launcher: Box<dyn UrlLauncher>,
}

/// Status-bar stock indicator.
pub struct Indicator<S: RowSurface + 'static> {
    config_source: Box<dyn ConfigSource>,
    config: Configuration,
    registry: SymbolRegistry,
    projector: MenuProjector<S>,
    scheduler: RefreshScheduler<Indicator<S>>,
    launcher: Box<dyn UrlLauncher>,
    last_update: Option<DateTime<Local>>,
}

impl<S: RowSurface + 'static> Indicator<S> {
    /// Loads the configuration and builds the menu. Quotes are not fetched
    /// until `start`.
    pub fn new(
        parts: IndicatorParts<S>,
        dispatcher: UiDispatcher<Indicator<S>>,
    ) -> Result<Self, IndicatorError> {
        let config = parts.config_source.load_or_default();
        let registry = SymbolRegistry::new(config.symbols.clone());
        let mut projector = MenuProjector::new(parts.surface, parts.measurer);
        projector.rebuild(&registry.snapshot()?)?;
        let scheduler = RefreshScheduler::new(&config, registry.clone(), parts.fetcher, dispatcher);

        Ok(Self {
            config_source: parts.config_source,
            config,
            registry,
            projector,
            scheduler,
            launcher: parts.launcher,
            last_update: None,
        })
    }

    /// Starts the periodic refresh with an immediate first cycle.
    pub fn start(&mut self) -> Result<(), IndicatorError> {
        self.scheduler.start()
    }

    /// Replaces the tracked symbols. The menu is rebuilt from scratch with
    /// fresh layout metrics, and a refresh is requested for the new rows.
    /// Quotes still in flight for the old list are discarded when they arrive.
    pub fn replace_symbols(&mut self, symbols: Vec<Symbol>) -> Result<(), IndicatorError> {
        self.rebuild_menu(symbols)?;
        self.scheduler.tick()
    }

    /// Injects a new configuration: replaces the symbols, then restarts the
    /// timer with the new interval so the first cycle already uses the new list.
    pub fn apply_configuration(&mut self, config: Configuration) -> Result<(), IndicatorError> {
        self.rebuild_menu(config.symbols.clone())?;
        self.config = config;
        self.scheduler.reconfigure(&self.config)
    }

    fn rebuild_menu(&mut self, symbols: Vec<Symbol>) -> Result<(), IndicatorError> {
        let set = self.registry.replace(symbols)?;
        self.projector.rebuild(&set)
    }

    /// Handles one host event. Returns `Break` when the UI loop should end.
    pub fn handle_event(&mut self, event: IndicatorEvent<S::Handle>) -> ControlFlow<()> {
        let result = match event {
            IndicatorEvent::Tick => self.scheduler.tick(),
            IndicatorEvent::RowActivated(handle) => match self.projector.symbol_for_row(handle) {
                Ok(symbol) => return self.handle_event(IndicatorEvent::SymbolSelected(symbol)),
                Err(e) => Err(e),
            },
            IndicatorEvent::SymbolSelected(symbol) => self.open_chart(&symbol),
            IndicatorEvent::ReplaceSymbols(symbols) => self.replace_symbols(symbols),
            IndicatorEvent::ReloadConfiguration => {
                let config = self.config_source.load_or_default();
                self.apply_configuration(config)
            }
            IndicatorEvent::Quit => {
                self.shutdown();
                return ControlFlow::Break(());
            }
        };
        if let Err(e) = result {
            warn!("Event not handled: {}", e);
        }
        ControlFlow::Continue(())
    }

    /// Stops refreshing and clears the menu.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        self.projector.clear();
        info!("Indicator shut down");
    }

    fn open_chart(&self, symbol: &Symbol) -> Result<(), IndicatorError> {
        let url = self.config.chart_url_for(symbol);
        debug!("Symbol {} selected", symbol);
        self.launcher.open(&url)
    }

    /// Active configuration.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Shared symbol list.
    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// Menu projection.
    pub fn projector(&self) -> &MenuProjector<S> {
        &self.projector
    }

    /// Refresh scheduler.
    pub fn scheduler(&self) -> &RefreshScheduler<Indicator<S>> {
        &self.scheduler
    }

    /// Completion time of the last applied refresh.
    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }
}

impl<S: RowSurface + 'static> QuoteTarget for Indicator<S> {
    fn apply_refresh(&mut self, refresh: RefreshedQuotes) {
        match self.projector.apply_quotes(refresh.epoch, &refresh.quotes) {
            Ok(rows) => {
                self.last_update = Some(refresh.fetched_at);
                debug!(
                    "Applied {} quotes at {}",
                    rows,
                    refresh.fetched_at.format("%H:%M:%S")
                );
            }
            Err(IndicatorError::StaleSnapshot { expected, actual }) => {
                debug!(
                    "Discarding quotes for symbol list epoch {} (menu is at {})",
                    actual, expected
                );
            }
            Err(e) => error!("Menu update failed: {}", e),
        }
    }
}
