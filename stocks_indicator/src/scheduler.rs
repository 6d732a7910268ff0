//! Periodic quote refresh.
//!
//! `RefreshScheduler` owns a background worker thread that runs one refresh
//! cycle eagerly on start and then one per timer tick:
//!
//! - take an atomic snapshot of the symbol set (symbols and epoch);
//! - fetch quotes for the snapshot off the UI thread;
//! - queue the result to the UI thread through the `UiDispatcher`.
//!
//! Failure handling:
//! - a failed batch is delivered as all `Quote::Unknown` and the timer keeps
//!   running;
//! - a short or long batch is padded with `Quote::Unknown` or truncated, so one
//!   bad entry only affects its own row;
//! - a full or closed UI queue drops this cycle only.
//!
//! Every `start` begins a new run. Results carry the run they were produced by
//! and are discarded on the UI thread when the run is no longer current, so
//! nothing reaches the menu after `stop` returns. `stop` never waits for the
//! worker: a fetch in flight finishes on the detached thread and its result is
//! dropped. Whether the symbol set changed in the meantime is decided by the
//! receiver from the snapshot epoch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender, select, tick, unbounded};
use log::{debug, error, info, warn};
use stocks_common::config::MIN_UPDATE_INTERVAL_SECS;
use stocks_common::{Configuration, IndicatorError, Quote, QuoteField};

use crate::dispatch::UiDispatcher;
use crate::fetcher::QuoteFetcher;
use crate::model::registry::{SymbolRegistry, SymbolSet};

/// Quotes of one refresh cycle, on their way to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshedQuotes {
    /// Epoch of the symbol set the quotes were fetched for.
    pub epoch: u64,
    /// One quote per symbol of that set.
    pub quotes: Vec<Quote>,
    /// When the fetch completed.
    pub fetched_at: DateTime<Local>,
}

/// UI-owned state that receives refreshed quotes.
pub trait QuoteTarget {
    /// Renders the quotes of one cycle. Runs on the UI thread.
    fn apply_refresh(&mut self, refresh: RefreshedQuotes);
}

/// Where the current cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Waiting for the next tick.
    Idle,
    /// Quotes are being fetched by the worker.
    Fetching,
    /// Quotes are queued for the UI thread.
    Rendering,
}

enum SchedulerCommand {
    Tick,
    Stop,
}

struct Shared {
    run: AtomicU64,
    phase: Mutex<CyclePhase>,
}

impl Shared {
    fn set_phase(&self, phase: CyclePhase) {
        match self.phase.lock() {
            Ok(mut current) => *current = phase,
            Err(poisoned) => *poisoned.into_inner() = phase,
        }
    }

    /// Sets the phase only while `run` is current. The run is checked under
    /// the phase lock, so a stopped run can never overwrite the phase of the
    /// next one.
    fn set_phase_for(&self, run: u64, phase: CyclePhase) {
        let mut current = match self.phase.lock() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.is_current(run) {
            *current = phase;
        }
    }

    fn is_current(&self, run: u64) -> bool {
        self.run.load(Ordering::SeqCst) == run
    }
}

struct Worker {
    commands: Sender<SchedulerCommand>,
}

/// Timer-driven fetch/render cycle.
pub struct RefreshScheduler<T: QuoteTarget + 'static> {
    registry: SymbolRegistry,
    fetcher: Arc<dyn QuoteFetcher>,
    dispatcher: UiDispatcher<T>,
    interval: Duration,
    field: QuoteField,
    shared: Arc<Shared>,
    worker: Option<Worker>,
}

impl<T: QuoteTarget + 'static> RefreshScheduler<T> {
    /// Creates a stopped scheduler using the interval and quote field of
    /// `config`.
    pub fn new(
        config: &Configuration,
        registry: SymbolRegistry,
        fetcher: Arc<dyn QuoteFetcher>,
        dispatcher: UiDispatcher<T>,
    ) -> Self {
        Self::with_interval(config.update_interval(), config.quote_field, registry, fetcher, dispatcher)
    }

    /// Like `new` with an explicit interval. A zero interval is replaced by
    /// `MIN_UPDATE_INTERVAL_SECS`.
    pub fn with_interval(
        interval: Duration,
        field: QuoteField,
        registry: SymbolRegistry,
        fetcher: Arc<dyn QuoteFetcher>,
        dispatcher: UiDispatcher<T>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            dispatcher,
            interval: sane_interval(interval),
            field,
            shared: Arc::new(Shared {
                run: AtomicU64::new(0),
                phase: Mutex::new(CyclePhase::Idle),
            }),
            worker: None,
        }
    }

    /// Runs one cycle immediately, then one per interval. Does nothing if
    /// already running.
    pub fn start(&mut self) -> Result<(), IndicatorError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let run = self.shared.run.fetch_add(1, Ordering::SeqCst) + 1;
        let (commands, command_rx) = unbounded();
        let cycle = Cycle {
            run,
            registry: self.registry.clone(),
            fetcher: Arc::clone(&self.fetcher),
            dispatcher: self.dispatcher.clone(),
            field: self.field,
            shared: Arc::clone(&self.shared),
        };
        let interval = self.interval;
        thread::Builder::new()
            .name("quote-refresh".to_string())
            .spawn(move || worker_loop(cycle, interval, command_rx))?;

        info!(
            "Quote refresh started: every {}s, {} price",
            interval.as_secs(),
            self.field
        );
        self.worker = Some(Worker { commands });
        Ok(())
    }

    /// Disarms the timer and returns without waiting for the worker. A fetch
    /// in flight finishes in the background and its result is discarded.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shared.run.fetch_add(1, Ordering::SeqCst);
        self.shared.set_phase(CyclePhase::Idle);
        if worker.commands.send(SchedulerCommand::Stop).is_err() {
            warn!("Quote refresh worker already exited");
        }
        info!("Quote refresh stopped");
    }

    /// Requests an immediate cycle from the running worker.
    pub fn tick(&self) -> Result<(), IndicatorError> {
        match &self.worker {
            Some(worker) => worker
                .commands
                .send(SchedulerCommand::Tick)
                .map_err(|e| IndicatorError::UiDispatch(format!("refresh worker is gone: {}", e))),
            None => {
                debug!("Tick ignored, quote refresh is stopped");
                Ok(())
            }
        }
    }

    /// Applies a new interval and quote field, restarting the timer if it was
    /// running.
    pub fn reconfigure(&mut self, config: &Configuration) -> Result<(), IndicatorError> {
        let was_running = self.is_running();
        self.stop();
        self.interval = sane_interval(config.update_interval());
        self.field = config.quote_field;
        if was_running {
            self.start()?;
        }
        Ok(())
    }

    /// Returns `true` between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Interval between two ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current cycle phase.
    pub fn phase(&self) -> CyclePhase {
        match self.shared.phase.lock() {
            Ok(phase) => *phase,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl<T: QuoteTarget + 'static> Drop for RefreshScheduler<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn sane_interval(interval: Duration) -> Duration {
    if interval.is_zero() {
        warn!(
            "Update interval must be positive, using {}s",
            MIN_UPDATE_INTERVAL_SECS
        );
        Duration::from_secs(MIN_UPDATE_INTERVAL_SECS)
    } else {
        interval
    }
}

fn worker_loop<T: QuoteTarget + 'static>(
    cycle: Cycle<T>,
    interval: Duration,
    commands: Receiver<SchedulerCommand>,
) {
    cycle.refresh();
    let ticker = tick(interval);

    while cycle.shared.is_current(cycle.run) {
        select! {
            recv(commands) -> cmd => match cmd {
                Ok(SchedulerCommand::Tick) => cycle.refresh(),
                Ok(SchedulerCommand::Stop) | Err(_) => break,
            },
            recv(ticker) -> _ => cycle.refresh(),
        }
    }
    debug!("Quote refresh worker for run {} exiting", cycle.run);
}

/// Everything one run of the worker needs.
struct Cycle<T> {
    run: u64,
    registry: SymbolRegistry,
    fetcher: Arc<dyn QuoteFetcher>,
    dispatcher: UiDispatcher<T>,
    field: QuoteField,
    shared: Arc<Shared>,
}

impl<T: QuoteTarget + 'static> Cycle<T> {
    fn refresh(&self) {
        if !self.shared.is_current(self.run) {
            return;
        }
        let set = match self.registry.snapshot() {
            Ok(set) => set,
            Err(e) => {
                error!("Cannot read the symbol list: {}", e);
                return;
            }
        };
        if set.is_empty() {
            debug!("No symbols to refresh");
            return;
        }

        self.shared.set_phase_for(self.run, CyclePhase::Fetching);
        let quotes = fetch_quotes(self.fetcher.as_ref(), &set, self.field);

        if !self.shared.is_current(self.run) {
            debug!("Scheduler stopped during fetch, discarding quotes");
            return;
        }

        let refresh = RefreshedQuotes {
            epoch: set.epoch,
            quotes,
            fetched_at: Local::now(),
        };
        let run = self.run;
        let shared = Arc::clone(&self.shared);
        self.shared.set_phase_for(run, CyclePhase::Rendering);
        let dispatched = self.dispatcher.run_on_ui_thread(move |target: &mut T| {
            if shared.is_current(run) {
                target.apply_refresh(refresh);
            } else {
                debug!("Discarding quotes of stopped run {}", run);
            }
            shared.set_phase_for(run, CyclePhase::Idle);
        });
        if let Err(e) = dispatched {
            error!("Dropping quote update: {}", e);
            self.shared.set_phase_for(run, CyclePhase::Idle);
        }
    }
}

/// Fetches quotes for `set`, mapping failures to `Quote::Unknown`.
pub fn fetch_quotes(fetcher: &dyn QuoteFetcher, set: &SymbolSet, field: QuoteField) -> Vec<Quote> {
    match fetcher.fetch(&set.symbols, field) {
        Ok(mut quotes) => {
            if quotes.len() != set.len() {
                warn!(
                    "Quote source returned {} quotes for {} symbols",
                    quotes.len(),
                    set.len()
                );
                quotes.resize(set.len(), Quote::Unknown);
            }
            quotes
        }
        Err(e) => {
            warn!("Quote fetch failed, retrying next cycle: {}", e);
            vec![Quote::Unknown; set.len()]
        }
    }
}
