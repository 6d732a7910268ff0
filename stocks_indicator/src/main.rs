//! Stocks Indicator — periodically fetches stock quotes and shows them as an
//! aligned menu, one row per symbol.
//!
//! The binary wires together:
//! - `Indicator` — owns the menu on the UI (main) thread and handles events;
//! - `RefreshScheduler` — background worker running the fetch cycle on a timer;
//! - `UiDispatcher`/`UiQueue` — the only channel from the worker back to the
//!   UI thread;
//! - `ConsoleSurface` — prints the menu; stdin commands act as menu clicks.
//!
//! Usage example (CLI):
//! ```bash
//! stocks_indicator --symbols ./symbols.txt --interval 30 --field last
//! ```
//!
//! Quotes come from a simulated source; `--failure-rate` and `--missing-rate`
//! inject whole-batch and per-symbol failures.
#![warn(missing_docs)]
mod args;
mod console;
mod dispatch;
mod events;
mod fetcher;
mod indicator;
mod launcher;
mod menu;
mod model;
mod scheduler;

use std::sync::Arc;

use clap::Parser;
use crossbeam_channel::{Receiver, select, unbounded};
use log::{error, info, warn};
use stocks_common::IndicatorError;
use stocks_common::Result;

use crate::args::{Args, CliConfig, FontKind};
use crate::console::{ConsoleCommand, ConsoleSurface, HELP, spawn_stdin_reader};
use crate::dispatch::{UI_QUEUE_CAPACITY, UiQueue, ui_queue};
use crate::events::IndicatorEvent;
use crate::fetcher::SimulatedFetcher;
use crate::indicator::{Indicator, IndicatorParts};
use crate::launcher::{LogLauncher, SystemLauncher, UrlLauncher};
use crate::menu::surface::RowId;
use crate::model::measure::{GlyphTableMeasurer, MonospaceMeasurer, WidthMeasurer};

type ConsoleIndicator = Indicator<ConsoleSurface>;

fn main() -> Result<(), IndicatorError> {
    init_logger();
    let args = Args::parse();

    let (command_tx, command_rx) = unbounded::<ConsoleCommand>();
    {
        let command_tx = command_tx.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = command_tx.send(ConsoleCommand::Quit);
        }) {
            warn!("Ctrl+C handler not installed: {}", e);
        }
    }
    spawn_stdin_reader(command_tx)?;

    let launcher: Box<dyn UrlLauncher> = if args.no_open {
        Box::new(LogLauncher)
    } else {
        Box::new(SystemLauncher)
    };
    let (dispatcher, queue) = ui_queue(UI_QUEUE_CAPACITY);
    let mut indicator = Indicator::new(
        IndicatorParts {
            config_source: Box::new(CliConfig::from(&args)),
            surface: ConsoleSurface::new(),
            measurer: measurer(&args),
            fetcher: Arc::new(SimulatedFetcher::new(args.failure_rate, args.missing_rate)),
            launcher,
        },
        dispatcher,
    )?;

    info!(
        "Tracking {} symbols",
        indicator.registry().snapshot()?.len()
    );
    indicator.start()?;
    run_ui_loop(&mut indicator, &queue, &command_rx);
    Ok(())
}

/// Runs queued UI callbacks and user commands on the calling thread until
/// a quit command arrives.
fn run_ui_loop(
    indicator: &mut ConsoleIndicator,
    queue: &UiQueue<ConsoleIndicator>,
    commands: &Receiver<ConsoleCommand>,
) {
    loop {
        select! {
            recv(queue.receiver()) -> task => match task {
                Ok(task) => {
                    task(indicator);
                    queue.drain(indicator);
                }
                Err(e) => {
                    error!("UI queue closed: {}", e);
                    indicator.shutdown();
                    break;
                }
            },
            recv(commands) -> command => {
                let command = command.unwrap_or(ConsoleCommand::Quit);
                if let Some(event) = command_event(indicator, command) {
                    if indicator.handle_event(event).is_break() {
                        break;
                    }
                }
            }
        }
    }
}

fn command_event(
    indicator: &ConsoleIndicator,
    command: ConsoleCommand,
) -> Option<IndicatorEvent<RowId>> {
    match command {
        ConsoleCommand::Open(number) => match indicator.projector().surface().row(number) {
            Some(row) => Some(IndicatorEvent::RowActivated(row)),
            None => {
                println!("no row {}", number);
                None
            }
        },
        ConsoleCommand::Symbols(symbols) => Some(IndicatorEvent::ReplaceSymbols(symbols)),
        ConsoleCommand::Refresh => Some(IndicatorEvent::Tick),
        ConsoleCommand::Reload => Some(IndicatorEvent::ReloadConfiguration),
        ConsoleCommand::Quit => Some(IndicatorEvent::Quit),
        ConsoleCommand::Status => {
            print_status(indicator);
            None
        }
        ConsoleCommand::Help => {
            println!("{}", HELP);
            None
        }
    }
}

fn print_status(indicator: &ConsoleIndicator) {
    let config = indicator.config();
    let projector = indicator.projector();
    let last_update = indicator
        .last_update()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "{} rows (list epoch {:?}), {} price every {}s, refresh {:?}, last update {}",
        projector.rows().len(),
        projector.epoch(),
        config.quote_field,
        indicator.scheduler().interval().as_secs(),
        indicator.scheduler().phase(),
        last_update
    );
}

/// Proportional menu font by default; the terminal itself is monospace.
fn measurer(args: &Args) -> Box<dyn WidthMeasurer> {
    match args.font {
        FontKind::Proportional => Box::new(GlyphTableMeasurer::new()),
        FontKind::Monospace => Box::new(MonospaceMeasurer { advance: 8 }),
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
