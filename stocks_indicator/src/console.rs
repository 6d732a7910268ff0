//! Terminal host for the indicator.
//!
//! Without a tray toolkit, the menu is printed to stdout after every change and
//! commands typed on stdin stand in for menu activation.

use std::io::{self, BufRead};
use std::str::FromStr;
use std::thread;

use chrono::Local;
use crossbeam_channel::Sender;
use log::{debug, info};
use stocks_common::symbols::SymbolParser;
use stocks_common::{IndicatorError, Symbol};

use crate::menu::surface::{MemorySurface, RowId, RowSurface};

/// Usage text printed by `help`.
pub const HELP: &str =
    "commands: open <row>, symbols <list>, refresh, reload, status, quit, help";

/// Menu printed to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    rows: MemorySurface,
}

impl ConsoleSurface {
    /// Creates an empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the 1-based menu row `number`.
    pub fn row(&self, number: usize) -> Option<RowId> {
        number.checked_sub(1).and_then(|index| self.rows.handle_at(index))
    }

    /// Menu as printed, one line per row prefixed with its number.
    pub fn render(&self) -> String {
        let mut out = format!("[{}] stocks\n", Local::now().format("%H:%M:%S"));
        if self.rows.texts().is_empty() {
            out.push_str("  (no symbols)\n");
        }
        for (index, text) in self.rows.texts().iter().enumerate() {
            out.push_str(&format!("{:>3}  {}\n", index + 1, text));
        }
        out
    }
}

impl RowSurface for ConsoleSurface {
    type Handle = RowId;

    fn create_row(&mut self, initial_text: &str) -> Result<RowId, IndicatorError> {
        self.rows.create_row(initial_text)
    }

    fn set_row_text(&mut self, row: RowId, text: &str) -> Result<(), IndicatorError> {
        self.rows.set_row_text(row, text)
    }

    fn row_text(&self, row: RowId) -> Option<&str> {
        self.rows.row_text(row)
    }

    fn clear_all_rows(&mut self) {
        self.rows.clear_all_rows();
    }

    fn present(&mut self) {
        print!("{}", self.render());
    }
}

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Activate the 1-based menu row.
    Open(usize),
    /// Replace the tracked symbols.
    Symbols(Vec<Symbol>),
    /// Refresh quotes now.
    Refresh,
    /// Reload the configuration files.
    Reload,
    /// Print refresh state.
    Status,
    /// Print the usage.
    Help,
    /// Exit.
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = IndicatorError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if let Some(list) = line.strip_prefix("symbols") {
            if list.is_empty() || list.starts_with(char::is_whitespace) {
                return Symbol::parse_from_reader(list.as_bytes()).map(ConsoleCommand::Symbols);
            }
        }
        let mut words = line.split_whitespace();
        let command = match (words.next(), words.next()) {
            (Some("open" | "o"), Some(row)) => row
                .parse()
                .map(ConsoleCommand::Open)
                .map_err(|_| IndicatorError::Configuration(format!("not a row number: {}", row)))?,
            (Some("refresh" | "r"), None) => ConsoleCommand::Refresh,
            (Some("reload"), None) => ConsoleCommand::Reload,
            (Some("status" | "s"), None) => ConsoleCommand::Status,
            (Some("help" | "?"), None) => ConsoleCommand::Help,
            (Some("quit" | "q" | "exit"), None) => ConsoleCommand::Quit,
            _ => return Err(IndicatorError::Configuration(format!("unknown command: {:?}", line))),
        };
        if words.next().is_some() {
            return Err(IndicatorError::Configuration(format!("unknown command: {:?}", line)));
        }
        Ok(command)
    }
}

/// Reads commands from stdin on a background thread until EOF.
pub fn spawn_stdin_reader(commands: Sender<ConsoleCommand>) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(command) => {
                        if commands.send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => println!("{} ({})", e, HELP),
                }
            }
            debug!("stdin closed");
        })
        .inspect(|_| info!("Reading commands from stdin. {}", HELP))
}
