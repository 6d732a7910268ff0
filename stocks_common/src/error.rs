//! Error types shared across the workspace.
//!
//! The `IndicatorError` enum covers configuration loading, symbol parsing, quote
//! fetching and the hand-off of menu updates to the UI thread. None of these are
//! fatal to the process: callers log them and recover locally.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type of the indicator.
#[derive(Error, Debug)]
pub enum IndicatorError {
    /// I/O error while reading configuration or symbol files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while decoding the JSON configuration.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Invalid configuration value; recovered with defaults by the caller.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A symbol that is empty or contains a reserved character.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// The quote source failed for the whole batch (network error, timeout).
    #[error("Quote fetch failed: {0}")]
    Fetch(String),

    /// The UI surface or its dispatch queue is unavailable.
    #[error("UI dispatch failed: {0}")]
    UiDispatch(String),

    /// Quotes were fetched for a symbol set that has since been replaced.
    #[error("Stale quotes for symbol set epoch {actual}, menu is at epoch {expected}")]
    StaleSnapshot {
        /// Epoch of the symbol set currently shown.
        expected: u64,
        /// Epoch the quotes were fetched against.
        actual: u64,
    },

    /// A menu row label the symbol could not be recovered from.
    #[error("Unrecognized menu row: {0:?}")]
    UnknownRow(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for IndicatorError {
    fn from(err: PoisonError<T>) -> Self {
        IndicatorError::MutexLock(err.to_string())
    }
}
