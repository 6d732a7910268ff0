//!
//! Common types and utilities shared by the stocks indicator.
//!
//! This crate aggregates:
//! - `error` — unified error type `IndicatorError` used across the workspace.
//! - `result` — handy `Result<T, IndicatorError>` alias.
//! - `symbols` — ticker symbols and parsing helpers.
//! - `quote` — fetched quote values and the requested price field.
//! - `config` — indicator configuration and the sources it is loaded from.
#![warn(missing_docs)]
pub mod config;
pub mod error;
pub mod quote;
pub mod result;
pub mod symbols;

pub use config::Configuration;
pub use error::IndicatorError;
pub use quote::{Quote, QuoteField};
pub use result::Result;
pub use symbols::Symbol;
