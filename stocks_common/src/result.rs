//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `IndicatorError`, so functions can simply return `Result<T>`.
use crate::error::IndicatorError;

/// Workspace-wide `Result` alias with `IndicatorError` as the default error.
pub type Result<T, E = IndicatorError> = std::result::Result<T, E>;
