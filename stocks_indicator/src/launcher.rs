//! Opening chart pages for selected symbols.
use log::info;
use stocks_common::IndicatorError;

/// Opens URLs outside the indicator.
pub trait UrlLauncher {
    /// Opens `url` without waiting for the opened application.
    fn open(&self, url: &str) -> Result<(), IndicatorError>;
}

/// Hands the URL to the desktop's default opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl UrlLauncher for SystemLauncher {
    fn open(&self, url: &str) -> Result<(), IndicatorError> {
        open::that_detached(url)?;
        info!("Opened {}", url);
        Ok(())
    }
}

/// Only logs the URL. Used when no desktop is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLauncher;

impl UrlLauncher for LogLauncher {
    fn open(&self, url: &str) -> Result<(), IndicatorError> {
        info!("Chart: {}", url);
        Ok(())
    }
}
