//! The UI row surface the menu is projected onto.
//!
//! The host toolkit owns the actual menu widgets; the indicator only needs to
//! create rows, change their text, read it back and clear them. Every method is
//! called on the UI thread.

use std::fmt;

use stocks_common::IndicatorError;

/// Menu rows of the host toolkit.
pub trait RowSurface {
    /// Handle to one row; stays valid until `clear_all_rows`.
    type Handle: Copy + Eq + fmt::Debug;

    /// Appends a row showing `initial_text`.
    fn create_row(&mut self, initial_text: &str) -> Result<Self::Handle, IndicatorError>;

    /// Replaces the text of `row`.
    fn set_row_text(&mut self, row: Self::Handle, text: &str) -> Result<(), IndicatorError>;

    /// Current text of `row`, `None` for unknown handles.
    fn row_text(&self, row: Self::Handle) -> Option<&str>;

    /// Removes every row.
    fn clear_all_rows(&mut self);

    /// Called after a batch of changes so the host can repaint.
    fn present(&mut self) {}
}

/// Row handle of `MemorySurface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId {
    generation: u32,
    index: usize,
}

/// Rows kept in memory. Backs the console host and the tests.
///
/// Handles from before the last `clear_all_rows` are rejected with
/// `IndicatorError::UiDispatch`.
#[derive(Debug, Default)]
pub struct MemorySurface {
    rows: Vec<String>,
    generation: u32,
}

impl MemorySurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts of all rows, top to bottom.
    pub fn texts(&self) -> &[String] {
        &self.rows
    }

    /// Handle of the row at `index`, if it exists.
    pub fn handle_at(&self, index: usize) -> Option<RowId> {
        (index < self.rows.len()).then_some(RowId {
            generation: self.generation,
            index,
        })
    }
}

impl RowSurface for MemorySurface {
    type Handle = RowId;

    fn create_row(&mut self, initial_text: &str) -> Result<RowId, IndicatorError> {
        self.rows.push(initial_text.to_string());
        Ok(RowId {
            generation: self.generation,
            index: self.rows.len() - 1,
        })
    }

    fn set_row_text(&mut self, row: RowId, text: &str) -> Result<(), IndicatorError> {
        if row.generation != self.generation {
            return Err(IndicatorError::UiDispatch(format!("stale row handle {:?}", row)));
        }
        match self.rows.get_mut(row.index) {
            Some(slot) => {
                text.clone_into(slot);
                Ok(())
            }
            None => Err(IndicatorError::UiDispatch(format!("no row {:?}", row))),
        }
    }

    fn row_text(&self, row: RowId) -> Option<&str> {
        if row.generation != self.generation {
            return None;
        }
        self.rows.get(row.index).map(String::as_str)
    }

    fn clear_all_rows(&mut self) {
        self.rows.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}
