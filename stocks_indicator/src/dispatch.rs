//! Hand-off of work to the UI thread.
//!
//! Background threads never touch menu rows. They queue a callback with
//! `UiDispatcher::run_on_ui_thread`; the UI thread drains the `UiQueue` and runs
//! each callback against the state it owns. The queue is bounded and sending
//! never blocks: when it is full the callback is dropped and the caller gets
//! `IndicatorError::UiDispatch`.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use stocks_common::IndicatorError;

/// Default number of pending UI callbacks.
pub const UI_QUEUE_CAPACITY: usize = 64;

/// Callback run on the UI thread against the UI-owned state `T`.
pub type UiTask<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Sending half, cloned into background threads.
pub struct UiDispatcher<T> {
    tx: Sender<UiTask<T>>,
}

impl<T> Clone for UiDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Receiving half, owned by the UI thread.
pub struct UiQueue<T> {
    rx: Receiver<UiTask<T>>,
}

/// Creates a dispatcher/queue pair holding at most `capacity` callbacks.
pub fn ui_queue<T>(capacity: usize) -> (UiDispatcher<T>, UiQueue<T>) {
    let (tx, rx) = bounded(capacity);
    (UiDispatcher { tx }, UiQueue { rx })
}

impl<T> UiDispatcher<T> {
    /// Queues `task` for the UI thread without waiting for it to run.
    pub fn run_on_ui_thread<F>(&self, task: F) -> Result<(), IndicatorError>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.tx.try_send(Box::new(task)).map_err(|e| match e {
            TrySendError::Full(_) => IndicatorError::UiDispatch("UI queue is full".to_string()),
            TrySendError::Disconnected(_) => {
                IndicatorError::UiDispatch("UI thread is gone".to_string())
            }
        })
    }
}

impl<T> UiQueue<T> {
    /// Channel to wait on, e.g. in a `select!` of the UI loop.
    pub fn receiver(&self) -> &Receiver<UiTask<T>> {
        &self.rx
    }

    /// Runs every pending callback against `target`; returns how many ran.
    pub fn drain(&self, target: &mut T) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(target);
            ran += 1;
        }
        ran
    }
}
