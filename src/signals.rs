//! Lifecycle signals for the hosting UI shell.
//!
//! Observers subscribe to a broadcast channel and typically toggle a busy indicator
//! on `SavingStarted` / `SavingFinished`. Signals carry no payload.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

pub const DEFAULT_SIGNAL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSignal {
    SavingStarted,
    SavingFinished,
}

impl fmt::Display for SessionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SavingStarted => "saving-started",
            Self::SavingFinished => "saving-finished",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug)]
pub struct SignalBus {
    sender: broadcast::Sender<SessionSignal>,
    saving: AtomicBool,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_CAPACITY)
    }
}

impl SignalBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            saving: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.sender.subscribe()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    pub fn emit(&self, signal: SessionSignal) {
        // No subscribers is not an error.
        let _ = self.sender.send(signal);
    }

    /// Emits `SavingStarted` now and `SavingFinished` when the guard is dropped.
    pub fn begin_saving(&self) -> SavingGuard<'_> {
        self.saving.store(true, Ordering::Release);
        self.emit(SessionSignal::SavingStarted);
        SavingGuard { bus: self }
    }
}

/// Clears the saving state on drop, including when a save future is abandoned.
#[must_use = "dropping the guard immediately emits SavingFinished"]
pub struct SavingGuard<'a> {
    bus: &'a SignalBus,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.bus.saving.store(false, Ordering::Release);
        self.bus.emit(SessionSignal::SavingFinished);
    }
}
