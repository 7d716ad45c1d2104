// Pulse sources - where button presses come from, and the guard that owns one

use crate::gesture::debounce::Debouncer;
use crate::gesture::switch::GestureSwitch;
use std::time::Duration;

/// Called once per raw edge, possibly from an interrupt thread
pub type PulseCallback = Box<dyn Fn() + Send + Sync>;

/// Errors from pulse sources
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PulseSourceError {
    /// The hardware (or driver) is not present
    #[error("Pulse source unavailable: {0}")]
    Unavailable(String),
    #[error("Pulse source already started")]
    AlreadyStarted,
    #[error("Pulse source I/O error: {0}")]
    Io(String),
}

/// Trait for edge-detection backends (allows mocking in tests)
pub trait PulseSource: Send {
    /// Begin delivering edges to `callback`
    fn start(&mut self, callback: PulseCallback) -> Result<(), PulseSourceError>;
    /// Stop delivering edges and release the hardware
    fn stop(&mut self) -> Result<(), PulseSourceError>;
}

/// Owns a started pulse source feeding a gesture switch.
///
/// Edges pass through a `Debouncer` before reaching the switch. Closing
/// (explicitly or by drop, including during unwinding) stops the source and
/// closes the switch.
pub struct PulseListener {
    source: Box<dyn PulseSource>,
    switch: GestureSwitch,
    released: bool,
}

impl PulseListener {
    /// Start `source`, debounced by `debounce`, feeding `switch`
    pub fn open(
        mut source: Box<dyn PulseSource>,
        switch: GestureSwitch,
        debounce: Duration,
    ) -> Result<Self, PulseSourceError> {
        let debouncer = Debouncer::new(debounce);
        let target = switch.clone();
        source.start(Box::new(move || {
            if debouncer.accept_now() {
                target.on_pulse();
            } else {
                crate::trace!("Bounce dropped");
            }
        }))?;

        crate::info!("Pulse listener started (debounce {:?})", debounce);
        Ok(Self {
            source,
            switch,
            released: false,
        })
    }

    pub fn switch(&self) -> &GestureSwitch {
        &self.switch
    }

    /// Stop the source and close the switch, reporting a failed stop
    pub fn close(mut self) -> Result<(), PulseSourceError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), PulseSourceError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let stopped = self.source.stop();
        self.switch.close();
        crate::info!("Pulse listener stopped");
        stopped
    }
}

impl Drop for PulseListener {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            crate::warn!("Failed to stop pulse source: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
