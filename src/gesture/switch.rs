// Gesture switch - classifies pulses into press-count gestures
//
// IDLE --pulse--> COUNTING(count = 1), one timer armed at started + window.
// Pulses before the deadline only increment the count; the timer is never
// re-armed. When the timer fires, the session's count selects one action
// from the table. A pulse after the deadline whose timer has not run yet
// resolves the old session immediately and starts a new one. A pulse at
// exactly the deadline still counts.

use crate::events::{GestureEvent, GestureEventEmitter};
use crate::gesture::table::{GestureConfigError, GestureTable};
use crate::voice_commands::executor::{invoke_action, ActionError, ActionResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// What happened to a resolved gesture
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// The action for `count` ran and succeeded
    Executed {
        count: usize,
        keyword: String,
        result: ActionResult,
    },
    /// The action for `count` ran and failed (or panicked)
    Failed {
        count: usize,
        keyword: String,
        error: ActionError,
    },
    /// No action for `count`
    Invalid { count: usize, table_len: usize },
}

#[derive(Debug)]
struct Session {
    id: u64,
    started: Instant,
    deadline: Instant,
    count: usize,
}

/// A session detached from the switch, waiting to be resolved
struct Pending {
    count: usize,
    table: GestureTable,
}

struct SwitchState {
    table: GestureTable,
    window: Duration,
    session: Option<Session>,
    /// Timer for the current session; at most one is live
    timer: Option<JoinHandle<()>>,
    next_session_id: u64,
    closed: bool,
}

impl SwitchState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn detach(&mut self) -> Option<Pending> {
        let session = self.session.take()?;
        Some(Pending {
            count: session.count,
            table: self.table.clone(),
        })
    }
}

struct SwitchInner {
    state: Mutex<SwitchState>,
    runtime: Handle,
    emitter: Arc<dyn GestureEventEmitter>,
}

/// Counts debounced pulses into gestures and runs the matching action.
///
/// Cheap to clone; clones share one state machine. `on_pulse` never blocks
/// on an action: actions run on the runtime after the lock is released.
#[derive(Clone)]
pub struct GestureSwitch {
    inner: Arc<SwitchInner>,
}

impl GestureSwitch {
    /// Create an idle switch whose timers and actions run on `runtime`
    pub fn new(
        runtime: Handle,
        table: GestureTable,
        window: Duration,
        emitter: Arc<dyn GestureEventEmitter>,
    ) -> Result<Self, GestureConfigError> {
        if window.is_zero() {
            return Err(GestureConfigError::ZeroWindow);
        }
        Ok(Self {
            inner: Arc::new(SwitchInner {
                state: Mutex::new(SwitchState {
                    table,
                    window,
                    session: None,
                    timer: None,
                    next_session_id: 0,
                    closed: false,
                }),
                runtime,
                emitter,
            }),
        })
    }

    /// Record a pulse arriving now
    pub fn on_pulse(&self) {
        self.on_pulse_at(Instant::now());
    }

    /// Record a pulse arriving at `now`
    pub fn on_pulse_at(&self, now: Instant) {
        let late = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            if state.closed {
                crate::trace!("Pulse ignored, gesture switch is closed");
                return;
            }

            match &mut state.session {
                Some(session) if now <= session.deadline => {
                    session.count += 1;
                    crate::debug!(
                        "Pulse {} ({:?} into the window)",
                        session.count,
                        now.saturating_duration_since(session.started)
                    );
                    None
                }
                Some(_) => {
                    state.cancel_timer();
                    let late = state.detach();
                    self.inner.start_session(state, now);
                    late
                }
                None => {
                    self.inner.start_session(state, now);
                    None
                }
            }
        };

        if let Some(pending) = late {
            crate::debug!("Late pulse, resolving previous gesture of {}", pending.count);
            let inner = self.inner.clone();
            self.inner.runtime.spawn(async move {
                inner.resolve(pending).await;
            });
        }
    }

    /// Resolve the counting session now, as if its timer fired.
    ///
    /// Returns None when idle.
    pub async fn on_timer_fire(&self) -> Option<GestureOutcome> {
        let pending = {
            let mut state = self.inner.state.lock();
            let pending = state.detach()?;
            state.cancel_timer();
            pending
        };
        Some(self.inner.resolve(pending).await)
    }

    /// Swap the table and window.
    ///
    /// Invalid input leaves the current configuration untouched. A session
    /// in progress is discarded without running an action.
    pub fn configure(&self, table: GestureTable, window: Duration) -> Result<(), GestureConfigError> {
        if window.is_zero() {
            return Err(GestureConfigError::ZeroWindow);
        }
        let discarded = {
            let mut state = self.inner.state.lock();
            state.cancel_timer();
            let discarded = state.detach();
            state.table = table;
            state.window = window;
            discarded
        };
        crate::info!("Gesture switch reconfigured (window {:?})", window);
        if let Some(pending) = discarded {
            self.inner.discarded(pending.count);
        }
        Ok(())
    }

    /// Stop counting for good. Later pulses are ignored.
    pub fn close(&self) {
        let discarded = {
            let mut state = self.inner.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.cancel_timer();
            state.detach()
        };
        crate::info!("Gesture switch closed");
        if let Some(pending) = discarded {
            self.inner.discarded(pending.count);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Press count of the session in progress, if any
    pub fn pending_count(&self) -> Option<usize> {
        self.inner.state.lock().session.as_ref().map(|s| s.count)
    }

    pub fn window(&self) -> Duration {
        self.inner.state.lock().window
    }
}

impl SwitchInner {
    /// Start a session at `now` and arm its timer. Caller holds the lock.
    fn start_session(self: &Arc<Self>, state: &mut SwitchState, now: Instant) {
        let id = state.next_session_id;
        state.next_session_id += 1;
        let deadline = now + state.window;
        state.session = Some(Session {
            id,
            started: now,
            deadline,
            count: 1,
        });

        let inner = self.clone();
        state.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            inner.on_deadline(id).await;
        }));
        crate::debug!("Gesture session {} started", id);
    }

    async fn on_deadline(&self, id: u64) {
        let pending = {
            let mut state = self.state.lock();
            if state.session.as_ref().map(|s| s.id) != Some(id) {
                return;
            }
            // This task is the timer; drop its handle rather than abort itself
            state.timer = None;
            state.detach()
        };
        if let Some(pending) = pending {
            self.resolve(pending).await;
        }
    }

    async fn resolve(&self, pending: Pending) -> GestureOutcome {
        let Pending { count, table } = pending;
        let Some(entry) = table.get(count) else {
            crate::warn!(
                "No gesture action for {} presses (table has {})",
                count,
                table.len()
            );
            self.emitter.emit_gesture(GestureEvent::InvalidGesture {
                count,
                table_len: table.len(),
            });
            return GestureOutcome::Invalid {
                count,
                table_len: table.len(),
            };
        };

        let keyword = entry.keyword.clone();
        crate::info!("Gesture of {} presses -> {:?}", count, keyword);
        match invoke_action(entry.action.clone(), "").await {
            Ok(result) => {
                self.emitter.emit_gesture(GestureEvent::Resolved {
                    count,
                    keyword: keyword.clone(),
                });
                GestureOutcome::Executed {
                    count,
                    keyword,
                    result,
                }
            }
            Err(error) => {
                crate::error!("Gesture action {:?} failed: {}", keyword, error);
                self.emitter.emit_gesture(GestureEvent::ActionFailed {
                    count,
                    keyword: keyword.clone(),
                    error_code: error.code.to_string(),
                    error_message: error.message.clone(),
                });
                GestureOutcome::Failed {
                    count,
                    keyword,
                    error,
                }
            }
        }
    }

    fn discarded(&self, count: usize) {
        crate::info!("Discarded gesture session of {} presses", count);
        self.emitter
            .emit_gesture(GestureEvent::SessionDiscarded { count });
    }
}

#[cfg(test)]
#[path = "switch_test.rs"]
mod tests;
