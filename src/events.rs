// Gesture and command events
// Defines event payloads and emission traits for testability

use serde::Serialize;

/// Gesture-related event names
pub mod gesture_events {
    pub const GESTURE_RESOLVED: &str = "gesture_resolved";
    pub const GESTURE_INVALID: &str = "gesture_invalid";
    pub const GESTURE_ACTION_FAILED: &str = "gesture_action_failed";
    pub const GESTURE_SESSION_DISCARDED: &str = "gesture_session_discarded";
}

/// Command-related event names
pub mod command_events {
    pub const COMMAND_EXECUTED: &str = "command_executed";
    pub const COMMAND_FAILED: &str = "command_failed";
}

/// Events raised by the gesture switch
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    /// A gesture mapped to an action that was invoked
    #[serde(rename_all = "camelCase")]
    Resolved { count: usize, keyword: String },
    /// The count had no entry in the action table
    #[serde(rename_all = "camelCase")]
    InvalidGesture { count: usize, table_len: usize },
    /// The invoked action returned an error
    #[serde(rename_all = "camelCase")]
    ActionFailed {
        count: usize,
        keyword: String,
        error_code: String,
        error_message: String,
    },
    /// An in-flight session was dropped by reconfiguration or close
    #[serde(rename_all = "camelCase")]
    SessionDiscarded { count: usize },
}

impl GestureEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GestureEvent::Resolved { .. } => gesture_events::GESTURE_RESOLVED,
            GestureEvent::InvalidGesture { .. } => gesture_events::GESTURE_INVALID,
            GestureEvent::ActionFailed { .. } => gesture_events::GESTURE_ACTION_FAILED,
            GestureEvent::SessionDiscarded { .. } => gesture_events::GESTURE_SESSION_DISCARDED,
        }
    }
}

/// Payload for command_executed event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandExecutedPayload {
    pub keyword: String,
    pub message: String,
}

/// Payload for command_failed event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedPayload {
    pub keyword: String,
    pub error_code: String,
    pub error_message: String,
}

/// Trait for emitting gesture events
/// Allows mocking in tests while logging in production
pub trait GestureEventEmitter: Send + Sync {
    fn emit_gesture(&self, event: GestureEvent);
}

/// Trait for emitting command events
pub trait CommandEventEmitter: Send + Sync {
    fn emit_command_executed(&self, payload: CommandExecutedPayload);
    fn emit_command_failed(&self, payload: CommandFailedPayload);
}

/// Emitter that writes events to the log as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventEmitter;

impl LogEventEmitter {
    fn log<T: Serialize>(name: &str, payload: &T) {
        match serde_json::to_string(payload) {
            Ok(json) => crate::info!("{} {}", name, json),
            Err(e) => crate::warn!("Failed to serialize {} payload: {}", name, e),
        }
    }
}

impl GestureEventEmitter for LogEventEmitter {
    fn emit_gesture(&self, event: GestureEvent) {
        Self::log(event.name(), &event);
    }
}

impl CommandEventEmitter for LogEventEmitter {
    fn emit_command_executed(&self, payload: CommandExecutedPayload) {
        Self::log(command_events::COMMAND_EXECUTED, &payload);
    }

    fn emit_command_failed(&self, payload: CommandFailedPayload) {
        Self::log(command_events::COMMAND_FAILED, &payload);
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
pub(crate) mod tests;
