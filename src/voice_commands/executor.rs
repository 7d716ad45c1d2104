// Action executor - resolves utterances to actions and runs them

use crate::events::{command_events, CommandEventEmitter, CommandExecutedPayload, CommandFailedPayload};
use crate::voice_commands::registry::ActionRegistry;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Result of an action execution
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionResult {
    /// Description of what was done
    pub message: String,
    /// Optional additional data
    pub data: Option<serde_json::Value>,
}

impl ActionResult {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// Typed error codes for action execution failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionErrorCode {
    /// Invalid parameter value
    InvalidParameter,
    /// Program or resource not found
    NotFound,
    /// Permission denied
    PermissionDenied,
    /// General execution error
    ExecutionError,
    /// Subprocess did not finish in time
    Timeout,
    /// Could not reach a bridge or daemon
    ConnectionFailed,
    /// Output could not be parsed
    ParseError,
    /// Async task panicked
    TaskPanic,
}

impl std::fmt::Display for ActionErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ActionErrorCode::NotFound => "NOT_FOUND",
            ActionErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ActionErrorCode::ExecutionError => "EXECUTION_ERROR",
            ActionErrorCode::Timeout => "TIMEOUT",
            ActionErrorCode::ConnectionFailed => "CONNECTION_FAILED",
            ActionErrorCode::ParseError => "PARSE_ERROR",
            ActionErrorCode::TaskPanic => "TASK_PANIC",
        };
        write!(f, "{}", s)
    }
}

/// Error during action execution
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionError {
    /// Typed error code for categorization
    pub code: ActionErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl ActionError {
    pub fn new(code: ActionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ActionError {}

/// The kind of effector an action drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectorKind {
    /// Only speaks
    Speech,
    /// Runs a shell command
    Shell,
    /// ALSA mixer
    Mixer,
    /// Shutdown / reboot
    Power,
    /// IR blaster
    InfraRed,
    /// Smart-bulb bridge
    LightBridge,
    /// Music player daemon
    Music,
}

/// Trait for action implementations
#[async_trait]
pub trait Action: Send + Sync {
    /// Execute the action for the utterance that triggered it.
    ///
    /// Gesture-triggered actions receive an empty utterance.
    async fn run(&self, utterance: &str) -> Result<ActionResult, ActionError>;

    /// Which effector this action drives
    fn kind(&self) -> EffectorKind;
}

/// Run an action on its own task so a panic is reported instead of unwinding
/// into the caller.
pub async fn invoke_action(
    action: Arc<dyn Action>,
    utterance: &str,
) -> Result<ActionResult, ActionError> {
    let utterance = utterance.to_string();
    tokio::spawn(async move { action.run(&utterance).await })
        .await
        .map_err(|e| ActionError::new(ActionErrorCode::TaskPanic, format!("Action task failed: {}", e)))?
}

/// Outcome of dispatching one utterance
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// No registered keyword matched
    NoMatch,
    /// The matched action succeeded
    Executed { keyword: String, result: ActionResult },
    /// The matched action failed
    Failed { keyword: String, error: ActionError },
}

/// Action dispatcher - routes utterances to their actions
pub struct ActionDispatcher {
    registry: Arc<ActionRegistry>,
    emitter: Option<Arc<dyn CommandEventEmitter>>,
}

impl ActionDispatcher {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self {
            registry,
            emitter: None,
        }
    }

    /// Attach an emitter for command events
    pub fn with_emitter(mut self, emitter: Arc<dyn CommandEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// Resolve and execute an utterance.
    ///
    /// Failures are logged and emitted here; they never propagate.
    pub async fn dispatch(&self, utterance: &str) -> DispatchOutcome {
        let Some(matched) = self.registry.resolve(utterance) else {
            crate::debug!("No keyword matched {:?}", utterance);
            return DispatchOutcome::NoMatch;
        };

        let keyword = matched.keyword().to_string();
        crate::info!("Matched keyword {:?} ({:?})", keyword, matched.action().kind());

        match invoke_action(matched.action().clone(), utterance).await {
            Ok(result) => {
                if let Some(emitter) = &self.emitter {
                    emitter.emit_command_executed(CommandExecutedPayload {
                        keyword: keyword.clone(),
                        message: result.message.clone(),
                    });
                }
                DispatchOutcome::Executed { keyword, result }
            }
            Err(error) => {
                crate::warn!("{} for {:?}: {}", command_events::COMMAND_FAILED, keyword, error);
                if let Some(emitter) = &self.emitter {
                    emitter.emit_command_failed(CommandFailedPayload {
                        keyword: keyword.clone(),
                        error_code: error.code.to_string(),
                        error_message: error.message.clone(),
                    });
                }
                DispatchOutcome::Failed { keyword, error }
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
pub(crate) mod tests;
