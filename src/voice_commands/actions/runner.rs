// Subprocess runner shared by every action that shells out

use crate::voice_commands::executor::{ActionError, ActionErrorCode};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default time a subprocess may run before it is killed
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;

/// Captured result of a finished subprocess
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, None if killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Convert a non-zero exit into an ExecutionError
    pub fn check(self, program: &str) -> Result<CommandOutput, ActionError> {
        if self.success() {
            return Ok(self);
        }
        let detail = self.stderr.trim();
        Err(ActionError::new(
            ActionErrorCode::ExecutionError,
            format!(
                "{} exited with {}{}",
                program,
                self.status.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                if detail.is_empty() {
                    String::new()
                } else {
                    format!(": {}", detail)
                }
            ),
        ))
    }
}

/// Trait for running external programs (allows mocking in tests)
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ActionError>;
}

/// Runs programs with tokio::process, bounded by a timeout
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS))
    }
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ActionError> {
        crate::debug!("Running {} {:?}", program, args);

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                ActionError::new(
                    ActionErrorCode::Timeout,
                    format!("{} did not finish within {:?}", program, self.timeout),
                )
            })?
            .map_err(|e| ActionError::new(ActionErrorCode::ExecutionError, e.to_string()))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn spawn_error(program: &str, e: std::io::Error) -> ActionError {
    let code = match e.kind() {
        std::io::ErrorKind::NotFound => ActionErrorCode::NotFound,
        std::io::ErrorKind::PermissionDenied => ActionErrorCode::PermissionDenied,
        _ => ActionErrorCode::ExecutionError,
    };
    ActionError::new(code, format!("Failed to start {}: {}", program, e))
}

/// Build an argument vector from string literals
pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

#[cfg(test)]
#[path = "runner_test.rs"]
pub(crate) mod tests;
