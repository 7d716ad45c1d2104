// Shell output action - runs a shell command and speaks its output

use crate::speaker::Speaker;
use crate::voice_commands::actions::runner::{args, CommandRunner};
use crate::voice_commands::executor::{Action, ActionError, ActionResult, EffectorKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Runs `sh -c <command>` and says the trimmed output.
///
/// Empty output falls back to `failure_text` when one is set.
pub struct SpeakShellOutput {
    speaker: Arc<dyn Speaker>,
    runner: Arc<dyn CommandRunner>,
    command: String,
    failure_text: Option<String>,
}

impl SpeakShellOutput {
    pub fn new(
        speaker: Arc<dyn Speaker>,
        runner: Arc<dyn CommandRunner>,
        command: impl Into<String>,
        failure_text: Option<String>,
    ) -> Self {
        Self {
            speaker,
            runner,
            command: command.into(),
            failure_text,
        }
    }
}

#[async_trait]
impl Action for SpeakShellOutput {
    async fn run(&self, _utterance: &str) -> Result<ActionResult, ActionError> {
        let output = self
            .runner
            .run("sh", &args(["-c", self.command.as_str()]))
            .await?
            .check("sh")?;

        let text = output.stdout.trim();
        if !text.is_empty() {
            self.speaker.say(text).await?;
            return Ok(ActionResult::message(text));
        }

        match &self.failure_text {
            Some(failure) => {
                self.speaker.say(failure).await?;
                Ok(ActionResult::message(failure.clone()))
            }
            None => Ok(ActionResult::message("No output")),
        }
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::Shell
    }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
