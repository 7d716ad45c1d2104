// Speech output used by actions that answer the user

use crate::voice_commands::actions::runner::CommandRunner;
use crate::voice_commands::executor::ActionError;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for saying text aloud (allows mocking in tests)
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn say(&self, text: &str) -> Result<(), ActionError>;
}

/// Speaker that only writes what it would say to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeaker;

#[async_trait]
impl Speaker for LogSpeaker {
    async fn say(&self, text: &str) -> Result<(), ActionError> {
        crate::info!("say: {}", text);
        Ok(())
    }
}

/// Speaker backed by an external TTS program.
///
/// The text is appended as the last argument, e.g. `espeak -v en <text>`.
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    runner: Arc<dyn CommandRunner>,
}

impl CommandSpeaker {
    pub fn new(program: String, args: Vec<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program,
            args,
            runner,
        }
    }

    /// Build from a full command line (program first).
    ///
    /// Returns None for an empty command.
    pub fn from_command(command: &[String], runner: Arc<dyn CommandRunner>) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), runner))
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn say(&self, text: &str) -> Result<(), ActionError> {
        let mut args = self.args.clone();
        args.push(text.to_string());
        self.runner.run(&self.program, &args).await?.check(&self.program)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "speaker_test.rs"]
pub(crate) mod tests;
