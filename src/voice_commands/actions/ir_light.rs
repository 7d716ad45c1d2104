// IR light action - drives an RGB light strip through LIRC's irsend

use crate::speaker::Speaker;
use crate::voice_commands::actions::runner::CommandRunner;
use crate::voice_commands::executor::{Action, ActionError, ActionResult, EffectorKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Default path to LIRC's irsend
pub const DEFAULT_IRSEND_PATH: &str = "/usr/bin/irsend";

/// Default LIRC remote name for the RGB controller
pub const DEFAULT_IR_REMOTE: &str = "rgb_controller";

/// Spoken colour name and the remote's key code, e.g. ("green 1", "g1")
pub const IR_COLORS: [(&str, &str); 16] = [
    ("green", "green"),
    ("green 1", "g1"),
    ("green 2", "g2"),
    ("green 3", "g3"),
    ("green 4", "g4"),
    ("blue", "blue"),
    ("blue 1", "b1"),
    ("blue 2", "b2"),
    ("blue 3", "b3"),
    ("blue 4", "b4"),
    ("red", "red"),
    ("red 1", "r1"),
    ("red 2", "r2"),
    ("red 3", "r3"),
    ("red 4", "r4"),
    ("white", "white"),
];

/// Where irsend lives and which remote to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrRemote {
    pub irsend_path: String,
    pub remote: String,
}

impl Default for IrRemote {
    fn default() -> Self {
        Self {
            irsend_path: DEFAULT_IRSEND_PATH.to_string(),
            remote: DEFAULT_IR_REMOTE.to_string(),
        }
    }
}

/// Sends one key code to the RGB controller
pub struct RgbLightCommand {
    speaker: Arc<dyn Speaker>,
    runner: Arc<dyn CommandRunner>,
    remote: IrRemote,
    code: String,
}

impl RgbLightCommand {
    pub fn new(
        speaker: Arc<dyn Speaker>,
        runner: Arc<dyn CommandRunner>,
        remote: IrRemote,
        code: impl Into<String>,
    ) -> Self {
        Self {
            speaker,
            runner,
            remote,
            code: code.into(),
        }
    }
}

#[async_trait]
impl Action for RgbLightCommand {
    async fn run(&self, utterance: &str) -> Result<ActionResult, ActionError> {
        crate::debug!("IR light {:?} for {:?}", self.code, utterance);
        self.runner
            .run(
                &self.remote.irsend_path,
                &[
                    "SEND_ONCE".to_string(),
                    self.remote.remote.clone(),
                    self.code.clone(),
                ],
            )
            .await?
            .check("irsend")?;

        let message = format!("Light set to {}", self.code);
        self.speaker.say(&message).await?;
        Ok(ActionResult::message(message))
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::InfraRed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker::tests::MockSpeaker;
    use crate::voice_commands::actions::runner::tests::MockRunner;
    use crate::voice_commands::executor::ActionErrorCode;

    #[tokio::test]
    async fn test_sends_code_and_confirms() {
        let speaker = Arc::new(MockSpeaker::new());
        let runner = Arc::new(MockRunner::new());
        let action = RgbLightCommand::new(speaker.clone(), runner.clone(), IrRemote::default(), "g1");

        action.run("turn green 1 light").await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec!["/usr/bin/irsend SEND_ONCE rgb_controller g1"]
        );
        assert_eq!(speaker.phrases(), vec!["Light set to g1"]);
    }

    #[tokio::test]
    async fn test_custom_remote() {
        let speaker = Arc::new(MockSpeaker::new());
        let runner = Arc::new(MockRunner::new());
        let remote = IrRemote {
            irsend_path: "irsend".to_string(),
            remote: "strip".to_string(),
        };
        let action = RgbLightCommand::new(speaker, runner.clone(), remote, "off");

        action.run("turn off the light").await.unwrap();

        assert_eq!(runner.command_lines(), vec!["irsend SEND_ONCE strip off"]);
    }

    #[tokio::test]
    async fn test_irsend_failure_is_silent_error() {
        let speaker = Arc::new(MockSpeaker::new());
        let runner = Arc::new(MockRunner::new());
        runner.push_exit(1, "hardware does not support sending");
        let action = RgbLightCommand::new(speaker.clone(), runner, IrRemote::default(), "red");

        let error = action.run("turn red light").await.unwrap_err();

        assert_eq!(error.code, ActionErrorCode::ExecutionError);
        assert!(speaker.phrases().is_empty());
    }

    #[test]
    fn test_color_table_codes_are_unique() {
        let mut codes: Vec<&str> = IR_COLORS.iter().map(|(_, code)| *code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), IR_COLORS.len());
    }
}
