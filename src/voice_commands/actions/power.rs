// Power action - shuts down or reboots the board

use crate::speaker::Speaker;
use crate::voice_commands::actions::runner::{args, CommandRunner};
use crate::voice_commands::executor::{Action, ActionError, ActionResult, EffectorKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What the power action does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    Shutdown,
    Reboot,
}

impl PowerKind {
    fn announcement(self) -> &'static str {
        match self {
            PowerKind::Shutdown => "Shutting down, goodbye",
            PowerKind::Reboot => "Rebooting",
        }
    }

    fn shutdown_args(self) -> Vec<String> {
        match self {
            PowerKind::Shutdown => args(["shutdown", "now"]),
            PowerKind::Reboot => args(["shutdown", "-r", "now"]),
        }
    }
}

impl std::str::FromStr for PowerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shutdown" => Ok(PowerKind::Shutdown),
            "reboot" => Ok(PowerKind::Reboot),
            _ => Err(format!("Unknown power command: {}", s)),
        }
    }
}

/// Announces, then runs `sudo shutdown`
pub struct PowerCommand {
    speaker: Arc<dyn Speaker>,
    runner: Arc<dyn CommandRunner>,
    kind: PowerKind,
}

impl PowerCommand {
    pub fn new(speaker: Arc<dyn Speaker>, runner: Arc<dyn CommandRunner>, kind: PowerKind) -> Self {
        Self {
            speaker,
            runner,
            kind,
        }
    }
}

#[async_trait]
impl Action for PowerCommand {
    async fn run(&self, _utterance: &str) -> Result<ActionResult, ActionError> {
        self.speaker.say(self.kind.announcement()).await?;
        self.runner
            .run("sudo", &self.kind.shutdown_args())
            .await?
            .check("sudo shutdown")?;
        Ok(ActionResult::message(self.kind.announcement()))
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::Power
    }
}
