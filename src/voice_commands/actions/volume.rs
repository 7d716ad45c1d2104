// Volume control via the ALSA mixer (amixer)

use crate::voice_commands::actions::runner::CommandRunner;
use crate::voice_commands::executor::{Action, ActionError, ActionErrorCode, ActionResult, EffectorKind};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;

/// Default ALSA simple control
pub const DEFAULT_MIXER_CONTROL: &str = "PCM";

/// Default step for "volume up" / "volume down"
pub const DEFAULT_VOLUME_STEP: i32 = 10;

static MONO_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mono:.*?\[(\d+)%\]").expect("mono level pattern is valid"));

/// Parse the level from `amixer get` output (the `Mono:` line)
pub fn parse_mono_level(output: &str) -> Option<i32> {
    MONO_LEVEL
        .captures(output)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A single ALSA control shared by every volume action.
///
/// Remembers the level before the last change so it can be undone.
pub struct VolumeMixer {
    runner: Arc<dyn CommandRunner>,
    control: String,
    /// Serializes read-modify-write and holds the level to restore
    previous: Mutex<Option<i32>>,
}

impl VolumeMixer {
    pub fn new(runner: Arc<dyn CommandRunner>, control: impl Into<String>) -> Self {
        Self {
            runner,
            control: control.into(),
            previous: Mutex::new(None),
        }
    }

    /// Read the current level in percent
    pub async fn level(&self) -> Result<i32, ActionError> {
        let output = self
            .runner
            .run("amixer", &["get".to_string(), self.control.clone()])
            .await?
            .check("amixer")?;
        parse_mono_level(&output.stdout).ok_or_else(|| {
            ActionError::new(
                ActionErrorCode::ParseError,
                format!("Could not read the {} level from amixer", self.control),
            )
        })
    }

    async fn set_level(&self, level: i32) -> Result<(), ActionError> {
        self.runner
            .run(
                "amixer",
                &[
                    "-q".to_string(),
                    "set".to_string(),
                    self.control.clone(),
                    format!("{}%", level),
                ],
            )
            .await?
            .check("amixer")?;
        Ok(())
    }

    /// Change the level by `delta`, clamped to 0..=100.
    ///
    /// Returns (previous, new).
    pub async fn change(&self, delta: i32) -> Result<(i32, i32), ActionError> {
        let mut previous = self.previous.lock().await;
        let current = self.level().await?;
        let target = (current + delta).clamp(0, 100);
        self.set_level(target).await?;
        *previous = Some(current);
        crate::info!("Volume {} -> {}", current, target);
        Ok((current, target))
    }

    /// Restore the level from before the last change.
    ///
    /// Returns the restored level, or None when there is nothing to undo.
    pub async fn undo(&self) -> Result<Option<i32>, ActionError> {
        let mut previous = self.previous.lock().await;
        let Some(level) = *previous else {
            return Ok(None);
        };
        self.set_level(level).await?;
        *previous = None;
        crate::info!("Volume reset to {}", level);
        Ok(Some(level))
    }
}

/// Changes the volume by a fixed step
pub struct VolumeControl {
    mixer: Arc<VolumeMixer>,
    change: i32,
}

impl VolumeControl {
    pub fn new(mixer: Arc<VolumeMixer>, change: i32) -> Self {
        Self { mixer, change }
    }
}

#[async_trait]
impl Action for VolumeControl {
    async fn run(&self, _utterance: &str) -> Result<ActionResult, ActionError> {
        let (previous, level) = self.mixer.change(self.change).await?;
        Ok(ActionResult {
            message: format!("Volume at {}%", level),
            data: Some(serde_json::json!({ "previous": previous, "level": level })),
        })
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::Mixer
    }
}

/// Restores the volume from before the last change
pub struct VolumeUndo {
    mixer: Arc<VolumeMixer>,
}

impl VolumeUndo {
    pub fn new(mixer: Arc<VolumeMixer>) -> Self {
        Self { mixer }
    }
}

#[async_trait]
impl Action for VolumeUndo {
    async fn run(&self, _utterance: &str) -> Result<ActionResult, ActionError> {
        match self.mixer.undo().await? {
            Some(level) => Ok(ActionResult::message(format!("Volume reset to {}%", level))),
            None => Ok(ActionResult::message("No volume change to undo")),
        }
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::Mixer
    }
}

#[cfg(test)]
#[path = "volume_test.rs"]
mod tests;
