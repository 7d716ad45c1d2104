// Music action - playlists and songs through an MPD client

use crate::speaker::Speaker;
use crate::voice_commands::actions::runner::{CommandOutput, CommandRunner};
use crate::voice_commands::executor::{Action, ActionError, ActionResult, EffectorKind};
use crate::voice_commands::registry::strip_keyword;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default MPD host
pub const DEFAULT_MPD_HOST: &str = "localhost";

/// Default MPD port
pub const DEFAULT_MPD_PORT: u16 = 6600;

/// Outcome of a playback request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Success,
    FailedToConnect,
    PlaylistNotFound,
    SongNotFound,
}

/// Trait for a music daemon client (allows mocking in tests)
#[async_trait]
pub trait MusicPlayer: Send + Sync {
    /// Replace the queue with a stored playlist, shuffle it and start playing
    async fn shuffle_playlist(&self, name: &str) -> PlaybackStatus;
    async fn pause(&self) -> PlaybackStatus;
    /// Replace the queue with songs matching the query and start playing
    async fn play_song(&self, query: &str) -> PlaybackStatus;
}

/// MPD client driven through the `mpc` command line tool
pub struct MpcPlayer {
    host: String,
    port: u16,
    runner: Arc<dyn CommandRunner>,
}

enum MpcError {
    Connect,
    Command(String),
}

impl MpcPlayer {
    pub fn new(host: impl Into<String>, port: u16, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            host: host.into(),
            port,
            runner,
        }
    }

    async fn mpc(&self, command: &[&str]) -> Result<CommandOutput, MpcError> {
        let mut args = vec![
            "-h".to_string(),
            self.host.clone(),
            "-p".to_string(),
            self.port.to_string(),
        ];
        args.extend(command.iter().map(|s| s.to_string()));

        let output = self.runner.run("mpc", &args).await.map_err(|e| {
            crate::warn!("mpc failed to start: {}", e);
            MpcError::Connect
        })?;
        if output.success() {
            return Ok(output);
        }
        let stderr = output.stderr.trim().to_string();
        if stderr.to_lowercase().contains("connect") {
            crate::warn!("mpc could not reach {}:{}: {}", self.host, self.port, stderr);
            Err(MpcError::Connect)
        } else {
            Err(MpcError::Command(stderr))
        }
    }
}

impl From<MpcError> for PlaybackStatus {
    fn from(_: MpcError) -> Self {
        PlaybackStatus::FailedToConnect
    }
}

#[async_trait]
impl MusicPlayer for MpcPlayer {
    async fn shuffle_playlist(&self, name: &str) -> PlaybackStatus {
        if let Err(e) = self.mpc(&["clear"]).await {
            return e.into();
        }
        match self.mpc(&["load", name]).await {
            Ok(_) => {}
            Err(MpcError::Command(detail)) => {
                crate::info!("Playlist {:?} not loaded: {}", name, detail);
                return PlaybackStatus::PlaylistNotFound;
            }
            Err(e) => return e.into(),
        }
        if let Err(e) = self.mpc(&["shuffle"]).await {
            return e.into();
        }
        match self.mpc(&["play"]).await {
            Ok(_) => PlaybackStatus::Success,
            Err(e) => e.into(),
        }
    }

    async fn pause(&self) -> PlaybackStatus {
        match self.mpc(&["pause"]).await {
            Ok(_) => PlaybackStatus::Success,
            Err(e) => e.into(),
        }
    }

    async fn play_song(&self, query: &str) -> PlaybackStatus {
        match self.mpc(&["search", "any", query]).await {
            Ok(output) if output.stdout.trim().is_empty() => return PlaybackStatus::SongNotFound,
            Ok(_) => {}
            Err(MpcError::Command(_)) => return PlaybackStatus::SongNotFound,
            Err(e) => return e.into(),
        }
        let steps: [&[&str]; 3] = [&["clear"], &["searchadd", "any", query], &["play"]];
        for step in steps {
            if let Err(e) = self.mpc(step).await {
                return e.into();
            }
        }
        PlaybackStatus::Success
    }
}

/// What a music keyword asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicKind {
    Playlist,
    Pause,
    PlaySong,
}

/// Plays a playlist or song named after the keyword, or pauses playback
pub struct MusicCommand {
    speaker: Arc<dyn Speaker>,
    player: Arc<dyn MusicPlayer>,
    keyword: String,
    kind: MusicKind,
}

impl MusicCommand {
    pub fn new(
        speaker: Arc<dyn Speaker>,
        player: Arc<dyn MusicPlayer>,
        keyword: impl Into<String>,
        kind: MusicKind,
    ) -> Self {
        Self {
            speaker,
            player,
            keyword: keyword.into(),
            kind,
        }
    }

    async fn respond(&self, status: PlaybackStatus, name: &str) -> Result<ActionResult, ActionError> {
        let reply = match status {
            PlaybackStatus::Success => format!("{} playing", name),
            PlaybackStatus::FailedToConnect => "Sorry, I could not connect".to_string(),
            PlaybackStatus::PlaylistNotFound => {
                "Sorry, I think this playlist doesn't exist".to_string()
            }
            PlaybackStatus::SongNotFound => "Are you sure this song exists?".to_string(),
        };
        self.speaker.say(&reply).await?;
        Ok(ActionResult {
            message: reply,
            data: Some(serde_json::json!({ "status": status, "name": name })),
        })
    }
}

#[async_trait]
impl Action for MusicCommand {
    async fn run(&self, utterance: &str) -> Result<ActionResult, ActionError> {
        match self.kind {
            MusicKind::Pause => {
                let status = self.player.pause().await;
                crate::debug!("Pause: {:?}", status);
                Ok(ActionResult {
                    message: String::new(),
                    data: Some(serde_json::json!({ "status": status })),
                })
            }
            MusicKind::Playlist => {
                let name = strip_keyword(utterance, &self.keyword);
                let status = self.player.shuffle_playlist(&name).await;
                self.respond(status, &name).await
            }
            MusicKind::PlaySong => {
                let query = strip_keyword(utterance, &self.keyword);
                let status = self.player.play_song(&query).await;
                self.respond(status, &query).await
            }
        }
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::Music
    }
}

#[cfg(test)]
#[path = "music_test.rs"]
mod tests;
