use super::*;
use crate::speaker::tests::MockSpeaker;
use crate::voice_commands::actions::runner::tests::MockRunner;
use std::sync::Mutex;

/// Mock player that records requests and returns a fixed status
struct MockPlayer {
    status: PlaybackStatus,
    requests: Mutex<Vec<String>>,
}

impl MockPlayer {
    fn new(status: PlaybackStatus) -> Self {
        Self {
            status,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MusicPlayer for MockPlayer {
    async fn shuffle_playlist(&self, name: &str) -> PlaybackStatus {
        self.requests.lock().unwrap().push(format!("playlist:{}", name));
        self.status
    }

    async fn pause(&self) -> PlaybackStatus {
        self.requests.lock().unwrap().push("pause".to_string());
        self.status
    }

    async fn play_song(&self, query: &str) -> PlaybackStatus {
        self.requests.lock().unwrap().push(format!("song:{}", query));
        self.status
    }
}

fn playlist_command(speaker: Arc<MockSpeaker>, player: Arc<MockPlayer>) -> MusicCommand {
    MusicCommand::new(speaker, player, "listen to playlist", MusicKind::Playlist)
}

#[tokio::test]
async fn test_playlist_name_is_utterance_minus_keyword() {
    let speaker = Arc::new(MockSpeaker::new());
    let player = Arc::new(MockPlayer::new(PlaybackStatus::Success));

    let result = playlist_command(speaker.clone(), player.clone())
        .run("Listen to playlist road trip")
        .await
        .unwrap();

    assert_eq!(player.requests(), vec!["playlist:road trip"]);
    assert_eq!(speaker.phrases(), vec!["road trip playing"]);
    assert_eq!(result.message, "road trip playing");
}

#[tokio::test]
async fn test_status_replies() {
    let cases = [
        (PlaybackStatus::FailedToConnect, "Sorry, I could not connect"),
        (
            PlaybackStatus::PlaylistNotFound,
            "Sorry, I think this playlist doesn't exist",
        ),
        (PlaybackStatus::SongNotFound, "Are you sure this song exists?"),
    ];
    for (status, reply) in cases {
        let speaker = Arc::new(MockSpeaker::new());
        let player = Arc::new(MockPlayer::new(status));

        playlist_command(speaker.clone(), player)
            .run("listen to playlist jazz")
            .await
            .unwrap();

        assert_eq!(speaker.phrases(), vec![reply]);
    }
}

#[tokio::test]
async fn test_pause_is_silent() {
    let speaker = Arc::new(MockSpeaker::new());
    let player = Arc::new(MockPlayer::new(PlaybackStatus::Success));
    let action = MusicCommand::new(speaker.clone(), player.clone(), "pause spotify", MusicKind::Pause);

    action.run("pause spotify").await.unwrap();

    assert_eq!(player.requests(), vec!["pause"]);
    assert!(speaker.phrases().is_empty());
}

#[tokio::test]
async fn test_play_song_uses_query() {
    let speaker = Arc::new(MockSpeaker::new());
    let player = Arc::new(MockPlayer::new(PlaybackStatus::Success));
    let action = MusicCommand::new(speaker.clone(), player.clone(), "play song", MusicKind::PlaySong);

    action.run("play song yellow submarine").await.unwrap();

    assert_eq!(player.requests(), vec!["song:yellow submarine"]);
    assert_eq!(speaker.phrases(), vec!["yellow submarine playing"]);
}

#[tokio::test]
async fn test_mpc_shuffle_playlist_sequence() {
    let runner = Arc::new(MockRunner::new());
    let player = MpcPlayer::new("pi.local", 6601, runner.clone());

    assert_eq!(player.shuffle_playlist("jazz").await, PlaybackStatus::Success);

    assert_eq!(
        runner.command_lines(),
        vec![
            "mpc -h pi.local -p 6601 clear",
            "mpc -h pi.local -p 6601 load jazz",
            "mpc -h pi.local -p 6601 shuffle",
            "mpc -h pi.local -p 6601 play",
        ]
    );
}

#[tokio::test]
async fn test_mpc_missing_playlist() {
    let runner = Arc::new(MockRunner::new());
    runner.push_stdout("");
    runner.push_exit(1, "MPD error: No such playlist");
    let player = MpcPlayer::new(DEFAULT_MPD_HOST, DEFAULT_MPD_PORT, runner.clone());

    assert_eq!(
        player.shuffle_playlist("nope").await,
        PlaybackStatus::PlaylistNotFound
    );
    assert_eq!(runner.calls().len(), 2);
}

#[tokio::test]
async fn test_mpc_connection_refused() {
    let runner = Arc::new(MockRunner::new());
    runner.push_exit(1, "MPD error: Connection refused");
    let player = MpcPlayer::new(DEFAULT_MPD_HOST, DEFAULT_MPD_PORT, runner.clone());

    assert_eq!(
        player.shuffle_playlist("jazz").await,
        PlaybackStatus::FailedToConnect
    );
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_mpc_missing_binary_is_connect_failure() {
    let runner = Arc::new(MockRunner::new());
    runner.push(Err(ActionError::new(
        crate::voice_commands::executor::ActionErrorCode::NotFound,
        "Failed to start mpc",
    )));
    let player = MpcPlayer::new(DEFAULT_MPD_HOST, DEFAULT_MPD_PORT, runner);

    assert_eq!(player.pause().await, PlaybackStatus::FailedToConnect);
}

#[tokio::test]
async fn test_mpc_song_not_found_when_search_is_empty() {
    let runner = Arc::new(MockRunner::new());
    runner.push_stdout("\n");
    let player = MpcPlayer::new(DEFAULT_MPD_HOST, DEFAULT_MPD_PORT, runner.clone());

    assert_eq!(player.play_song("zzz").await, PlaybackStatus::SongNotFound);
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_mpc_play_song_queues_matches() {
    let runner = Arc::new(MockRunner::new());
    runner.push_stdout("Beatles/Yellow Submarine.mp3\n");
    let player = MpcPlayer::new(DEFAULT_MPD_HOST, DEFAULT_MPD_PORT, runner.clone());

    assert_eq!(player.play_song("submarine").await, PlaybackStatus::Success);
    assert_eq!(
        runner.command_lines()[1..],
        [
            "mpc -h localhost -p 6600 clear",
            "mpc -h localhost -p 6600 searchadd any submarine",
            "mpc -h localhost -p 6600 play",
        ]
    );
}
