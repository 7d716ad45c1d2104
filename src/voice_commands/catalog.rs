// Default catalog - the stock keyword set, built from configuration

use crate::config::AppConfig;
use crate::speaker::Speaker;
use crate::voice_commands::actions::ir_light::{IrRemote, IR_COLORS};
use crate::voice_commands::actions::{
    ChangeLightColor, CommandLightBridge, CommandRunner, LightBridge, MpcPlayer, MusicCommand,
    MusicKind, MusicPlayer, PowerCommand, PowerKind, RepeatAfterMe, RgbLightCommand,
    SpeakAction, SpeakShellOutput, SpeakTime, VolumeControl, VolumeMixer, VolumeUndo,
};
use crate::voice_commands::executor::Action;
use crate::voice_commands::registry::{ActionRegistry, RegistryError};
use std::sync::Arc;

const IP_ADDRESS_COMMAND: &str = "ip -4 route get 1 | head -1 | cut -d' ' -f8";
const NO_IP_ADDRESS: &str = "I do not have an ip address assigned to me.";

const THREE_LAWS: &str = "The laws of robotics are
0: A robot may not injure a human being or, through inaction, allow a human
being to come to harm.
1: A robot must obey orders given it by human beings except where such orders
would conflict with the First Law.
2: A robot must protect its own existence as long as such protection does not
conflict with the First or Second Law.";

/// Keyword and reply for the canned answers
pub const CANNED_REPLIES: [(&str, &str); 9] = [
    ("alexa", "We've been friends since we were both starter projects"),
    (
        "beatbox",
        "pv zk pv pv zk pv zk kz zk pv pv pv zk pv zk zk pzk pzk pvzkpkzvpvzk kkkkkk bsch",
    ),
    ("clap", "clap clap"),
    ("google home", "She taught me everything I know."),
    ("hello", "hello to you too"),
    (
        "tell me a joke",
        "What do you call an alligator in a vest? An investigator.",
    ),
    ("three laws of robotics", THREE_LAWS),
    (
        "where are you from",
        "A galaxy far, far, just kidding. I'm from Seattle.",
    ),
    ("your name", "A machine has no name"),
];

/// Keyword and IR code for the light commands that are not colours
const IR_COMMANDS: [(&str, &str); 7] = [
    ("turn off the light", "off"),
    ("turn on the light", "on"),
    ("calm light", "b3"),
    ("hot light", "r1"),
    ("dim up the light", "dim_u"),
    ("dim down the light", "dim_d"),
    ("shuffle light", "smooth"),
];

/// The effectors every catalog action is built over
#[derive(Clone)]
pub struct Effectors {
    pub speaker: Arc<dyn Speaker>,
    pub runner: Arc<dyn CommandRunner>,
    pub mixer: Arc<VolumeMixer>,
    pub player: Arc<dyn MusicPlayer>,
    pub bridge: Arc<dyn LightBridge>,
    pub ir: IrRemote,
}

impl Effectors {
    /// Build the real effectors described by `config`
    pub fn from_config(
        config: &AppConfig,
        speaker: Arc<dyn Speaker>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            mixer: Arc::new(VolumeMixer::new(runner.clone(), config.volume.control.clone())),
            player: Arc::new(MpcPlayer::new(
                config.music.host.clone(),
                config.music.port,
                runner.clone(),
            )),
            bridge: Arc::new(CommandLightBridge::new(config.hue.command.clone(), runner.clone())),
            ir: IrRemote::from(&config.ir),
            speaker,
            runner,
        }
    }
}

/// Build the stock registry
pub fn build_registry(
    config: &AppConfig,
    effectors: &Effectors,
) -> Result<ActionRegistry, RegistryError> {
    let mut registry = ActionRegistry::new();
    let speaker = &effectors.speaker;
    let step = config.volume.step;

    let mut add = |keyword: &str, action: Arc<dyn Action>| registry.add(keyword, action);

    add(
        "ip address",
        Arc::new(SpeakShellOutput::new(
            speaker.clone(),
            effectors.runner.clone(),
            IP_ADDRESS_COMMAND,
            Some(NO_IP_ADDRESS.to_string()),
        )),
    )?;

    add("volume up", Arc::new(VolumeControl::new(effectors.mixer.clone(), step)))?;
    add("volume down", Arc::new(VolumeControl::new(effectors.mixer.clone(), -step)))?;
    add("max volume", Arc::new(VolumeControl::new(effectors.mixer.clone(), 100)))?;
    add("undo volume", Arc::new(VolumeUndo::new(effectors.mixer.clone())))?;

    add(
        "repeat after me",
        Arc::new(RepeatAfterMe::new(speaker.clone(), "repeat after me")),
    )?;

    add(
        "raspberry power off",
        Arc::new(PowerCommand::new(
            speaker.clone(),
            effectors.runner.clone(),
            PowerKind::Shutdown,
        )),
    )?;
    add(
        "raspberry reboot",
        Arc::new(PowerCommand::new(
            speaker.clone(),
            effectors.runner.clone(),
            PowerKind::Reboot,
        )),
    )?;

    let ir_light = |code: &str| -> Arc<dyn Action> {
        Arc::new(RgbLightCommand::new(
            speaker.clone(),
            effectors.runner.clone(),
            effectors.ir.clone(),
            code,
        ))
    };
    for (name, code) in IR_COLORS {
        add(&format!("turn {} light", name), ir_light(code))?;
        add(&format!("set light to {}", name), ir_light(code))?;
    }
    for (keyword, code) in IR_COMMANDS {
        add(keyword, ir_light(code))?;
    }

    for (keyword, kind) in [
        ("listen to playlist", MusicKind::Playlist),
        ("pause spotify", MusicKind::Pause),
        ("play song", MusicKind::PlaySong),
    ] {
        add(
            keyword,
            Arc::new(MusicCommand::new(
                speaker.clone(),
                effectors.player.clone(),
                keyword,
                kind,
            )),
        )?;
    }

    for (keyword, reply) in CANNED_REPLIES {
        add(keyword, Arc::new(SpeakAction::new(speaker.clone(), reply)))?;
    }
    add("time", Arc::new(SpeakTime::new(speaker.clone())))?;

    for binding in &config.hue.bindings {
        add(
            &binding.keyword,
            Arc::new(ChangeLightColor::new(
                speaker.clone(),
                effectors.bridge.clone(),
                binding.bulb.clone(),
                binding.hex.clone(),
            )),
        )?;
    }

    crate::info!("Registered {} keyword actions", registry.len());
    Ok(registry)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
