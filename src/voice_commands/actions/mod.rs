// Actions module - implementations for different action types

pub mod clock;
pub mod hue;
pub mod ir_light;
pub mod music;
pub mod power;
pub mod runner;
pub mod shell;
pub mod speak;
pub mod volume;

pub use clock::SpeakTime;
pub use hue::{ChangeLightColor, CommandLightBridge, LightBridge};
pub use ir_light::{IrRemote, RgbLightCommand};
pub use music::{MpcPlayer, MusicCommand, MusicKind, MusicPlayer};
pub use power::{PowerCommand, PowerKind};
pub use runner::{CommandRunner, SystemRunner};
pub use shell::SpeakShellOutput;
pub use speak::{RepeatAfterMe, SpeakAction};
pub use volume::{VolumeControl, VolumeMixer, VolumeUndo};
