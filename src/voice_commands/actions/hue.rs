// Hue light action - converts a hex colour to CIE xy and hands it to a bridge

use crate::speaker::Speaker;
use crate::voice_commands::actions::runner::CommandRunner;
use crate::voice_commands::executor::{Action, ActionError, ActionErrorCode, ActionResult, EffectorKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A point in CIE 1931 xy space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyPoint {
    pub x: f64,
    pub y: f64,
}

impl XyPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn cross(self, other: XyPoint) -> f64 {
        self.x * other.y - self.y * other.x
    }

    fn sub(self, other: XyPoint) -> XyPoint {
        XyPoint::new(self.x - other.x, self.y - other.y)
    }

    fn distance(self, other: XyPoint) -> f64 {
        let d = self.sub(other);
        (d.x * d.x + d.y * d.y).sqrt()
    }
}

/// Colour gamut of a lamp model, as a triangle of red, green and blue corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gamut {
    A,
    #[default]
    B,
    C,
}

impl Gamut {
    pub fn corners(self) -> [XyPoint; 3] {
        match self {
            Gamut::A => [
                XyPoint::new(0.704, 0.296),
                XyPoint::new(0.2151, 0.7106),
                XyPoint::new(0.138, 0.08),
            ],
            Gamut::B => [
                XyPoint::new(0.675, 0.322),
                XyPoint::new(0.4091, 0.518),
                XyPoint::new(0.167, 0.04),
            ],
            Gamut::C => [
                XyPoint::new(0.692, 0.308),
                XyPoint::new(0.17, 0.7),
                XyPoint::new(0.153, 0.048),
            ],
        }
    }

    /// True if the point lies inside (or on) the gamut triangle
    pub fn contains(self, p: XyPoint) -> bool {
        let [red, green, blue] = self.corners();
        let v1 = green.sub(red);
        let v2 = blue.sub(red);
        let q = p.sub(red);
        let denom = v1.cross(v2);
        let s = q.cross(v2) / denom;
        let t = v1.cross(q) / denom;
        s >= 0.0 && t >= 0.0 && s + t <= 1.0
    }

    /// Move a point outside the triangle to the closest point on its edges
    pub fn clamp(self, p: XyPoint) -> XyPoint {
        if self.contains(p) {
            return p;
        }
        let [red, green, blue] = self.corners();
        [
            closest_on_segment(red, green, p),
            closest_on_segment(blue, red, p),
            closest_on_segment(green, blue, p),
        ]
        .into_iter()
        .min_by(|a, b| p.distance(*a).total_cmp(&p.distance(*b)))
        .unwrap_or(p)
    }
}

fn closest_on_segment(a: XyPoint, b: XyPoint, p: XyPoint) -> XyPoint {
    let ap = p.sub(a);
    let ab = b.sub(a);
    let len = ab.x * ab.x + ab.y * ab.y;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len).clamp(0.0, 1.0);
    XyPoint::new(a.x + ab.x * t, a.y + ab.y * t)
}

fn gamma(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Convert `#rrggbb` (or `rrggbb`) to an xy point inside the gamut
pub fn hex_to_xy(hex: &str, gamut: Gamut) -> Result<XyPoint, ActionError> {
    let (r, g, b) = parse_hex(hex).ok_or_else(|| {
        ActionError::new(
            ActionErrorCode::InvalidParameter,
            format!("Invalid hex colour: {}", hex),
        )
    })?;
    let r = gamma(f64::from(r) / 255.0);
    let g = gamma(f64::from(g) / 255.0);
    let b = gamma(f64::from(b) / 255.0);

    let x = r * 0.664511 + g * 0.154324 + b * 0.162028;
    let y = r * 0.283881 + g * 0.668433 + b * 0.047685;
    let z = r * 0.000088 + g * 0.072310 + b * 0.986039;
    let sum = x + y + z;
    if sum == 0.0 {
        return Err(ActionError::new(
            ActionErrorCode::InvalidParameter,
            "Black has no chromaticity",
        ));
    }

    Ok(gamut.clamp(XyPoint::new(x / sum, y / sum)))
}

/// Errors from talking to a light bridge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("No bridge registered, press button on bridge and try again")]
    NotRegistered,
    #[error("Bridge unreachable: {0}")]
    Unreachable(String),
    #[error("Unknown bulb: {0}")]
    UnknownBulb(String),
}

impl From<BridgeError> for ActionError {
    fn from(error: BridgeError) -> Self {
        let code = match error {
            BridgeError::NotRegistered => ActionErrorCode::PermissionDenied,
            BridgeError::Unreachable(_) => ActionErrorCode::ConnectionFailed,
            BridgeError::UnknownBulb(_) => ActionErrorCode::NotFound,
        };
        ActionError::new(code, error.to_string())
    }
}

/// Trait for switching a bulb on at a colour (allows mocking in tests)
#[async_trait]
pub trait LightBridge: Send + Sync {
    async fn set_light(&self, bulb: &str, xy: XyPoint) -> Result<(), BridgeError>;
}

/// Exit code a bridge command uses to report an unregistered bridge
pub const BRIDGE_EXIT_NOT_REGISTERED: i32 = 3;

/// Exit code a bridge command uses to report an unknown bulb
pub const BRIDGE_EXIT_UNKNOWN_BULB: i32 = 4;

/// Bridge driven by an external command.
///
/// Each template argument has `{bulb}`, `{x}` and `{y}` substituted. An
/// empty template means no bridge has been set up.
pub struct CommandLightBridge {
    template: Vec<String>,
    runner: Arc<dyn CommandRunner>,
}

impl CommandLightBridge {
    pub fn new(template: Vec<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { template, runner }
    }
}

#[async_trait]
impl LightBridge for CommandLightBridge {
    async fn set_light(&self, bulb: &str, xy: XyPoint) -> Result<(), BridgeError> {
        let Some((program, rest)) = self.template.split_first() else {
            return Err(BridgeError::NotRegistered);
        };
        let x = format!("{:.4}", xy.x);
        let y = format!("{:.4}", xy.y);
        let args: Vec<String> = rest
            .iter()
            .map(|arg| {
                arg.replace("{bulb}", bulb)
                    .replace("{x}", &x)
                    .replace("{y}", &y)
            })
            .collect();

        let output = self
            .runner
            .run(program, &args)
            .await
            .map_err(|e| BridgeError::Unreachable(e.message))?;
        match output.status {
            Some(0) => Ok(()),
            Some(BRIDGE_EXIT_NOT_REGISTERED) => Err(BridgeError::NotRegistered),
            Some(BRIDGE_EXIT_UNKNOWN_BULB) => Err(BridgeError::UnknownBulb(bulb.to_string())),
            _ => Err(BridgeError::Unreachable(output.stderr.trim().to_string())),
        }
    }
}

/// Switches a named bulb on at a fixed colour
pub struct ChangeLightColor {
    speaker: Arc<dyn Speaker>,
    bridge: Arc<dyn LightBridge>,
    bulb: String,
    hex: String,
    gamut: Gamut,
}

impl ChangeLightColor {
    pub fn new(
        speaker: Arc<dyn Speaker>,
        bridge: Arc<dyn LightBridge>,
        bulb: impl Into<String>,
        hex: impl Into<String>,
    ) -> Self {
        Self {
            speaker,
            bridge,
            bulb: bulb.into(),
            hex: hex.into(),
            gamut: Gamut::default(),
        }
    }

    pub fn with_gamut(mut self, gamut: Gamut) -> Self {
        self.gamut = gamut;
        self
    }
}

#[async_trait]
impl Action for ChangeLightColor {
    async fn run(&self, _utterance: &str) -> Result<ActionResult, ActionError> {
        let xy = hex_to_xy(&self.hex, self.gamut)?;

        match self.bridge.set_light(&self.bulb, xy).await {
            Ok(()) => {
                self.speaker.say("Ok").await?;
                Ok(ActionResult {
                    message: "Ok".to_string(),
                    data: Some(serde_json::json!({ "bulb": self.bulb, "x": xy.x, "y": xy.y })),
                })
            }
            Err(BridgeError::NotRegistered) => {
                crate::info!("hue: {}", BridgeError::NotRegistered);
                self.speaker.say(&BridgeError::NotRegistered.to_string()).await?;
                Err(BridgeError::NotRegistered.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::LightBridge
    }
}

#[cfg(test)]
#[path = "hue_test.rs"]
mod tests;
