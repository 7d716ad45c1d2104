use super::*;
use crate::speaker::tests::MockSpeaker;
use crate::voice_commands::actions::runner::args;
use crate::voice_commands::actions::runner::tests::MockRunner;
use std::sync::Mutex;

fn assert_close(actual: XyPoint, x: f64, y: f64) {
    assert!(
        (actual.x - x).abs() < 1e-4 && (actual.y - y).abs() < 1e-4,
        "expected ({}, {}), got {:?}",
        x,
        y,
        actual
    );
}

/// Mock bridge that records requests and returns a fixed result
struct MockBridge {
    result: Result<(), BridgeError>,
    requests: Mutex<Vec<(String, XyPoint)>>,
}

impl MockBridge {
    fn new(result: Result<(), BridgeError>) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LightBridge for MockBridge {
    async fn set_light(&self, bulb: &str, xy: XyPoint) -> Result<(), BridgeError> {
        self.requests.lock().unwrap().push((bulb.to_string(), xy));
        self.result.clone()
    }
}

#[test]
fn test_white_is_inside_gamut_and_unchanged() {
    let xy = hex_to_xy("#ffffff", Gamut::B).unwrap();
    assert_close(xy, 0.32273, 0.32902);
}

#[test]
fn test_hex_without_hash() {
    assert_eq!(
        hex_to_xy("0077be", Gamut::B).unwrap(),
        hex_to_xy("#0077BE", Gamut::B).unwrap()
    );
}

#[test]
fn test_out_of_gamut_is_clamped_to_nearest_edge() {
    let xy = hex_to_xy("0077be", Gamut::B).unwrap();
    assert_close(xy, 0.22237, 0.14932);
}

#[test]
fn test_pure_colours_clamp_to_corners() {
    assert_close(hex_to_xy("ff0000", Gamut::B).unwrap(), 0.675, 0.322);
    assert_close(hex_to_xy("00ff00", Gamut::B).unwrap(), 0.4091, 0.518);
}

#[test]
fn test_wider_gamut_keeps_more_saturation() {
    let b = hex_to_xy("00ff00", Gamut::B).unwrap();
    let c = hex_to_xy("00ff00", Gamut::C).unwrap();
    assert!(c.y > b.y);
}

#[test]
fn test_invalid_hex_rejected() {
    for hex in ["", "#fff", "gg0000", "#12345678", "ééé"] {
        let error = hex_to_xy(hex, Gamut::B).unwrap_err();
        assert_eq!(error.code, ActionErrorCode::InvalidParameter, "{:?}", hex);
    }
}

#[test]
fn test_black_rejected() {
    let error = hex_to_xy("#000000", Gamut::B).unwrap_err();
    assert_eq!(error.code, ActionErrorCode::InvalidParameter);
}

#[test]
fn test_gamut_contains_corners() {
    for gamut in [Gamut::A, Gamut::B, Gamut::C] {
        let [red, green, blue] = gamut.corners();
        assert!(gamut.contains(red));
        assert!(gamut.contains(green));
        assert!(gamut.contains(blue));
        assert!(!gamut.contains(XyPoint::new(0.0, 0.0)));
    }
}

#[tokio::test]
async fn test_change_light_color_says_ok() {
    let speaker = Arc::new(MockSpeaker::new());
    let bridge = Arc::new(MockBridge::new(Ok(())));
    let action = ChangeLightColor::new(speaker.clone(), bridge.clone(), "Lounge Lamp", "ffffff");

    let result = action.run("change to white").await.unwrap();

    assert_eq!(result.message, "Ok");
    assert_eq!(speaker.phrases(), vec!["Ok"]);
    let requests = bridge.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "Lounge Lamp");
}

#[tokio::test]
async fn test_unregistered_bridge_tells_user_to_press_button() {
    let speaker = Arc::new(MockSpeaker::new());
    let bridge = Arc::new(MockBridge::new(Err(BridgeError::NotRegistered)));
    let action = ChangeLightColor::new(speaker.clone(), bridge, "Lounge Lamp", "0077be");

    let error = action.run("change to ocean blue").await.unwrap_err();

    assert_eq!(error.code, ActionErrorCode::PermissionDenied);
    assert_eq!(
        speaker.phrases(),
        vec!["No bridge registered, press button on bridge and try again"]
    );
}

#[tokio::test]
async fn test_unknown_bulb_is_not_found() {
    let speaker = Arc::new(MockSpeaker::new());
    let bridge = Arc::new(MockBridge::new(Err(BridgeError::UnknownBulb("Attic".into()))));
    let action = ChangeLightColor::new(speaker.clone(), bridge, "Attic", "ff0000");

    let error = action.run("attic red").await.unwrap_err();

    assert_eq!(error.code, ActionErrorCode::NotFound);
    assert!(speaker.phrases().is_empty());
}

#[tokio::test]
async fn test_bad_hex_never_reaches_bridge() {
    let speaker = Arc::new(MockSpeaker::new());
    let bridge = Arc::new(MockBridge::new(Ok(())));
    let action = ChangeLightColor::new(speaker, bridge.clone(), "Lamp", "nothex");

    assert!(action.run("lamp").await.is_err());
    assert!(bridge.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_command_bridge_substitutes_template() {
    let runner = Arc::new(MockRunner::new());
    let bridge = CommandLightBridge::new(
        args(["hue-cli", "set", "{bulb}", "--xy", "{x},{y}"]),
        runner.clone(),
    );

    bridge
        .set_light("Lounge Lamp", XyPoint::new(0.3227, 0.329))
        .await
        .unwrap();

    assert_eq!(
        runner.calls(),
        vec![(
            "hue-cli".to_string(),
            args(["set", "Lounge Lamp", "--xy", "0.3227,0.3290"])
        )]
    );
}

#[tokio::test]
async fn test_command_bridge_without_template_is_not_registered() {
    let bridge = CommandLightBridge::new(Vec::new(), Arc::new(MockRunner::new()));

    let error = bridge.set_light("Lamp", XyPoint::new(0.3, 0.3)).await.unwrap_err();

    assert_eq!(error, BridgeError::NotRegistered);
}

#[tokio::test]
async fn test_command_bridge_maps_exit_codes() {
    let runner = Arc::new(MockRunner::new());
    runner.push_exit(BRIDGE_EXIT_NOT_REGISTERED, "");
    runner.push_exit(BRIDGE_EXIT_UNKNOWN_BULB, "");
    runner.push_exit(1, "timed out");
    let bridge = CommandLightBridge::new(args(["hue-cli", "{bulb}"]), runner);
    let xy = XyPoint::new(0.3, 0.3);

    assert_eq!(
        bridge.set_light("Lamp", xy).await.unwrap_err(),
        BridgeError::NotRegistered
    );
    assert_eq!(
        bridge.set_light("Lamp", xy).await.unwrap_err(),
        BridgeError::UnknownBulb("Lamp".to_string())
    );
    assert_eq!(
        bridge.set_light("Lamp", xy).await.unwrap_err(),
        BridgeError::Unreachable("timed out".to_string())
    );
}
