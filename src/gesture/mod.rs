// Gesture module - counts button presses inside a window and runs one action per gesture

pub mod debounce;
#[cfg(all(feature = "gpio", target_os = "linux"))]
pub mod gpio;
pub mod source;
pub mod switch;
pub mod table;

pub use debounce::Debouncer;
pub use source::{PulseListener, PulseSource, PulseSourceError};
pub use switch::{GestureOutcome, GestureSwitch};
pub use table::{GestureConfigError, GestureEntry, GestureTable};

/// Default time from the first press until the gesture resolves (5s)
pub const DEFAULT_WINDOW_MS: u64 = 5000;

/// Default minimum interval between accepted pulses (300ms)
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default BCM pin the button is wired to
pub const DEFAULT_GESTURE_PIN: u8 = 18;
