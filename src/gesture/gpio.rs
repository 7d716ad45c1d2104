// GPIO pulse source - falling-edge interrupts on a Raspberry Pi BCM pin

use crate::gesture::source::{PulseCallback, PulseSource, PulseSourceError};
use rppal::gpio::{Gpio, InputPin, Trigger};

/// Button wired between a BCM pin and ground, using the internal pull-up.
///
/// A press pulls the pin low, so each press is one falling edge (plus bounce,
/// which `PulseListener` filters).
pub struct GpioPulseSource {
    pin: u8,
    input: Option<InputPin>,
}

impl GpioPulseSource {
    pub fn new(pin: u8) -> Self {
        Self { pin, input: None }
    }
}

impl PulseSource for GpioPulseSource {
    fn start(&mut self, callback: PulseCallback) -> Result<(), PulseSourceError> {
        if self.input.is_some() {
            return Err(PulseSourceError::AlreadyStarted);
        }

        let gpio = Gpio::new().map_err(|e| PulseSourceError::Unavailable(e.to_string()))?;
        let mut input = gpio
            .get(self.pin)
            .map_err(|e| PulseSourceError::Unavailable(format!("BCM {}: {}", self.pin, e)))?
            .into_input_pullup();
        input
            .set_async_interrupt(Trigger::FallingEdge, None, move |_event| callback())
            .map_err(|e| PulseSourceError::Io(e.to_string()))?;

        crate::info!("Listening for presses on BCM {}", self.pin);
        self.input = Some(input);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PulseSourceError> {
        if let Some(mut input) = self.input.take() {
            input
                .clear_async_interrupt()
                .map_err(|e| PulseSourceError::Io(e.to_string()))?;
            crate::debug!("Released BCM {}", self.pin);
        }
        Ok(())
    }
}
