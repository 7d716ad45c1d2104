// Speak the time - converts a wall-clock time into a spoken phrase

use crate::speaker::Speaker;
use crate::voice_commands::executor::{Action, ActionError, ActionErrorCode, ActionResult, EffectorKind};
use async_trait::async_trait;
use chrono::Timelike;
use std::sync::Arc;

const HOURS_TEXT: [&str; 13] = [
    "midnight", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve",
];

const MINUTES_TEXT: [&str; 6] = ["five", "ten", "quarter", "twenty", "twenty-five", "half"];

/// Convert a 24-hour time into a phrase such as "It is twenty past four."
///
/// Minutes round to the nearest five. Past the half hour the phrase counts
/// down to the next hour.
pub fn time_to_words(hour: u32, minute: u32) -> Result<String, ActionError> {
    if hour > 23 || minute > 59 {
        return Err(ActionError::new(
            ActionErrorCode::InvalidParameter,
            format!("Invalid time {:02}:{:02}", hour, minute),
        ));
    }

    let mut hour = hour as usize;
    let mut rounded = ((minute + 2) / 5) as usize;
    let inverted = rounded > 6;
    if inverted {
        rounded = 12 - rounded;
        hour = (hour + 1) % 24;
    }

    if hour > 12 {
        hour -= 12;
    }

    if rounded == 0 {
        if hour == 0 {
            return Ok("It is midnight.".to_string());
        }
        return Ok(format!("It is {} o'clock.", HOURS_TEXT[hour]));
    }

    let relation = if inverted { "to" } else { "past" };
    Ok(format!(
        "It is {} {} {}.",
        MINUTES_TEXT[rounded - 1],
        relation,
        HOURS_TEXT[hour]
    ))
}

/// Says the current local time
pub struct SpeakTime {
    speaker: Arc<dyn Speaker>,
}

impl SpeakTime {
    pub fn new(speaker: Arc<dyn Speaker>) -> Self {
        Self { speaker }
    }
}

#[async_trait]
impl Action for SpeakTime {
    async fn run(&self, _utterance: &str) -> Result<ActionResult, ActionError> {
        let now = chrono::Local::now();
        let phrase = time_to_words(now.hour(), now.minute())?;
        self.speaker.say(&phrase).await?;
        Ok(ActionResult::message(phrase))
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::Speech
    }
}

#[cfg(test)]
#[path = "clock_test.rs"]
mod tests;
