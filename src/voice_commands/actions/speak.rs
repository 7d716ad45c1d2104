// Spoken replies - fixed phrases and echoing the user

use crate::speaker::Speaker;
use crate::voice_commands::executor::{Action, ActionError, ActionResult, EffectorKind};
use crate::voice_commands::registry::strip_keyword;
use async_trait::async_trait;
use std::sync::Arc;

/// Says a fixed response
pub struct SpeakAction {
    speaker: Arc<dyn Speaker>,
    words: String,
}

impl SpeakAction {
    pub fn new(speaker: Arc<dyn Speaker>, words: impl Into<String>) -> Self {
        Self {
            speaker,
            words: words.into(),
        }
    }
}

#[async_trait]
impl Action for SpeakAction {
    async fn run(&self, _utterance: &str) -> Result<ActionResult, ActionError> {
        self.speaker.say(&self.words).await?;
        Ok(ActionResult::message(self.words.clone()))
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::Speech
    }
}

/// Repeats whatever followed the keyword
pub struct RepeatAfterMe {
    speaker: Arc<dyn Speaker>,
    keyword: String,
}

impl RepeatAfterMe {
    pub fn new(speaker: Arc<dyn Speaker>, keyword: impl Into<String>) -> Self {
        Self {
            speaker,
            keyword: keyword.into(),
        }
    }
}

#[async_trait]
impl Action for RepeatAfterMe {
    async fn run(&self, utterance: &str) -> Result<ActionResult, ActionError> {
        let to_repeat = strip_keyword(utterance, &self.keyword);
        if to_repeat.is_empty() {
            return Ok(ActionResult::message("Nothing to repeat"));
        }
        self.speaker.say(&to_repeat).await?;
        Ok(ActionResult::message(to_repeat))
    }

    fn kind(&self) -> EffectorKind {
        EffectorKind::Speech
    }
}

#[cfg(test)]
#[path = "speak_test.rs"]
mod tests;
