// Gesture table - ordered actions indexed by press count

use crate::voice_commands::executor::Action;
use crate::voice_commands::registry::ActionRegistry;
use std::sync::Arc;

/// Error types for gesture configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GestureConfigError {
    #[error("Gesture table must contain at least one action")]
    EmptyTable,
    #[error("Gesture window must be greater than zero")]
    ZeroWindow,
    #[error("Gesture table names unknown keyword {0:?}")]
    UnknownKeyword(String),
}

/// One row of the table
#[derive(Clone)]
pub struct GestureEntry {
    pub keyword: String,
    pub action: Arc<dyn Action>,
}

impl std::fmt::Debug for GestureEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureEntry")
            .field("keyword", &self.keyword)
            .field("kind", &self.action.kind())
            .finish()
    }
}

/// Non-empty, 1-based press count -> action table.
///
/// Cloning is cheap; a resolution keeps the table it was counted against
/// even if the switch is reconfigured meanwhile.
#[derive(Debug, Clone)]
pub struct GestureTable {
    entries: Arc<[GestureEntry]>,
}

impl GestureTable {
    pub fn new(entries: Vec<GestureEntry>) -> Result<Self, GestureConfigError> {
        if entries.is_empty() {
            return Err(GestureConfigError::EmptyTable);
        }
        Ok(Self {
            entries: entries.into(),
        })
    }

    /// Build from registered keywords, in order
    pub fn from_keywords(
        registry: &ActionRegistry,
        keywords: &[String],
    ) -> Result<Self, GestureConfigError> {
        let entries = keywords
            .iter()
            .map(|keyword| {
                registry
                    .lookup(keyword)
                    .map(|binding| GestureEntry {
                        keyword: binding.keyword().to_string(),
                        action: binding.action().clone(),
                    })
                    .ok_or_else(|| GestureConfigError::UnknownKeyword(keyword.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// Entry for `count` presses (1 is the first entry)
    pub fn get(&self, count: usize) -> Option<&GestureEntry> {
        count.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.keyword.as_str())
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
