// Voice command registry - maps keywords to actions

use crate::voice_commands::executor::Action;
use regex::Regex;
use std::sync::Arc;

/// Error types for registry operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// Keyword is empty
    #[error("Keyword cannot be empty")]
    EmptyKeyword,
    /// Keyword already registered
    #[error("Keyword {0:?} is already registered")]
    DuplicateKeyword(String),
}

/// A keyword bound to its action
#[derive(Clone)]
pub struct KeywordBinding {
    keyword: String,
    action: Arc<dyn Action>,
}

impl KeywordBinding {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn action(&self) -> &Arc<dyn Action> {
        &self.action
    }
}

impl std::fmt::Debug for KeywordBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordBinding")
            .field("keyword", &self.keyword)
            .field("kind", &self.action.kind())
            .finish()
    }
}

/// Normalize text for matching: lowercase and trim whitespace
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Remove the first case-insensitive occurrence of `keyword` from `utterance`.
///
/// The text on either side keeps its original casing and is joined by a
/// single space.
pub fn strip_keyword(utterance: &str, keyword: &str) -> String {
    let keyword = normalize(keyword);
    if keyword.is_empty() {
        return utterance.trim().to_string();
    }
    let pattern = match Regex::new(&format!("(?i){}", regex::escape(&keyword))) {
        Ok(pattern) => pattern,
        Err(e) => {
            crate::warn!("Cannot match keyword {:?}: {}", keyword, e);
            return utterance.trim().to_string();
        }
    };
    let Some(found) = pattern.find(utterance) else {
        return utterance.trim().to_string();
    };
    let before = utterance[..found.start()].trim();
    let after = utterance[found.end()..].trim();
    match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (_, true) => before.to_string(),
        _ => format!("{} {}", before, after),
    }
}

/// Registry of keyword actions, in registration order
#[derive(Debug, Default)]
pub struct ActionRegistry {
    bindings: Vec<KeywordBinding>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under a keyword
    #[must_use = "this returns a Result that should be handled"]
    pub fn add(&mut self, keyword: &str, action: Arc<dyn Action>) -> Result<(), RegistryError> {
        let keyword = normalize(keyword);
        if keyword.is_empty() {
            return Err(RegistryError::EmptyKeyword);
        }
        if self.lookup(&keyword).is_some() {
            return Err(RegistryError::DuplicateKeyword(keyword));
        }
        crate::trace!("Registered keyword {:?}", keyword);
        self.bindings.push(KeywordBinding { keyword, action });
        Ok(())
    }

    /// Exact keyword lookup
    pub fn lookup(&self, keyword: &str) -> Option<&KeywordBinding> {
        let keyword = normalize(keyword);
        self.bindings.iter().find(|b| b.keyword == keyword)
    }

    /// Route an utterance to at most one binding.
    ///
    /// Exact match first, then the longest keyword contained in the
    /// utterance. Ties go to the earliest registration.
    pub fn resolve(&self, utterance: &str) -> Option<&KeywordBinding> {
        let normalized = normalize(utterance);
        if normalized.is_empty() {
            return None;
        }
        if let Some(exact) = self.bindings.iter().find(|b| b.keyword == normalized) {
            return Some(exact);
        }
        self.bindings
            .iter()
            .filter(|b| normalized.contains(&b.keyword))
            .fold(None, |best: Option<&KeywordBinding>, b| match best {
                Some(current) if current.keyword.len() >= b.keyword.len() => Some(current),
                _ => Some(b),
            })
    }

    /// All keywords in registration order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.keyword.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
