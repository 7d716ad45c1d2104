// Voice commands module - keyword matching and action execution

pub mod actions;
pub mod catalog;
pub mod executor;
pub mod registry;

pub use executor::{Action, ActionDispatcher, ActionError, ActionErrorCode, ActionResult, DispatchOutcome};
pub use registry::ActionRegistry;
