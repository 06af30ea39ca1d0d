//! Core shared types for the trigger-copy workspace.

#![warn(missing_docs, clippy::pedantic)]

mod copy;
mod credential;
mod error;
mod form;
mod ids;
mod trigger;

/// Structured results produced by the generation flows.
pub use copy::{GeneratedCopyItem, ImageAnalysisResult};
/// Caller-held API credential.
pub use credential::Credential;
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Form fields collected from the user.
pub use form::{FormField, FormState, ImagePayload};
/// Unique identifier for an interactive session.
pub use ids::SessionId;
/// Mental trigger catalog and selection set.
pub use trigger::{SelectedTriggers, TriggerCatalog, TriggerDefinition};
