//! Interactive session for the copywriting flows.
//!
//! A [`CopySession`] owns one user's form, trigger selection and results and
//! exposes the actions a UI drives: saving the credential, analysing the
//! product image, and generating copy. Each action builds a fresh
//! [`GeminiClient`](copy_adapters::gemini::GeminiClient) from the credential
//! resolved at that moment.

#![warn(missing_docs, clippy::pedantic)]

mod action;
mod error;
mod session;

pub use action::{ActionKind, ActionState};
pub use error::{MissingInput, SessionError, SessionResult};
pub use session::{CopySession, CopySessionBuilder, FormSnapshot};
