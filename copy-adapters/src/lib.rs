//! Generative-language client used by the copywriting flows.
//!
//! [`gemini::GeminiClient`] performs one structured-output round-trip per call
//! over a pluggable [`traits::Transport`]; [`http_client::HyperTransport`] is
//! the HTTPS implementation used in production.

#![warn(missing_docs, clippy::pedantic)]

pub mod gemini;
pub mod http_client;
pub mod traits;
