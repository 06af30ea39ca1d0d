//! Facade for the trigger-copy workspace.
//!
//! Bundles the internal crates behind feature flags so downstream users can
//! pull in only the prompt builders, only the client, or the full session.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use copy_primitives as primitives;

/// Prompt and response-shape builders (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use copy_prompts as prompts;

/// Gemini client and transports (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use copy_adapters as adapters;

/// Configuration and credential sourcing (enabled by `config` feature).
#[cfg(feature = "config")]
pub use copy_config as config;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use copy_telemetry as telemetry;

/// Interactive session (enabled by `session` feature).
#[cfg(feature = "session")]
pub use copy_session as session;
