//! Shared client traits and data structures.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use copy_prompts::{PromptKind, StructuredPrompt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Sampling temperature for image analysis (extraction, low variance).
pub const IMAGE_ANALYSIS_TEMPERATURE: f32 = 0.5;

/// Sampling temperature for copy generation (creative, higher variance).
pub const COPYWRITING_TEMPERATURE: f32 = 0.8;

/// Result alias used by generation clients.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Error type shared by generation clients.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential was available; raised before any network call.
    #[error("no API credential configured")]
    MissingCredential,

    /// Client is misconfigured.
    #[error("client not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// The request could not be encoded.
    #[error("invalid generation request: {reason}")]
    InvalidRequest {
        /// Reason describing why the request could not be built.
        reason: String,
    },

    /// Network failure or non-success response from the service.
    #[error("generative service error: {}", .message.as_deref().unwrap_or("no details"))]
    Service {
        /// Message reported by the service or transport, when there was one.
        message: Option<String>,
    },

    /// The response text was not the expected JSON object.
    #[error("failed to decode generated output: {reason}")]
    Decode {
        /// Additional context about the decoding failure.
        reason: String,
    },
}

impl GenerationError {
    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for service failures that carry a message.
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: Some(message.into()),
        }
    }

    /// Convenience constructor for decode failures.
    #[must_use]
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }
}

/// Minimal metadata describing a client instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientMetadata {
    provider: &'static str,
    model: String,
}

impl ClientMetadata {
    /// Creates metadata for the supplied provider and model identifier.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the provider identifier (e.g., "gemini").
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// A prompt paired with its sampling temperature.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    prompt: StructuredPrompt,
    temperature: f32,
}

impl GenerationRequest {
    /// Wraps `prompt`, choosing the temperature for its kind.
    #[must_use]
    pub fn new(prompt: StructuredPrompt) -> Self {
        let temperature = match prompt.kind() {
            PromptKind::ImageAnalysis => IMAGE_ANALYSIS_TEMPERATURE,
            PromptKind::Copywriting => COPYWRITING_TEMPERATURE,
        };
        Self {
            prompt,
            temperature,
        }
    }

    /// Overrides the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the wrapped prompt.
    #[must_use]
    pub fn prompt(&self) -> &StructuredPrompt {
        &self.prompt
    }

    /// Returns the sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl From<StructuredPrompt> for GenerationRequest {
    fn from(prompt: StructuredPrompt) -> Self {
        Self::new(prompt)
    }
}

/// Decoded JSON object returned by the service, in response order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuredOutput(Map<String, Value>);

impl StructuredOutput {
    /// Wraps a decoded object.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the decoded fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the output, returning the decoded fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Deserialises the fields into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Decode`] if the fields do not match `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> GenerationResult<T> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|err| GenerationError::decode(format!("unexpected output shape: {err}")))
    }
}

/// Client that turns a [`GenerationRequest`] into structured output.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// Returns basic metadata describing the client instance.
    fn metadata(&self) -> &ClientMetadata;

    /// Performs exactly one round-trip to the service.
    async fn generate(&self, request: GenerationRequest) -> GenerationResult<StructuredOutput>;
}

/// Outgoing HTTP request handed to a [`Transport`].
#[derive(Clone)]
pub struct TransportRequest {
    /// Absolute endpoint URI.
    pub endpoint: String,
    /// Extra headers; `content-type: application/json` is implied.
    pub headers: Vec<(&'static str, String)>,
    /// JSON-encoded body.
    pub body: Vec<u8>,
}

impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<_> = self.headers.iter().map(|(name, _)| *name).collect();
        f.debug_struct("TransportRequest")
            .field("endpoint", &self.endpoint)
            .field("headers", &header_names)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// Raw HTTP response returned by a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure raised by a [`Transport`] before a response was received.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct TransportError {
    /// Human-readable description of the failure.
    pub reason: String,
}

impl TransportError {
    /// Creates a transport error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Network layer used by clients; swapped for a mock in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs a JSON body and returns the raw response.
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use copy_prompts::ResponseSchema;
    use serde_json::json;

    use super::*;

    #[test]
    fn temperature_follows_prompt_kind() {
        let analysis = StructuredPrompt::new(PromptKind::ImageAnalysis, "x", ResponseSchema::new());
        let copy = StructuredPrompt::new(PromptKind::Copywriting, "y", ResponseSchema::new());

        assert!((GenerationRequest::new(analysis).temperature() - 0.5).abs() < f32::EPSILON);
        let request = GenerationRequest::from(copy);
        assert!((request.temperature() - 0.8).abs() < f32::EPSILON);
        assert!((request.with_temperature(0.1).temperature() - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn typed_output_reports_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Pair {
            #[allow(dead_code)]
            a: String,
        }

        let Value::Object(fields) = json!({ "a": 1 }) else {
            unreachable!()
        };
        let err = StructuredOutput::new(fields)
            .into_typed::<Pair>()
            .expect_err("number is not a string");
        assert!(matches!(err, GenerationError::Decode { .. }));
    }

    #[test]
    fn service_error_without_message_still_displays() {
        let err = GenerationError::Service { message: None };
        assert_eq!(err.to_string(), "generative service error: no details");
    }

    #[test]
    fn request_debug_hides_header_values() {
        let request = TransportRequest {
            endpoint: "https://example.com".to_owned(),
            headers: vec![("x-goog-api-key", "secret".to_owned())],
            body: b"{}".to_vec(),
        };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("x-goog-api-key"));
        assert!(!rendered.contains("secret"));
    }
}
