//! Google Gemini structured-output client.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use copy_primitives::{Credential, ImagePayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::traits::{
    ClientMetadata, GenerationError, GenerationRequest, GenerationResult, StructuredGenerator,
    StructuredOutput, Transport, TransportRequest,
};

/// Model used unless the configuration overrides it.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Public Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME_TYPE: &str = "application/json";

/// Configuration for the Gemini client.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiConfig {
    /// Creates a configuration using the supplied model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> GenerationResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Configured request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

/// Gemini client bound to one credential.
///
/// Construct one per action from the credential the caller currently holds.
pub struct GeminiClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    metadata: ClientMetadata,
    credential: Credential,
    timeout: Duration,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Constructs a client for `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::MissingCredential`] if `credential` is `None`.
    /// No network activity happens in that case.
    pub fn new(
        config: &GeminiConfig,
        credential: Option<Credential>,
        transport: Arc<dyn Transport>,
    ) -> GenerationResult<Self> {
        let credential = credential.ok_or(GenerationError::MissingCredential)?;
        let endpoint = format!(
            "{}v1beta/models/{}:generateContent",
            config.base_url, config.model
        );

        Ok(Self {
            transport,
            endpoint,
            metadata: ClientMetadata::new("gemini", config.model.clone()),
            credential,
            timeout: config.timeout,
        })
    }

    fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
        let prompt = request.prompt();
        let mut parts = vec![Part::Text {
            text: prompt.instruction().to_owned(),
        }];
        if let Some(image) = prompt.image() {
            parts.push(Part::inline(image));
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_owned(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                response_schema: prompt.schema().to_value(),
                temperature: request.temperature(),
            },
        }
    }
}

#[async_trait]
impl StructuredGenerator for GeminiClient {
    fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    async fn generate(&self, request: GenerationRequest) -> GenerationResult<StructuredOutput> {
        let payload = Self::build_request(&request);
        let body = serde_json::to_vec(&payload).map_err(|err| GenerationError::InvalidRequest {
            reason: format!("failed to encode Gemini request: {err}"),
        })?;

        debug!(
            model = self.metadata.model(),
            kind = ?request.prompt().kind(),
            body_len = body.len(),
            "sending Gemini request"
        );

        let outgoing = TransportRequest {
            endpoint: self.endpoint.clone(),
            headers: vec![(API_KEY_HEADER, self.credential.expose().to_owned())],
            body,
        };

        let response = timeout(self.timeout, self.transport.post_json(outgoing))
            .await
            .map_err(|_| {
                warn!(
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "Gemini request timed out"
                );
                GenerationError::Service { message: None }
            })?
            .map_err(|err| GenerationError::service(err.reason))?;

        if !response.is_success() {
            let message = service_error_message(&response.body);
            warn!(status = response.status, ?message, "Gemini returned an error status");
            return Err(GenerationError::Service { message });
        }

        let decoded: GenerateContentResponse = serde_json::from_slice(&response.body)
            .map_err(|err| GenerationError::decode(format!("invalid Gemini envelope: {err}")))?;

        let text = decoded.into_text()?;
        parse_output(&text)
    }
}

/// Trims and parses the model's text as a JSON object.
fn parse_output(text: &str) -> GenerationResult<StructuredOutput> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|err| GenerationError::decode(format!("response is not valid JSON: {err}")))?;
    match value {
        Value::Object(fields) => Ok(StructuredOutput::new(fields)),
        other => Err(GenerationError::decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn service_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    fn inline(image: &ImagePayload) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type().to_owned(),
                data: image.data().to_owned(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    fn into_text(self) -> GenerationResult<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(GenerationError::service(format!(
                "request blocked by Gemini: {reason}"
            )));
        }

        let text = self
            .candidates
            .into_iter()
            .take(1)
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect::<String>();

        if text.trim().is_empty() {
            return Err(GenerationError::decode("Gemini response contained no text"));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn sanitize_base_url(input: &str) -> GenerationResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(GenerationError::configuration(
            "Gemini base URL must start with http:// or https://",
        ));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<hyper::Uri>()
        .map_err(|err| GenerationError::configuration(format!("invalid Gemini base URL: {err}")))?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use copy_primitives::{FormState, SelectedTriggers, TriggerCatalog};
    use copy_prompts::{build_copy_prompt, build_image_analysis_prompt};
    use serde_json::json;

    use super::*;
    use crate::traits::{TransportError, TransportResponse};

    struct ScriptedTransport {
        calls: AtomicUsize,
        status: u16,
        body: Bytes,
        last: Mutex<Option<TransportRequest>>,
    }

    impl ScriptedTransport {
        fn new(status: u16, body: impl Into<Bytes>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                status,
                body: body.into(),
                last: Mutex::new(None),
            })
        }

        fn answering(text: &str) -> Arc<Self> {
            let envelope = json!({
                "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
            });
            Self::new(200, envelope.to_string())
        }

        fn last_body(&self) -> Value {
            let guard = self.last.lock().unwrap();
            let request = guard.as_ref().expect("a request was sent");
            serde_json::from_slice(&request.body).unwrap()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_json(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request);
            Ok(TransportResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn post_json(
            &self,
            _request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            Err(TransportError::new("connection refused"))
        }
    }

    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn post_json(
            &self,
            _request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn credential() -> Option<Credential> {
        Credential::new("test-key")
    }

    fn copy_request(keys: &[&str]) -> GenerationRequest {
        let form = FormState::new("Curso X", "Devs", "Emprego em 6 meses");
        let selected: SelectedTriggers = keys.iter().copied().collect();
        build_copy_prompt(&form, &selected, &TriggerCatalog::standard())
            .unwrap()
            .into()
    }

    #[test]
    fn base_url_requires_scheme() {
        let err = GeminiConfig::default()
            .with_base_url("generativelanguage.googleapis.com")
            .expect_err("missing scheme should error");
        assert!(matches!(err, GenerationError::Configuration { .. }));
    }

    #[test]
    fn sanitize_appends_trailing_slash() {
        let cfg = GeminiConfig::default()
            .with_base_url("https://example.com/gemini")
            .expect("valid URL");
        assert_eq!(cfg.base_url, "https://example.com/gemini/");
    }

    #[tokio::test]
    async fn missing_credential_fails_before_network() {
        let transport = ScriptedTransport::answering("{}");
        let err = GeminiClient::new(&GeminiConfig::default(), None, transport.clone())
            .expect_err("no credential");
        assert!(matches!(err, GenerationError::MissingCredential));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn copy_request_declares_json_output_and_schema() {
        let transport = ScriptedTransport::answering(r#"{"escassez":"texto A","urgencia":"texto B"}"#);
        let client =
            GeminiClient::new(&GeminiConfig::default(), credential(), transport.clone()).unwrap();

        let output = client
            .generate(copy_request(&["escassez", "urgencia"]))
            .await
            .unwrap();
        assert_eq!(output.fields()["escassez"], "texto A");

        let sent = transport.last_body();
        let config = &sent["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert!((config["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
        let props = config["responseSchema"]["properties"].as_object().unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), ["escassez", "urgencia"]);
        assert_eq!(sent["contents"][0]["parts"].as_array().unwrap().len(), 1);

        let guard = transport.last.lock().unwrap();
        let request = guard.as_ref().unwrap();
        assert!(request.endpoint.ends_with("v1beta/models/gemini-2.5-flash:generateContent"));
        assert_eq!(request.headers, vec![(API_KEY_HEADER, "test-key".to_owned())]);
    }

    #[tokio::test]
    async fn image_analysis_sends_inline_data() {
        let transport = ScriptedTransport::answering(
            "\n  {\"product\":\"Tênis\",\"audience\":\"Corredores\",\"benefit\":\"Conforto\"}  \n",
        );
        let client =
            GeminiClient::new(&GeminiConfig::default(), credential(), transport.clone()).unwrap();
        let image = ImagePayload::new("aGVsbG8=", "image/png").unwrap();

        let output = client
            .generate(build_image_analysis_prompt(&image).into())
            .await
            .unwrap();
        assert_eq!(output.fields()["product"], "Tênis");

        let sent = transport.last_body();
        let parts = sent["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "aGVsbG8=");
        assert!((sent["generationConfig"]["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(
            sent["generationConfig"]["responseSchema"]["required"],
            json!(["product", "audience", "benefit"])
        );
    }

    #[tokio::test]
    async fn non_json_text_is_a_decode_error() {
        let transport = ScriptedTransport::answering("not json");
        let client = GeminiClient::new(&GeminiConfig::default(), credential(), transport).unwrap();

        let err = client.generate(copy_request(&["escassez"])).await.unwrap_err();
        assert!(matches!(err, GenerationError::Decode { .. }));
    }

    #[tokio::test]
    async fn json_array_is_a_decode_error() {
        let transport = ScriptedTransport::answering("[1, 2]");
        let client = GeminiClient::new(&GeminiConfig::default(), credential(), transport).unwrap();

        let err = client.generate(copy_request(&["escassez"])).await.unwrap_err();
        assert!(matches!(err, GenerationError::Decode { reason } if reason.contains("an array")));
    }

    #[tokio::test]
    async fn error_status_carries_service_message() {
        let body = json!({ "error": { "code": 400, "message": "API key not valid." } });
        let transport = ScriptedTransport::new(400, body.to_string());
        let client = GeminiClient::new(&GeminiConfig::default(), credential(), transport).unwrap();

        let err = client.generate(copy_request(&["escassez"])).await.unwrap_err();
        assert!(
            matches!(err, GenerationError::Service { message: Some(m) } if m == "API key not valid.")
        );
    }

    #[tokio::test]
    async fn error_status_without_message_is_generic() {
        let transport = ScriptedTransport::new(503, "upstream unavailable");
        let client = GeminiClient::new(&GeminiConfig::default(), credential(), transport).unwrap();

        let err = client.generate(copy_request(&["escassez"])).await.unwrap_err();
        assert!(matches!(err, GenerationError::Service { message: None }));
    }

    #[tokio::test]
    async fn transport_failure_is_a_service_error() {
        let client =
            GeminiClient::new(&GeminiConfig::default(), credential(), Arc::new(FailingTransport))
                .unwrap();

        let err = client.generate(copy_request(&["escassez"])).await.unwrap_err();
        assert!(
            matches!(err, GenerationError::Service { message: Some(m) } if m == "connection refused")
        );
    }

    #[tokio::test]
    async fn stalled_request_times_out_without_message() {
        let config = GeminiConfig::default().with_timeout(Duration::from_millis(20));
        let client = GeminiClient::new(&config, credential(), Arc::new(StalledTransport)).unwrap();

        let err = client.generate(copy_request(&["escassez"])).await.unwrap_err();
        assert!(matches!(err, GenerationError::Service { message: None }));
    }

    #[tokio::test]
    async fn blocked_prompt_is_a_service_error() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let transport = ScriptedTransport::new(200, body.to_string());
        let client = GeminiClient::new(&GeminiConfig::default(), credential(), transport).unwrap();

        let err = client.generate(copy_request(&["escassez"])).await.unwrap_err();
        assert!(matches!(err, GenerationError::Service { message: Some(m) } if m.contains("SAFETY")));
    }

    #[tokio::test]
    async fn empty_candidates_are_a_decode_error() {
        let transport = ScriptedTransport::new(200, r#"{"candidates":[]}"#);
        let client = GeminiClient::new(&GeminiConfig::default(), credential(), transport).unwrap();

        let err = client.generate(copy_request(&["escassez"])).await.unwrap_err();
        assert!(matches!(err, GenerationError::Decode { .. }));
    }
}
