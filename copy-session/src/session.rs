use std::fmt;
use std::sync::Arc;

use copy_adapters::gemini::{GeminiClient, GeminiConfig};
use copy_adapters::http_client::HyperTransport;
use copy_adapters::traits::{GenerationRequest, StructuredGenerator, Transport};
use copy_config::{AppConfig, CredentialProvider};
use copy_primitives::{
    Credential, FormField, FormState, GeneratedCopyItem, ImageAnalysisResult, ImagePayload,
    SelectedTriggers, SessionId, TriggerCatalog,
};
use copy_prompts::{build_copy_prompt, build_image_analysis_prompt, map_generated_copy};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::action::{ActionFlags, ActionKind, ActionState};
use crate::error::{MissingInput, SessionError, SessionResult};

/// Copy of the user-editable state at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    /// Form fields and image.
    pub form: FormState,
    /// Selected trigger keys.
    pub selected: SelectedTriggers,
}

#[derive(Debug, Default)]
struct SessionState {
    form: FormState,
    selected: SelectedTriggers,
    results: Vec<GeneratedCopyItem>,
    last_error: Option<String>,
}

/// One user's copywriting session.
///
/// State writes are serialised through an async mutex that is never held
/// across a network call.
pub struct CopySession {
    id: SessionId,
    catalog: TriggerCatalog,
    gemini: GeminiConfig,
    credentials: CredentialProvider,
    transport: Arc<dyn Transport>,
    state: Mutex<SessionState>,
    actions: ActionFlags,
}

impl fmt::Debug for CopySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopySession")
            .field("id", &self.id)
            .field("model", &self.gemini.model())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CopySession`].
pub struct CopySessionBuilder {
    credentials: CredentialProvider,
    gemini: GeminiConfig,
    catalog: TriggerCatalog,
    transport: Option<Arc<dyn Transport>>,
}

impl CopySessionBuilder {
    /// Overrides the Gemini client configuration.
    #[must_use]
    pub fn gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    /// Overrides the trigger catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: TriggerCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Uses `transport` instead of the default HTTPS transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Finalises construction.
    #[must_use]
    pub fn build(self) -> CopySession {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HyperTransport::new()));
        CopySession {
            id: SessionId::random(),
            catalog: self.catalog,
            gemini: self.gemini,
            credentials: self.credentials,
            transport,
            state: Mutex::new(SessionState::default()),
            actions: ActionFlags::default(),
        }
    }
}

impl CopySession {
    /// Starts building a session around `credentials`.
    #[must_use]
    pub fn builder(credentials: CredentialProvider) -> CopySessionBuilder {
        CopySessionBuilder {
            credentials,
            gemini: GeminiConfig::default(),
            catalog: TriggerCatalog::standard(),
            transport: None,
        }
    }

    /// Starts building a session from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Generation`] if the configured base URL is invalid.
    pub fn builder_from_config(config: &AppConfig) -> SessionResult<CopySessionBuilder> {
        let gemini = GeminiConfig::new(config.model.clone())
            .with_base_url(&config.base_url)?
            .with_timeout(config.timeout());
        Ok(Self::builder(CredentialProvider::from_config(config)).gemini(gemini))
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Trigger catalog used by this session.
    #[must_use]
    pub const fn catalog(&self) -> &TriggerCatalog {
        &self.catalog
    }

    /// Whether `kind` currently has a call in flight.
    #[must_use]
    pub fn action_state(&self, kind: ActionKind) -> ActionState {
        self.actions.state(kind)
    }

    /// Overwrites one text field.
    pub async fn set_field(&self, field: FormField, value: impl Into<String>) {
        self.state.lock().await.form.set(field, value);
    }

    /// Attaches or replaces the product image.
    pub async fn set_image(&self, image: ImagePayload) {
        self.state.lock().await.form.set_image(Some(image));
    }

    /// Removes the product image.
    pub async fn clear_image(&self) {
        self.state.lock().await.form.set_image(None);
    }

    /// Flips a trigger's selection, returning whether it is now selected.
    pub async fn toggle_trigger(&self, key: impl Into<String>) -> bool {
        self.state.lock().await.selected.toggle(key)
    }

    /// Current form and selection.
    pub async fn snapshot(&self) -> FormSnapshot {
        let state = self.state.lock().await;
        FormSnapshot {
            form: state.form.clone(),
            selected: state.selected.clone(),
        }
    }

    /// Items from the last successful generation.
    pub async fn results(&self) -> Vec<GeneratedCopyItem> {
        self.state.lock().await.results.clone()
    }

    /// Message of the last failed action, cleared when an action starts.
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    /// Persists a user-entered credential.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingInput`] for a blank value and
    /// [`SessionError::Config`] when the configured source cannot be written.
    pub async fn save_credential(&self, value: &str) -> SessionResult<()> {
        let _in_flight = self.actions.begin(ActionKind::SaveCredential)?;
        self.clear_error().await;
        let outcome = if value.trim().is_empty() {
            Err(SessionError::MissingInput(MissingInput::Credential))
        } else {
            self.credentials.save(value).map_err(SessionError::from)
        };
        self.finish(ActionKind::SaveCredential, outcome).await
    }

    /// Asks the service to identify product, audience and benefit from the
    /// attached image, and writes them into the form.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingCredential`] before anything else when no
    /// credential is set, [`SessionError::MissingInput`] when no image is
    /// attached, or the service/decoding failure.
    pub async fn analyze_image(&self) -> SessionResult<ImageAnalysisResult> {
        let _in_flight = self.actions.begin(ActionKind::AnalyzeImage)?;
        self.clear_error().await;
        let outcome = self.run_analysis().await;
        self.finish(ActionKind::AnalyzeImage, outcome).await
    }

    /// Generates one snippet per selected trigger and stores the items.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingCredential`] before anything else when no
    /// credential is set, [`SessionError::MissingInput`] when a required field
    /// is blank or no trigger is selected, or the service/decoding failure.
    pub async fn generate_copy(&self) -> SessionResult<Vec<GeneratedCopyItem>> {
        let _in_flight = self.actions.begin(ActionKind::GenerateCopy)?;
        self.clear_error().await;
        let outcome = self.run_generation().await;
        self.finish(ActionKind::GenerateCopy, outcome).await
    }

    async fn run_analysis(&self) -> SessionResult<ImageAnalysisResult> {
        let credential = self.require_credential()?;

        let image = self
            .state
            .lock()
            .await
            .form
            .image()
            .cloned()
            .ok_or(SessionError::MissingInput(MissingInput::Image))?;

        let client = self.client(credential)?;
        let request = GenerationRequest::new(build_image_analysis_prompt(&image));
        let result: ImageAnalysisResult = client.generate(request).await?.into_typed()?;

        let mut state = self.state.lock().await;
        state.form.set(FormField::Product, result.product.clone());
        state.form.set(FormField::Audience, result.audience.clone());
        state.form.set(FormField::Benefit, result.benefit.clone());
        Ok(result)
    }

    async fn run_generation(&self) -> SessionResult<Vec<GeneratedCopyItem>> {
        let credential = self.require_credential()?;

        let (form, selected) = {
            let mut state = self.state.lock().await;
            let missing = state.form.missing_required();
            if !missing.is_empty() {
                return Err(SessionError::MissingInput(MissingInput::Fields(missing)));
            }
            if state.selected.is_empty() {
                return Err(SessionError::MissingInput(MissingInput::Triggers));
            }
            state.results.clear();
            (state.form.clone(), state.selected.clone())
        };

        let client = self.client(credential)?;
        let prompt = build_copy_prompt(&form, &selected, &self.catalog)?;
        let output = client.generate(GenerationRequest::new(prompt)).await?;
        let items = map_generated_copy(output.fields(), &self.catalog);

        self.state.lock().await.results.clone_from(&items);
        Ok(items)
    }

    fn require_credential(&self) -> SessionResult<Credential> {
        self.credentials
            .resolve()?
            .ok_or(SessionError::MissingCredential)
    }

    fn client(&self, credential: Credential) -> SessionResult<GeminiClient> {
        Ok(GeminiClient::new(
            &self.gemini,
            Some(credential),
            Arc::clone(&self.transport),
        )?)
    }

    async fn clear_error(&self) {
        self.state.lock().await.last_error = None;
    }

    async fn finish<T>(&self, kind: ActionKind, outcome: SessionResult<T>) -> SessionResult<T> {
        match &outcome {
            Ok(_) => info!(session = %self.id, action = %kind, "action completed"),
            Err(err) => {
                warn!(session = %self.id, action = %kind, error = %err, "action failed");
                self.state.lock().await.last_error = Some(err.user_message());
            }
        }
        outcome
    }
}
