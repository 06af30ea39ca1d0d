//! Session errors and their user-facing messages.

use copy_adapters::traits::GenerationError;
use copy_config::ConfigError;
use copy_primitives::FormField;
use copy_prompts::TemplateError;
use thiserror::Error;

use crate::action::ActionKind;

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

const MSG_MISSING_CREDENTIAL: &str =
    "Por favor, insira e salve sua API Key do Google AI Studio para continuar.";
const MSG_MISSING_IMAGE: &str = "Por favor, adicione uma imagem primeiro.";
const MSG_MISSING_FORM: &str = "Por favor, preencha os campos obrigatórios (Produto, Público-Alvo, \
Benefício) e selecione ao menos um gatilho mental.";
const MSG_BLANK_CREDENTIAL: &str = "Por favor, informe a API Key antes de salvar.";
const MSG_IN_FLIGHT: &str = "Aguarde a conclusão da operação em andamento.";
const MSG_READ_ONLY_CREDENTIAL: &str = "A API Key é lida da variável de ambiente configurada \
e não pode ser salva por aqui.";
const MSG_CONFIG: &str = "Não foi possível acessar a configuração da API Key.";
const MSG_GENERIC: &str = "Não foi possível concluir a operação. Tente novamente.";

/// Input a user action needs but did not get.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MissingInput {
    /// Image analysis without an attached image.
    Image,
    /// Required text fields left blank, in form order.
    Fields(Vec<FormField>),
    /// Copy generation with no trigger selected.
    Triggers,
    /// Saving a blank credential.
    Credential,
}

/// Errors returned by session actions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No credential available; raised before any network call.
    #[error("no API credential configured")]
    MissingCredential,

    /// A required input is absent; the action was refused.
    #[error("missing input: {0:?}")]
    MissingInput(MissingInput),

    /// The same action is already running for this session.
    #[error("{0} is already in progress")]
    ActionInFlight(ActionKind),

    /// Reading or writing configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The prompt could not be rendered.
    #[error(transparent)]
    Prompt(#[from] TemplateError),

    /// The generative service call failed.
    #[error(transparent)]
    Generation(GenerationError),
}

impl From<GenerationError> for SessionError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCredential => Self::MissingCredential,
            other => Self::Generation(other),
        }
    }
}

impl SessionError {
    /// Flat message shown to the end user.
    ///
    /// Service failures surface the service's own message when it sent one;
    /// decode failures and message-less service failures share a generic
    /// "try again" message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => MSG_MISSING_CREDENTIAL.to_owned(),
            Self::MissingInput(MissingInput::Image) => MSG_MISSING_IMAGE.to_owned(),
            Self::MissingInput(MissingInput::Fields(_) | MissingInput::Triggers) => {
                MSG_MISSING_FORM.to_owned()
            }
            Self::MissingInput(MissingInput::Credential) => MSG_BLANK_CREDENTIAL.to_owned(),
            Self::ActionInFlight(_) => MSG_IN_FLIGHT.to_owned(),
            Self::Config(ConfigError::ReadOnlySource(_)) => MSG_READ_ONLY_CREDENTIAL.to_owned(),
            Self::Config(_) => MSG_CONFIG.to_owned(),
            Self::Generation(GenerationError::Service {
                message: Some(message),
            }) => message.clone(),
            Self::Prompt(_) | Self::Generation(_) => MSG_GENERIC.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_missing_credential_is_lifted() {
        let err = SessionError::from(GenerationError::MissingCredential);
        assert!(matches!(err, SessionError::MissingCredential));
        assert_eq!(err.user_message(), MSG_MISSING_CREDENTIAL);
    }

    #[test]
    fn service_message_is_shown_verbatim() {
        let err = SessionError::from(GenerationError::service("API key not valid."));
        assert_eq!(err.user_message(), "API key not valid.");
    }

    #[test]
    fn decode_and_bare_service_errors_share_generic_message() {
        let decode = SessionError::from(GenerationError::decode("bad json"));
        let bare = SessionError::from(GenerationError::Service { message: None });
        assert_eq!(decode.user_message(), MSG_GENERIC);
        assert_eq!(bare.user_message(), MSG_GENERIC);
    }

    #[test]
    fn read_only_source_points_at_environment() {
        let err = SessionError::from(ConfigError::ReadOnlySource("environment"));
        assert_eq!(err.user_message(), MSG_READ_ONLY_CREDENTIAL);
        assert!(err.user_message().contains("variável de ambiente"));

        let other = SessionError::from(ConfigError::invalid("timeout_secs must be positive"));
        assert_eq!(other.user_message(), MSG_CONFIG);
    }

    #[test]
    fn every_message_is_non_empty() {
        let errors = [
            SessionError::MissingCredential,
            SessionError::MissingInput(MissingInput::Image),
            SessionError::MissingInput(MissingInput::Fields(vec![FormField::Product])),
            SessionError::MissingInput(MissingInput::Triggers),
            SessionError::MissingInput(MissingInput::Credential),
            SessionError::ActionInFlight(ActionKind::GenerateCopy),
            SessionError::Config(ConfigError::invalid("x")),
        ];
        for err in errors {
            assert!(!err.user_message().is_empty(), "{err}");
        }
    }
}
