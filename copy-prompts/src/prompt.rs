use copy_primitives::ImagePayload;

use crate::schema::ResponseSchema;

/// Which user action a prompt was built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Extract product, audience and benefit from an image.
    ImageAnalysis,
    /// Generate one snippet per selected trigger.
    Copywriting,
}

/// Instruction text plus the response shape the service must follow.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredPrompt {
    kind: PromptKind,
    instruction: String,
    schema: ResponseSchema,
    image: Option<ImagePayload>,
}

impl StructuredPrompt {
    /// Creates a text-only prompt.
    #[must_use]
    pub fn new(kind: PromptKind, instruction: impl Into<String>, schema: ResponseSchema) -> Self {
        Self {
            kind,
            instruction: instruction.into(),
            schema,
            image: None,
        }
    }

    /// Attaches an inline image to the prompt.
    #[must_use]
    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    /// Action the prompt belongs to.
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Instruction text.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Declared response shape.
    #[must_use]
    pub fn schema(&self) -> &ResponseSchema {
        &self.schema
    }

    /// Inline image, if one accompanies the instruction.
    #[must_use]
    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }
}
