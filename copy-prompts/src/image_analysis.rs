//! Image analysis prompt used to pre-fill the form.

use copy_primitives::ImagePayload;
use tracing::debug;

use crate::prompt::{PromptKind, StructuredPrompt};
use crate::schema::ResponseSchema;

const IMAGE_ANALYSIS_INSTRUCTION: &str = "\
Analise a imagem deste produto e identifique:
1. **Nome do Produto/Serviço:** Um nome descritivo ou o nome exato se for visível.
2. **Público-Alvo:** O perfil de cliente ideal para este produto.
3. **Principal Benefício:** A principal vantagem ou transformação que o produto oferece.

Seja conciso e direto. Retorne a resposta estritamente como um objeto JSON.";

/// Builds the fixed analysis prompt with `image` attached inline.
#[must_use]
pub fn build_image_analysis_prompt(image: &ImagePayload) -> StructuredPrompt {
    let schema = ResponseSchema::new()
        .with_property(
            "product",
            "O nome do produto ou serviço identificado na imagem.",
        )
        .with_property("audience", "O público-alvo ideal para este produto.")
        .with_property(
            "benefit",
            "O principal benefício ou transformação que o produto oferece.",
        )
        .require("product")
        .require("audience")
        .require("benefit");

    debug!(mime_type = image.mime_type(), "built image analysis prompt");

    StructuredPrompt::new(
        PromptKind::ImageAnalysis,
        IMAGE_ANALYSIS_INSTRUCTION,
        schema,
    )
    .with_image(image.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_three_required_fields_and_carries_image() {
        let image = ImagePayload::new("aGVsbG8=", "image/jpeg").unwrap();
        let prompt = build_image_analysis_prompt(&image);

        let names: Vec<_> = prompt
            .schema()
            .properties()
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, ["product", "audience", "benefit"]);
        assert_eq!(prompt.schema().required(), ["product", "audience", "benefit"]);
        assert_eq!(prompt.image(), Some(&image));
        assert_eq!(prompt.kind(), PromptKind::ImageAnalysis);
        assert!(prompt.instruction().contains("Público-Alvo"));
    }
}
