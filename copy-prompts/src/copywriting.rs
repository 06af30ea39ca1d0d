//! Copy generation prompt: one snippet per selected trigger.

use std::collections::HashMap;

use copy_primitives::{FormState, SelectedTriggers, TriggerCatalog};
use tracing::debug;

use crate::prompt::{PromptKind, StructuredPrompt};
use crate::schema::ResponseSchema;
use crate::template::{PromptTemplate, TemplateResult};

const COPYWRITING_TEMPLATE: &str = "\
Você é um copywriter especialista em marketing digital e psicologia do consumidor, \
mestre em criar textos persuasivos usando gatilhos mentais.

INFORMAÇÕES DO PRODUTO:
- Produto/Serviço: {{product}}
- Público-alvo: {{audience}}
- Principal benefício/transformação: {{benefit}}{{extras}}

TAREFA:
Crie exemplos de copy (textos para marketing) para cada um dos seguintes gatilhos mentais: {{triggers}}.
Para cada gatilho, forneça um parágrafo curto e direto que possa ser usado em anúncios, e-mails ou páginas de vendas.
O texto deve ser altamente persuasivo e focado no público-alvo e benefício fornecidos.";

const CTA_LINE: &str = "- Chamada para Ação (CTA): ";
const IMAGE_LINE: &str =
    "- Uma imagem do produto foi fornecida. Use-a como inspiração visual para a copy.";
const TRIGGER_SEPARATOR: &str = ", ";

/// Builds the copy generation prompt for `form` and the selected triggers.
///
/// Keys missing from `catalog` are listed by their raw key and still get a
/// response field. The image, when present, is attached inline.
///
/// # Errors
///
/// Returns a template error only if the built-in template is broken.
pub fn build_copy_prompt(
    form: &FormState,
    selected: &SelectedTriggers,
    catalog: &TriggerCatalog,
) -> TemplateResult<StructuredPrompt> {
    let keys = selected.in_catalog_order(catalog);

    let triggers = keys
        .iter()
        .map(|key| match catalog.get(key) {
            Some(trigger) => format!("{} ({})", trigger.name(), trigger.description()),
            None => (*key).to_owned(),
        })
        .collect::<Vec<_>>()
        .join(TRIGGER_SEPARATOR);

    let mut extras = String::new();
    if let Some(cta) = form.cta() {
        extras.push('\n');
        extras.push_str(CTA_LINE);
        extras.push_str(cta);
    }
    if form.image().is_some() {
        extras.push('\n');
        extras.push_str(IMAGE_LINE);
    }

    let template = PromptTemplate::builder(COPYWRITING_TEMPLATE)
        .with_required_variable("product")
        .with_required_variable("audience")
        .with_required_variable("benefit")
        .with_required_variable("triggers")
        .build()?;

    let vars = HashMap::from([
        ("product".to_owned(), form.product().to_owned()),
        ("audience".to_owned(), form.audience().to_owned()),
        ("benefit".to_owned(), form.benefit().to_owned()),
        ("extras".to_owned(), extras),
        ("triggers".to_owned(), triggers),
    ]);
    let instruction = template.render_with(&vars)?;

    let schema = keys.iter().fold(ResponseSchema::new(), |schema, key| {
        let description = format!(
            "A copy persuasiva gerada para o gatilho de {}",
            catalog.display_name(key)
        );
        schema.with_property(*key, description)
    });

    debug!(
        triggers = keys.len(),
        with_image = form.image().is_some(),
        "built copywriting prompt"
    );

    let prompt = StructuredPrompt::new(PromptKind::Copywriting, instruction, schema);
    Ok(match form.image() {
        Some(image) => prompt.with_image(image.clone()),
        None => prompt,
    })
}

#[cfg(test)]
mod tests {
    use copy_primitives::ImagePayload;

    use super::*;

    fn form() -> FormState {
        FormState::new("Curso X", "Devs", "Emprego em 6 meses").with_cta("")
    }

    fn selection(keys: &[&str]) -> SelectedTriggers {
        keys.iter().copied().collect()
    }

    #[test]
    fn embeds_fields_and_trigger_descriptions() {
        let catalog = TriggerCatalog::standard();
        let prompt =
            build_copy_prompt(&form(), &selection(&["escassez", "urgencia"]), &catalog).unwrap();

        let text = prompt.instruction();
        assert!(text.contains("- Produto/Serviço: Curso X"));
        assert!(text.contains("- Público-alvo: Devs"));
        assert!(text.contains("- Principal benefício/transformação: Emprego em 6 meses"));
        assert!(text.contains(
            "Escassez (Cria a percepção de que algo é limitado.), \
             Urgência (Instiga uma ação imediata devido a um prazo.)"
        ));
        assert_eq!(prompt.kind(), PromptKind::Copywriting);
        assert!(prompt.image().is_none());
    }

    #[test]
    fn empty_cta_is_omitted() {
        let catalog = TriggerCatalog::standard();
        let prompt = build_copy_prompt(&form(), &selection(&["escassez"]), &catalog).unwrap();
        assert!(!prompt.instruction().contains("CTA"));
        assert!(!prompt.instruction().contains("imagem do produto"));
    }

    #[test]
    fn cta_and_image_are_mentioned_when_present() {
        let catalog = TriggerCatalog::standard();
        let image = ImagePayload::new("aGVsbG8=", "image/png").unwrap();
        let form = form().with_cta("Inscreva-se agora").with_image(image.clone());

        let prompt = build_copy_prompt(&form, &selection(&["novidade"]), &catalog).unwrap();
        assert!(
            prompt
                .instruction()
                .contains("- Chamada para Ação (CTA): Inscreva-se agora")
        );
        assert!(prompt.instruction().contains(IMAGE_LINE));
        assert_eq!(prompt.image(), Some(&image));
    }

    #[test]
    fn schema_has_one_field_per_selected_key() {
        let catalog = TriggerCatalog::standard();
        let keys = ["urgencia", "provaSocial", "autoridade", "medo"];
        let prompt = build_copy_prompt(&form(), &selection(&keys), &catalog).unwrap();

        let schema = prompt.schema();
        assert_eq!(schema.properties().len(), keys.len());
        for key in keys {
            assert!(schema.property(key).is_some(), "missing field {key}");
        }
        assert!(schema.required().is_empty());
    }

    #[test]
    fn unknown_keys_use_raw_key_as_name() {
        let catalog = TriggerCatalog::standard();
        let prompt = build_copy_prompt(&form(), &selection(&["medo"]), &catalog).unwrap();

        assert!(prompt.instruction().contains("gatilhos mentais: medo."));
        assert_eq!(
            prompt.schema().property("medo").map(|p| p.description()),
            Some("A copy persuasiva gerada para o gatilho de medo")
        );
    }

    #[test]
    fn field_descriptions_reference_display_name() {
        let catalog = TriggerCatalog::standard();
        let prompt = build_copy_prompt(&form(), &selection(&["compromisso"]), &catalog).unwrap();
        let description = prompt
            .schema()
            .property("compromisso")
            .map(|p| p.description().to_owned())
            .unwrap_or_default();
        assert!(description.ends_with("Compromisso e Coerência"));
    }
}
