//! Mental trigger catalog and the user's selection.

use serde::{Deserialize, Serialize};

/// A named persuasion pattern used as a category for generated copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TriggerDefinition {
    key: &'static str,
    name: &'static str,
    description: &'static str,
}

impl TriggerDefinition {
    /// Creates a trigger definition.
    #[must_use]
    pub const fn new(key: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            key,
            name,
            description,
        }
    }

    /// Stable identifier, also used as the response field name.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Display label.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// One-sentence explanation embedded in prompts.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

const STANDARD_TRIGGERS: [TriggerDefinition; 10] = [
    TriggerDefinition::new(
        "escassez",
        "Escassez",
        "Cria a percepção de que algo é limitado.",
    ),
    TriggerDefinition::new(
        "urgencia",
        "Urgência",
        "Instiga uma ação imediata devido a um prazo.",
    ),
    TriggerDefinition::new(
        "provaSocial",
        "Prova Social",
        "Mostra que outras pessoas estão usando/aprovando.",
    ),
    TriggerDefinition::new(
        "autoridade",
        "Autoridade",
        "Posiciona você ou seu produto como especialista.",
    ),
    TriggerDefinition::new(
        "reciprocidade",
        "Reciprocidade",
        "Oferece algo de valor para criar uma \"dívida\" social.",
    ),
    TriggerDefinition::new(
        "compromisso",
        "Compromisso e Coerência",
        "Incentiva pequenos passos para levar a uma ação maior.",
    ),
    TriggerDefinition::new(
        "afinidade",
        "Afinidade",
        "Cria uma conexão e identificação com o público.",
    ),
    TriggerDefinition::new(
        "novidade",
        "Novidade",
        "Desperta interesse através de algo novo e inédito.",
    ),
    TriggerDefinition::new(
        "curiosidade",
        "Curiosidade",
        "Abre um \"loop\" na mente do leitor que precisa ser fechado.",
    ),
    TriggerDefinition::new(
        "antecipacao",
        "Antecipação",
        "Gera expectativa sobre um lançamento ou evento futuro.",
    ),
];

/// Immutable, ordered set of trigger definitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerCatalog {
    entries: &'static [TriggerDefinition],
}

impl TriggerCatalog {
    /// The built-in catalog of ten triggers.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            entries: &STANDARD_TRIGGERS,
        }
    }

    /// Builds a catalog over caller-supplied definitions.
    #[must_use]
    pub const fn from_static(entries: &'static [TriggerDefinition]) -> Self {
        Self { entries }
    }

    /// Looks up a definition by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'static TriggerDefinition> {
        self.entries.iter().find(|trigger| trigger.key == key)
    }

    /// Display name for `key`, or the key itself when it is not in the catalog.
    #[must_use]
    pub fn display_name<'a>(&self, key: &'a str) -> &'a str {
        self.get(key).map_or(key, |trigger| trigger.name)
    }

    /// Iterates definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &'static TriggerDefinition> {
        self.entries.iter()
    }

    /// Number of definitions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the catalog has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TriggerCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Set of selected trigger keys with toggle semantics.
///
/// Keys are not checked against a catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SelectedTriggers {
    keys: Vec<String>,
}

impl SelectedTriggers {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the selection state of `key`, returning whether it is now selected.
    pub fn toggle(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if let Some(index) = self.keys.iter().position(|existing| *existing == key) {
            self.keys.remove(index);
            false
        } else {
            self.keys.push(key);
            true
        }
    }

    /// Returns `true` if `key` is selected.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|existing| existing == key)
    }

    /// Number of selected keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Selected keys in the order they were toggled on.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Selected keys ordered for prompt construction: catalog order first,
    /// then keys unknown to the catalog in selection order.
    #[must_use]
    pub fn in_catalog_order(&self, catalog: &TriggerCatalog) -> Vec<&str> {
        let known = catalog
            .iter()
            .filter(|trigger| self.contains(trigger.key()))
            .map(|trigger| -> &str { trigger.key() });
        let unknown = self
            .keys
            .iter()
            .map(String::as_str)
            .filter(|key| catalog.get(key).is_none());
        known.chain(unknown).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectedTriggers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selected = Self::new();
        for key in iter {
            let key = key.into();
            if !selected.contains(&key) {
                selected.keys.push(key);
            }
        }
        selected
    }
}

impl From<Vec<String>> for SelectedTriggers {
    fn from(keys: Vec<String>) -> Self {
        keys.into_iter().collect()
    }
}

impl From<SelectedTriggers> for Vec<String> {
    fn from(selected: SelectedTriggers) -> Self {
        selected.keys
    }
}
