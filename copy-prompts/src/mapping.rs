//! Mapping of decoded copy responses to display items.

use copy_primitives::{GeneratedCopyItem, TriggerCatalog};
use serde_json::{Map, Value};

/// Converts a decoded response into display items, one per entry, in the
/// map's iteration order.
///
/// Never fails: unknown keys keep their raw key as the name, and non-string
/// values are rendered as JSON text.
#[must_use]
pub fn map_generated_copy(
    decoded: &Map<String, Value>,
    catalog: &TriggerCatalog,
) -> Vec<GeneratedCopyItem> {
    decoded
        .iter()
        .map(|(key, value)| GeneratedCopyItem {
            trigger_key: key.clone(),
            trigger_name: catalog.display_name(key).to_owned(),
            copy_text: match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        })
        .collect()
}
