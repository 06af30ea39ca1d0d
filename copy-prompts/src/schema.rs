//! Response shape descriptors sent alongside prompts.

use serde_json::{Map, Value, json};

/// A single string-valued field in a [`ResponseSchema`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaProperty {
    name: String,
    description: String,
}

impl SchemaProperty {
    /// Field name as it must appear in the response object.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable explanation of the field.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Object-shaped response descriptor whose fields are all strings.
///
/// Serialises to the `responseSchema` format understood by Gemini:
///
/// ```
/// use copy_prompts::ResponseSchema;
///
/// let schema = ResponseSchema::new()
///     .with_property("product", "Product name")
///     .require("product");
/// let value = schema.to_value();
/// assert_eq!(value["type"], "OBJECT");
/// assert_eq!(value["properties"]["product"]["type"], "STRING");
/// assert_eq!(value["required"][0], "product");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseSchema {
    properties: Vec<SchemaProperty>,
    required: Vec<String>,
}

impl ResponseSchema {
    /// Creates an empty object schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a string field, replacing the description if the name already exists.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let description = description.into();
        if let Some(existing) = self.properties.iter_mut().find(|prop| prop.name == name) {
            existing.description = description;
        } else {
            self.properties.push(SchemaProperty { name, description });
        }
        self
    }

    /// Marks a field as required.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Declared fields in insertion order.
    #[must_use]
    pub fn properties(&self) -> &[SchemaProperty] {
        &self.properties
    }

    /// Looks up a declared field.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|prop| prop.name == name)
    }

    /// Names of required fields.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Renders the schema as JSON for the request payload.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|prop| {
                (
                    prop.name.clone(),
                    json!({ "type": "STRING", "description": prop.description }),
                )
            })
            .collect();

        let mut schema = json!({ "type": "OBJECT", "properties": properties });
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        schema
    }
}
