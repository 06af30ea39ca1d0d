use serde::{Deserialize, Serialize};

/// One persuasive snippet tied to the trigger it was generated for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCopyItem {
    /// Trigger key as it appeared in the response.
    pub trigger_key: String,
    /// Display name resolved from the catalog, or the key itself.
    pub trigger_name: String,
    /// Generated text.
    pub copy_text: String,
}

/// Fields extracted from a product image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnalysisResult {
    /// Product or service name.
    pub product: String,
    /// Ideal target audience.
    pub audience: String,
    /// Primary benefit.
    pub benefit: String,
}
