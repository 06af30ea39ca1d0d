//! Form fields collected from the user.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Product image attached to a request as inline base64 data.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    data: String,
    mime_type: String,
}

impl ImagePayload {
    /// Creates a payload from already base64-encoded data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if either the data or the MIME type is empty.
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Result<Self> {
        let data = data.into();
        let mime_type = mime_type.into();
        if data.trim().is_empty() {
            return Err(Error::invalid_image("image data cannot be empty"));
        }
        if mime_type.trim().is_empty() {
            return Err(Error::invalid_image("image MIME type cannot be empty"));
        }
        Ok(Self { data, mime_type })
    }

    /// Encodes raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if `bytes` is empty or the MIME type is blank.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self> {
        Self::new(STANDARD.encode(bytes), mime_type)
    }

    /// Parses a `data:<mime>;base64,<data>` URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if the URL is not a base64 data URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::invalid_image("data URL must start with `data:`"))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::invalid_image("data URL is missing its payload"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::invalid_image("only base64 data URLs are supported"))?;
        Self::new(data, mime_type)
    }

    /// Base64-encoded image bytes.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// MIME type of the image (e.g. `image/png`).
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.data.len())
            .finish()
    }
}

/// Editable text fields of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    /// Product or service name.
    Product,
    /// Target audience.
    Audience,
    /// Main benefit or transformation.
    Benefit,
    /// Optional call to action.
    Cta,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Product => "product",
            Self::Audience => "audience",
            Self::Benefit => "benefit",
            Self::Cta => "cta",
        })
    }
}

/// Values entered by the user for one copywriting request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    product: String,
    audience: String,
    benefit: String,
    #[serde(default)]
    cta: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<ImagePayload>,
}

impl FormState {
    /// Creates a form with the three required fields filled in.
    #[must_use]
    pub fn new(
        product: impl Into<String>,
        audience: impl Into<String>,
        benefit: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            audience: audience.into(),
            benefit: benefit.into(),
            cta: String::new(),
            image: None,
        }
    }

    /// Sets the call to action.
    #[must_use]
    pub fn with_cta(mut self, cta: impl Into<String>) -> Self {
        self.cta = cta.into();
        self
    }

    /// Attaches a product image.
    #[must_use]
    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    /// Overwrites a single text field.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Product => &mut self.product,
            FormField::Audience => &mut self.audience,
            FormField::Benefit => &mut self.benefit,
            FormField::Cta => &mut self.cta,
        };
        *slot = value.into();
    }

    /// Returns the value of a single text field.
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Product => &self.product,
            FormField::Audience => &self.audience,
            FormField::Benefit => &self.benefit,
            FormField::Cta => &self.cta,
        }
    }

    /// Replaces or removes the product image.
    pub fn set_image(&mut self, image: Option<ImagePayload>) {
        self.image = image;
    }

    /// Product or service name.
    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Target audience.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Main benefit or transformation.
    #[must_use]
    pub fn benefit(&self) -> &str {
        &self.benefit
    }

    /// Call to action, or `None` when left empty.
    #[must_use]
    pub fn cta(&self) -> Option<&str> {
        if self.cta.is_empty() {
            None
        } else {
            Some(&self.cta)
        }
    }

    /// Attached product image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    /// Required fields that are still blank, in form order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<FormField> {
        [FormField::Product, FormField::Audience, FormField::Benefit]
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}
