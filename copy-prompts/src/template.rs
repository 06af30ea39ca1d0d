//! Instruction templates with `{{variable}}` substitution.

use std::collections::HashMap;
use std::fmt;

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template operations.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A required variable was not provided.
    #[error("missing required variable: {name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
    },

    /// The template text is malformed.
    #[error("invalid template: {reason}")]
    Malformed {
        /// Reason for the failure.
        reason: String,
    },
}

/// A prompt template with variable substitution.
///
/// Substituted values are inserted verbatim: a value that itself contains
/// `{{...}}` is not expanded again.
///
/// # Examples
///
/// ```
/// use copy_prompts::template::PromptTemplate;
///
/// let template = PromptTemplate::builder("Produto: {{product}}")
///     .with_required_variable("product")
///     .build()
///     .unwrap();
///
/// let mut vars = std::collections::HashMap::new();
/// vars.insert("product".to_owned(), "Curso X".to_owned());
/// assert_eq!(template.render_with(&vars).unwrap(), "Produto: Curso X");
/// ```
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    template: String,
    defaults: HashMap<String, String>,
    required: Vec<String>,
}

impl PromptTemplate {
    /// Returns a builder for constructing templates.
    #[must_use]
    pub fn builder(template: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(template)
    }

    /// Renders the template with its default values only.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] if a required variable is not set.
    pub fn render(&self) -> TemplateResult<String> {
        self.render_with(&HashMap::new())
    }

    /// Renders the template, letting `vars` override defaults. Optional
    /// variables without a value render as an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] if a required variable is not set.
    pub fn render_with(&self, vars: &HashMap<String, String>) -> TemplateResult<String> {
        let mut out = String::with_capacity(self.template.len());
        for segment in segments(&self.template)? {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    if let Some(value) = vars.get(name).or_else(|| self.defaults.get(name)) {
                        out.push_str(value);
                    } else if self.required.iter().any(|req| req == name) {
                        return Err(TemplateError::MissingVariable {
                            name: name.to_owned(),
                        });
                    }
                }
            }
        }
        Ok(out)
    }

    /// Names referenced by the template, in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        // build() already validated the template
        for segment in segments(&self.template).unwrap_or_default() {
            if let Segment::Variable(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Returns the raw template string.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template)
    }
}

/// Builder for [`PromptTemplate`].
pub struct TemplateBuilder {
    template: String,
    defaults: HashMap<String, String>,
    required: Vec<String>,
}

impl TemplateBuilder {
    /// Creates a new builder with the supplied template text.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            defaults: HashMap::new(),
            required: Vec::new(),
        }
    }

    /// Sets a variable with a default value.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Declares a variable that must have a value at render time.
    #[must_use]
    pub fn with_required_variable(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Builds the template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Malformed`] if a placeholder is unterminated or empty.
    pub fn build(self) -> TemplateResult<PromptTemplate> {
        segments(&self.template)?;
        Ok(PromptTemplate {
            template: self.template,
            defaults: self.defaults,
            required: self.required,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Variable(&'a str),
}

fn segments(template: &str) -> TemplateResult<Vec<Segment<'_>>> {
    let mut parts = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            parts.push(Segment::Literal(&rest[..start]));
        }
        let after_open = &rest[start + 2..];
        let end = after_open.find("}}").ok_or_else(|| TemplateError::Malformed {
            reason: format!("unterminated placeholder at byte {}", template.len() - rest.len() + start),
        })?;
        let name = after_open[..end].trim();
        if name.is_empty() {
            return Err(TemplateError::Malformed {
                reason: "empty placeholder".to_owned(),
            });
        }
        parts.push(Segment::Variable(name));
        rest = &after_open[end + 2..];
    }

    if !rest.is_empty() {
        parts.push(Segment::Literal(rest));
    }
    Ok(parts)
}
