//! Prompt construction for the copywriting and image-analysis flows.
//!
//! Both flows produce a [`StructuredPrompt`]: instruction text, a declared
//! [`ResponseSchema`], and an optional inline image. [`mapping`] turns the
//! decoded response back into display items.

#![warn(missing_docs, clippy::pedantic)]

pub mod copywriting;
pub mod image_analysis;
pub mod mapping;
pub mod schema;
pub mod template;

mod prompt;

pub use copywriting::build_copy_prompt;
pub use image_analysis::build_image_analysis_prompt;
pub use mapping::map_generated_copy;
pub use prompt::{PromptKind, StructuredPrompt};
pub use schema::{ResponseSchema, SchemaProperty};
pub use template::{PromptTemplate, TemplateBuilder, TemplateError, TemplateResult};
