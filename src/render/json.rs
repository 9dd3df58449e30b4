//! JSON renderer for tooling integration.
//!
//! Serializes the DocumentationModel directly with serde.

use crate::model::DocumentationModel;
use crate::render::Renderer;
use anyhow::{Context, Result};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, model: &DocumentationModel) -> Result<String> {
        let mut out =
            serde_json::to_string_pretty(model).context("failed to serialize documentation model")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
