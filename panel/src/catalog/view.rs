//! Template cards and selection

use std::fmt::Write;

use colored::Colorize;
use tracing::info;

use crate::errors::PanelError;
use crate::models::template::{Template, TemplateStatus};

/// Result of selecting a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    Selected(&'a Template),

    /// The template exists but cannot be deployed yet
    ComingSoon(String),
}

/// Loaded templates with at most one selected
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Vec<Template>,
    selected: Option<usize>,
}

impl Catalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            templates,
            selected: None,
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn selected(&self) -> Option<&Template> {
        self.selected.and_then(|i| self.templates.get(i))
    }

    /// Select a template by id.
    ///
    /// Selecting a coming-soon template leaves the current selection untouched.
    pub fn select(&mut self, id: &str) -> Result<Selection<'_>, PanelError> {
        let index = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| PanelError::ValidationError(format!("Unknown template: {}", id)))?;

        let template = &self.templates[index];
        if !template.is_functional() {
            info!("Template {} is not available yet", id);
            return Ok(Selection::ComingSoon(format!(
                "{} is coming soon and cannot be deployed yet",
                template.name
            )));
        }

        self.selected = Some(index);
        info!("Selected template {}", id);
        Ok(Selection::Selected(&self.templates[index]))
    }

    /// Render every template as a card. Each call rebuilds the whole text.
    pub fn render_cards(&self) -> String {
        let mut out = String::new();
        for (i, template) in self.templates.iter().enumerate() {
            let marker = if self.selected == Some(i) { ">" } else { " " };
            let badge = match template.status {
                TemplateStatus::Functional => "available".green(),
                TemplateStatus::ComingSoon => "coming soon".yellow(),
            };
            let _ = writeln!(
                out,
                "{} [{}] {} ({})",
                marker,
                template.id,
                template.name.bold(),
                badge
            );
            let _ = writeln!(out, "    {}", template.description);
            if !template.tech_stack.is_empty() {
                let _ = writeln!(out, "    Stack: {}", template.tech_stack.join(", "));
            }
            for feature in &template.features {
                let _ = writeln!(out, "    - {}", feature);
            }
        }
        out
    }
}
