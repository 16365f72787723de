//! Golden Path template models

use serde::{Deserialize, Serialize};

/// A deployment template as published in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique template ID (e.g. "gp1")
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    pub description: String,

    /// Technologies the template provisions
    #[serde(default)]
    pub tech_stack: Vec<String>,

    /// Feature bullet points
    #[serde(default)]
    pub features: Vec<String>,

    /// Availability
    pub status: TemplateStatus,

    /// Workflow file dispatched for this template (e.g. "deploy.yml")
    pub workflow_file: String,
}

impl Template {
    pub fn is_functional(&self) -> bool {
        self.status == TemplateStatus::Functional
    }

    /// Form variant for this template
    pub fn variant(&self) -> TemplateVariant {
        match (self.id.as_str(), &self.status) {
            ("gp1", TemplateStatus::Functional) => TemplateVariant::Gp1,
            _ => TemplateVariant::Placeholder,
        }
    }
}

/// Template availability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    Functional,
    ComingSoon,
}

/// Closed set of configuration form variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateVariant {
    /// Single EC2 instance running a node, python or static app
    Gp1,

    /// Not yet deployable; informational only
    Placeholder,
}
