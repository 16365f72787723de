//! Configuration form builder

use std::collections::BTreeMap;

use crate::errors::PanelError;
use crate::form::repo_url::is_valid_repo_url;
use crate::models::deployment::DeploymentConfig;
use crate::models::template::{Template, TemplateVariant};

/// Input carrying the template id
pub const TEMPLATE_INPUT: &str = "golden_path";

/// Input carrying the application source repository
pub const REPO_URL_INPUT: &str = "repo_url";

/// Kind of form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Select {
        options: &'static [&'static str],
        default: &'static str,
    },
    Checkbox {
        default: bool,
    },
}

/// A single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Form key, as typed by the user (`--instance-type`)
    pub name: &'static str,

    /// Workflow input the value is sent as
    pub input: &'static str,

    pub label: &'static str,

    pub kind: FieldKind,
}

impl FormField {
    pub fn default_value(&self) -> String {
        match &self.kind {
            FieldKind::Select { default, .. } => default.to_string(),
            FieldKind::Checkbox { default } => default.to_string(),
        }
    }

    /// Normalize a user-supplied value, rejecting anything outside the field's domain
    fn accept(&self, raw: &str) -> Result<String, PanelError> {
        let value = raw.trim();
        match &self.kind {
            FieldKind::Select { options, .. } if options.iter().any(|o| *o == value) => {
                Ok(value.to_string())
            }
            FieldKind::Select { options, .. } => Err(PanelError::ValidationError(format!(
                "Please select a valid {} ({})",
                self.label.to_lowercase(),
                options.join(", ")
            ))),
            FieldKind::Checkbox { .. } => match value {
                "" | "true" | "yes" | "on" => Ok("true".to_string()),
                "false" | "no" | "off" => Ok("false".to_string()),
                _ => Err(PanelError::ValidationError(format!(
                    "{} must be true or false",
                    self.label
                ))),
            },
        }
    }
}

const GP1_FIELDS: &[FormField] = &[
    FormField {
        name: "instance-type",
        input: "instance_type",
        label: "Instance Type",
        kind: FieldKind::Select {
            options: &["t2.micro", "t2.small", "t2.medium"],
            default: "t2.micro",
        },
    },
    FormField {
        name: "app-type",
        input: "app_type",
        label: "Application Type",
        kind: FieldKind::Select {
            options: &["nodejs", "python", "static"],
            default: "nodejs",
        },
    },
    FormField {
        name: "cleanup",
        input: "cleanup_after_deployment",
        label: "Auto-cleanup",
        kind: FieldKind::Checkbox { default: false },
    },
];

/// Rendered form for a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormLayout {
    Fields(&'static [FormField]),

    /// Deploy stays disabled; only the message is shown
    Placeholder(String),
}

impl FormLayout {
    pub fn fields(&self) -> &[FormField] {
        match self {
            FormLayout::Fields(fields) => fields,
            FormLayout::Placeholder(_) => &[],
        }
    }
}

/// Form fields for the selected template
pub fn render(template: &Template) -> FormLayout {
    match template.variant() {
        TemplateVariant::Gp1 => FormLayout::Fields(GP1_FIELDS),
        TemplateVariant::Placeholder if template.is_functional() => {
            FormLayout::Placeholder(format!(
                "{} has no configuration form in this version of goldpath.",
                template.name
            ))
        }
        TemplateVariant::Placeholder => FormLayout::Placeholder(format!(
            "{} is coming soon. Configuration options will appear here once it is available.",
            template.name
        )),
    }
}

/// Whether the deploy action is enabled
pub fn can_deploy(selected: Option<&Template>, repo_url: &str) -> bool {
    deploy_blocker(selected, repo_url).is_none()
}

/// Why the deploy action is disabled, or `None` when it is enabled
pub fn deploy_blocker(selected: Option<&Template>, repo_url: &str) -> Option<String> {
    let Some(template) = selected else {
        return Some("Please select a golden path".to_string());
    };
    if let FormLayout::Placeholder(message) = render(template) {
        return Some(message);
    }

    let repo_url = repo_url.trim();
    if repo_url.is_empty() {
        Some("Please enter a repository URL".to_string())
    } else if !is_valid_repo_url(repo_url) {
        Some(
            "Please enter a valid GitHub repository URL (e.g., https://github.com/user/repo)"
                .to_string(),
        )
    } else {
        None
    }
}

/// Build the workflow inputs from form values, filling defaults for absent fields
pub fn build_config(
    template: &Template,
    values: &BTreeMap<String, String>,
    repo_url: &str,
) -> Result<DeploymentConfig, PanelError> {
    if let Some(reason) = deploy_blocker(Some(template), repo_url) {
        return Err(PanelError::ValidationError(reason));
    }
    let layout = render(template);
    let fields = layout.fields();
    let repo_url = repo_url.trim();

    if let Some(unknown) = values.keys().find(|k| !fields.iter().any(|f| f.name == k.as_str())) {
        return Err(PanelError::ValidationError(format!(
            "Unknown field for {}: {}",
            template.id, unknown
        )));
    }

    let mut config = DeploymentConfig::new();
    for field in fields {
        let value = match values.get(field.name) {
            Some(raw) => field.accept(raw)?,
            None => field.default_value(),
        };
        config.insert(field.input, value);
    }
    config.insert(REPO_URL_INPUT, repo_url);
    config.insert(TEMPLATE_INPUT, template.id.clone());
    Ok(config)
}
