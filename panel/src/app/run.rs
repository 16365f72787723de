//! Command implementations

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::authn::credentials::StdinCredentialProvider;
use crate::catalog::loader;
use crate::catalog::view::{Catalog, Selection};
use crate::deploy::controller::{tokio_sleep, DeploymentController};
use crate::deploy::monitor::MonitorState;
use crate::deploy::trigger::{DeploymentTrigger, TriggerRequest};
use crate::errors::PanelError;
use crate::form::builder::{deploy_blocker, render, FieldKind, FormLayout};
use crate::http::client::HttpClient;
use crate::present::console::ConsolePresenter;
use crate::present::status::StatusPresenter;
use crate::storage::store::{self, FileStore, KeyValueStore, OWNER_KEY, REPO_KEY, TOKEN_KEY};

/// Template selected when none is given
pub const DEFAULT_TEMPLATE: &str = "gp1";

/// Deploy command arguments, from `--key=value` pairs
#[derive(Debug, Clone, Default)]
pub struct DeployArgs {
    pub template: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub repo_url: Option<String>,
    /// Remaining pairs, matched against the template's form fields
    pub fields: BTreeMap<String, String>,
}

const RESERVED_ARGS: &[&str] = &["deploy", "template", "owner", "repo", "repo-url", "log-level"];

impl DeployArgs {
    pub fn from_cli(cli_args: &HashMap<String, String>) -> Self {
        let fields = cli_args
            .iter()
            .filter(|(k, _)| !RESERVED_ARGS.iter().any(|r| *r == k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            template: cli_args.get("template").cloned(),
            owner: cli_args.get("owner").cloned(),
            repo: cli_args.get("repo").cloned(),
            repo_url: cli_args.get("repo-url").cloned(),
            fields,
        }
    }
}

/// Log what is already configured
pub async fn startup_report(store: &dyn KeyValueStore) -> Result<(), PanelError> {
    info!("Golden Path deployment panel initialized");

    if store.get(TOKEN_KEY).await?.is_some() {
        info!("GitHub token found in local store");
    } else {
        info!("No GitHub token found - you will be prompted during deployment");
    }

    match (store.get(OWNER_KEY).await?, store.get(REPO_KEY).await?) {
        (Some(owner), Some(repo)) => info!("Saved GitHub configuration: {}/{}", owner, repo),
        _ => info!("Please configure GitHub repository details (--owner, --repo) before deployment"),
    }
    Ok(())
}

async fn load_catalog(options: &AppOptions) -> Result<Catalog, PanelError> {
    loader::load(&options.catalog).await.map(Catalog::new).map_err(|e| {
        error!("{}", e);
        PanelError::CatalogUnavailable(
            "Failed to load Golden Paths. Please refresh and try again.".to_string(),
        )
    })
}

/// Print every template card
pub async fn list_templates(options: &AppOptions) -> Result<(), PanelError> {
    let catalog = load_catalog(options).await?;
    print!("{}", catalog.render_cards());
    Ok(())
}

/// Print the configuration form for one template
pub async fn show_form(options: &AppOptions, template_id: &str) -> Result<(), PanelError> {
    let catalog = load_catalog(options).await?;
    let template = catalog
        .templates()
        .iter()
        .find(|t| t.id == template_id)
        .ok_or_else(|| PanelError::ValidationError(format!("Unknown template: {}", template_id)))?;

    println!("{} ({})", template.name, template.id);
    match render(template) {
        FormLayout::Placeholder(message) => println!("  {}", message),
        FormLayout::Fields(fields) => {
            for field in fields {
                match &field.kind {
                    FieldKind::Select { options, default } => println!(
                        "  --{}=<{}>  {} (default {})",
                        field.name,
                        options.join("|"),
                        field.label,
                        default
                    ),
                    FieldKind::Checkbox { default } => println!(
                        "  --{}[=true|false]  {} (default {})",
                        field.name, field.label, default
                    ),
                }
            }
            println!("  --repo-url=<https://github.com/owner/repo>  Source repository (required)");
        }
    }
    Ok(())
}

/// Clear the stored credential and remembered repository
pub async fn clear_credentials(options: &AppOptions) -> Result<(), PanelError> {
    let file_store = FileStore::new(options.layout.store_file());
    store::clear_credentials(&file_store).await?;
    println!("GitHub credentials and configuration cleared. You'll be prompted for new ones on next deployment.");
    Ok(())
}

/// Select a template, dispatch its workflow and monitor it to completion
pub async fn deploy(
    options: &AppOptions,
    args: DeployArgs,
    shutdown_signal: impl Future<Output = ()>,
) -> Result<MonitorState, PanelError> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(options.layout.store_file()));
    startup_report(store.as_ref()).await?;

    let mut catalog = load_catalog(options).await?;
    let presenter: Arc<dyn StatusPresenter> = Arc::new(ConsolePresenter);

    let template_id = args.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    let template = match catalog.select(template_id)? {
        Selection::Selected(template) => template.clone(),
        Selection::ComingSoon(message) => {
            presenter.notify(&message);
            return Err(PanelError::ValidationError(message));
        }
    };

    let repo_url = args.repo_url.unwrap_or_default();
    if let Some(reason) = deploy_blocker(catalog.selected(), &repo_url) {
        presenter.notify(&reason);
        return Err(PanelError::ValidationError(reason));
    }

    let owner = match args.owner {
        Some(owner) => owner,
        None => store.get(OWNER_KEY).await?.unwrap_or_default(),
    };
    let repo = match args.repo {
        Some(repo) => repo,
        None => store.get(REPO_KEY).await?.unwrap_or_default(),
    };

    let request = TriggerRequest {
        template,
        owner,
        repo,
        repo_url,
        values: args.fields,
    };

    let api = Arc::new(HttpClient::new(&options.api)?);
    let trigger = DeploymentTrigger::new(
        api.clone(),
        store.clone(),
        Arc::new(StdinCredentialProvider),
        options.git_ref.clone(),
    );
    let mut controller = DeploymentController::new(
        trigger,
        api,
        presenter,
        options.monitor.clone(),
        options.start_delay,
        tokio_sleep(),
    );

    controller.deploy(&request).await?;

    tokio::select! {
        state = controller.wait() => {
            state.ok_or_else(|| PanelError::Internal("monitoring task failed".to_string()))
        }
        _ = shutdown_signal => {
            controller.cancel_active();
            info!("Monitoring stopped; the workflow keeps running remotely");
            Err(PanelError::Internal("interrupted".to_string()))
        }
    }
}
