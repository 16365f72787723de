//! Template catalog loader

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, info};

use crate::errors::PanelError;
use crate::filesys::file::File;
use crate::models::template::Template;

/// Where the catalog document lives
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(File),
    Url(String),
}

impl CatalogSource {
    /// http(s) URLs are fetched, anything else is read as a path
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            CatalogSource::Url(source.to_string())
        } else {
            CatalogSource::File(File::new(source))
        }
    }
}

/// Catalog document: either a bare list or `{ "templates": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<Template>),
    Wrapped { templates: Vec<Template> },
}

impl From<CatalogDocument> for Vec<Template> {
    fn from(doc: CatalogDocument) -> Self {
        match doc {
            CatalogDocument::List(templates) => templates,
            CatalogDocument::Wrapped { templates } => templates,
        }
    }
}

/// Parse a catalog document
pub fn parse_catalog(raw: &str) -> Result<Vec<Template>, PanelError> {
    serde_json::from_str::<CatalogDocument>(raw)
        .map(Vec::from)
        .map_err(|e| PanelError::CatalogUnavailable(format!("Malformed catalog: {}", e)))
}

/// Load the template catalog. No retry: a failure is final for this run.
pub async fn load(source: &CatalogSource) -> Result<Vec<Template>, PanelError> {
    let raw = match source {
        CatalogSource::File(file) => {
            debug!("Reading catalog from {:?}", file.path());
            tokio::fs::read_to_string(file.path()).await.map_err(|e| {
                error!("Failed to read catalog {:?}: {}", file.path(), e);
                PanelError::CatalogUnavailable(format!("{:?}: {}", file.path(), e))
            })?
        }
        CatalogSource::Url(url) => fetch(url).await.map_err(|e| {
            error!("Failed to fetch catalog {}: {}", url, e);
            PanelError::CatalogUnavailable(format!("{}: {}", url, e))
        })?,
    };

    let templates = parse_catalog(&raw)?;
    info!("Loaded {} templates", templates.len());
    Ok(templates)
}

async fn fetch(url: &str) -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    client.get(url).send().await?.error_for_status()?.text().await
}
