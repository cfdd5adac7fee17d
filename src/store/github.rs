use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::GithubConfig;
use crate::store::traits::{ModelSource, SourceError};

/// Reads the catalogue from a GitHub repository: the git trees API for the
/// listing and raw.githubusercontent.com for file content.
pub struct GithubSource {
    client: Client,
    tree_url: String,
    raw_base_url: String,
    token: Option<String>,
}

impl GithubSource {
    pub fn new(config: &GithubConfig, token: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            tree_url: config.tree_url.clone(),
            raw_base_url: config.raw_base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn raw_url(&self, path: &str) -> String {
        format!("{}/{}", self.raw_base_url, path.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl ModelSource for GithubSource {
    async fn fetch_tree(&self) -> Result<Vec<Value>, SourceError> {
        let mut request = self
            .client
            .get(&self.tree_url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "semantic-model-viewer");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.json::<Value>().await.unwrap_or(Value::Null);
            log::warn!("GitHub tree listing failed with status {}", status);
            return Err(SourceError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body: Value = response.json().await?;
        let tree = body
            .get("tree")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        log::info!("Fetched repository tree with {} entries", tree.len());
        Ok(tree)
    }

    async fn fetch_raw(&self, path: &str) -> Result<String, SourceError> {
        let url = self.raw_url(path);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            log::warn!("Raw fetch of {} failed with status {}", path, status);
            return Err(SourceError::Status {
                status: status.as_u16(),
                detail: Value::Null,
            });
        }
        Ok(response.text().await?)
    }

    fn raw_base_url(&self) -> &str {
        &self.raw_base_url
    }
}
