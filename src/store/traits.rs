use serde_json::Value;

use crate::model::TreeEntry;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream returned status {status}")]
    Status { status: u16, detail: Value },
    #[error("invalid JSON in {path}: {message}")]
    InvalidJson { path: String, message: String },
    #[error("not found: {0}")]
    NotFound(String),
}

impl SourceError {
    /// HTTP status to report to our own clients
    pub fn status_code(&self) -> u16 {
        match self {
            SourceError::Status { status, .. } => *status,
            SourceError::NotFound(_) => 404,
            SourceError::Transport(_) | SourceError::InvalidJson { .. } => 502,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Transport(err.to_string())
    }
}

/// The remote repository the catalogue is read from
#[async_trait::async_trait]
pub trait ModelSource: Send + Sync {
    /// Raw recursive tree listing, entries kept exactly as upstream sent them
    async fn fetch_tree(&self) -> Result<Vec<Value>, SourceError>;
    /// Raw file content by repository path
    async fn fetch_raw(&self, path: &str) -> Result<String, SourceError>;

    /// Base URL raw files are served from, used to resolve relative assets
    fn raw_base_url(&self) -> &str;

    async fn fetch_json(&self, path: &str) -> Result<Value, SourceError> {
        let text = self.fetch_raw(path).await?;
        serde_json::from_str(&text).map_err(|e| SourceError::InvalidJson {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Decode upstream entries, skipping any that lack a path or type
pub fn tree_entries(raw: &[Value]) -> Vec<TreeEntry> {
    raw.iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}
