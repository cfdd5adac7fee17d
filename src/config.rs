use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::logic::diagram::DEFAULT_CONTAINER_ID;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub github: GithubConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the static front-end (index.html, diff.html, assets)
    pub web_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub tree_url: String,
    pub raw_base_url: String,
    pub token: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub diagram_container_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            web_dir: "web".to_string(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            tree_url: "https://api.github.com/repos/eclipse-tractusx/sldt-semantic-models/git/trees/main?recursive=1"
                .to_string(),
            raw_base_url: "https://raw.githubusercontent.com/eclipse-tractusx/sldt-semantic-models/main"
                .to_string(),
            token: None,
            cache_ttl_secs: None,
            timeout_secs: 30,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            diagram_container_id: DEFAULT_CONTAINER_ID.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Environment variables like SMV__GITHUB__CACHE_TTL_SECS
        config = config.add_source(
            config::Environment::with_prefix("SMV")
                .separator("__")
                .prefix_separator("__"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// GitHub token from config or the conventional environment variable
    pub fn github_token(&self) -> Option<String> {
        if let Some(token) = &self.github.token {
            return Some(token.clone());
        }
        std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty())
    }

    /// Tree listing TTL from config, `GITHUB_CACHE_TTL`, or 300 seconds
    pub fn cache_ttl(&self) -> Duration {
        let secs = self.github.cache_ttl_secs.or_else(|| {
            std::env::var("GITHUB_CACHE_TTL")
                .ok()
                .and_then(|v| v.trim().parse().ok())
        });
        Duration::from_secs(secs.unwrap_or(300))
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
