pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod session;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export the extraction and diff engine
pub use logic::{
    build_catalogue, compare_versions, diff_attributes, diff_lines, extract_attributes,
    load_diagram, minimal_payload, sample_example, SchemaExtractor, ViewError, ViewTransform,
    Viewer,
};

// Export all model types
pub use model::*;

pub use session::{Outcome, Page, ViewRoute, ViewerSession};

// Export store types
pub use store::{GithubSource, ModelSource, SourceError};

use std::path::Path;
use std::sync::Arc;

/// Wire the GitHub source, caches and router from configuration
pub fn build_app(config: &crate::config::AppConfig) -> anyhow::Result<axum::Router> {
    let source = GithubSource::new(&config.github, config.github_token())?;
    let viewer = Viewer::new(Arc::new(source), config.cache_ttl())
        .with_diagram_container(config.viewer.diagram_container_id.clone());

    Ok(routes::create_router(Path::new(&config.server.web_dir)).with_state(Arc::new(viewer)))
}
