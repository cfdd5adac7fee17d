use axum::{middleware, routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};

use crate::api::{handlers, security};
use crate::logic::viewer::Viewer;
use crate::store::traits::ModelSource;

pub fn create_router<S: ModelSource + 'static>(web_dir: &Path) -> Router<Arc<Viewer<S>>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Upstream tree listing mirror
        .route("/api/models", get(handlers::list_models::<S>))
        // Catalogue and per-version views
        .route("/api/catalogue", get(handlers::get_catalogue::<S>))
        .route(
            "/api/models/:model/versions/:version",
            get(handlers::get_model_version::<S>),
        )
        .route(
            "/api/models/:model/versions/:version/example",
            get(handlers::get_example::<S>),
        )
        .route(
            "/api/models/:model/versions/:version/minimal",
            get(handlers::get_minimal_payload::<S>),
        )
        .route("/api/diff", get(handlers::get_diff::<S>))
        // Front-end pages and assets
        .route_service("/", ServeFile::new(web_dir.join("index.html")))
        .route_service("/diff", ServeFile::new(web_dir.join("diff.html")))
        .route_service("/models/*route", ServeFile::new(web_dir.join("index.html")))
        .fallback_service(ServeDir::new(web_dir))
        .layer(ServiceBuilder::new().layer(middleware::from_fn(security::security_headers)))
}
