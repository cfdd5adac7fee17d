use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::logic::viewer::{ViewError, Viewer};
use crate::model::{Catalogue, DiffView, ModelView};
use crate::store::{ModelSource, SourceError};

pub type AppState<S> = Arc<Viewer<S>>;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Mirror of the upstream tree listing
#[derive(Debug, Serialize)]
pub struct TreeResponse<'a> {
    pub tree: &'a [Value],
    pub cached: bool,
}

/// Body returned when the listing is unavailable and nothing is cached
#[derive(Debug, Serialize)]
pub struct UpstreamErrorResponse {
    pub error: String,
    pub status: u16,
    pub detail: Value,
}

#[derive(Debug, Deserialize)]
pub struct DiffQuery {
    pub model: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn view_error(err: ViewError) -> ApiError {
    let status = match &err {
        ViewError::Source(source) => status_of(source.status_code()),
        ViewError::UnknownModel(_)
        | ViewError::UnknownVersion { .. }
        | ViewError::MissingArtifact { .. } => StatusCode::NOT_FOUND,
    };
    (status, Json(ErrorResponse::new(&err.to_string())))
}

async fn load_catalogue<S: ModelSource>(viewer: &Viewer<S>) -> Result<Catalogue, ApiError> {
    viewer
        .catalogue()
        .await
        .map_err(|e| view_error(ViewError::Source(e)))
}

pub async fn list_models<S: ModelSource>(State(viewer): State<AppState<S>>) -> Response {
    match viewer.tree().await {
        Ok(listing) => Json(TreeResponse {
            tree: &listing.tree,
            cached: listing.cached,
        })
        .into_response(),
        Err(err) => {
            let (status, detail) = match err {
                SourceError::Status { status, detail } => (status, detail),
                other => (other.status_code(), Value::String(other.to_string())),
            };
            (
                status_of(status),
                Json(UpstreamErrorResponse {
                    error: "GitHub API request failed".to_string(),
                    status,
                    detail,
                }),
            )
                .into_response()
        }
    }
}

pub async fn get_catalogue<S: ModelSource>(
    State(viewer): State<AppState<S>>,
) -> Result<Json<Catalogue>, ApiError> {
    Ok(Json(load_catalogue(&viewer).await?))
}

pub async fn get_model_version<S: ModelSource>(
    State(viewer): State<AppState<S>>,
    Path((model, version)): Path<(String, String)>,
) -> Result<Json<ModelView>, ApiError> {
    let catalogue = load_catalogue(&viewer).await?;
    let view = viewer
        .model_view(&catalogue, &model, Some(&version))
        .await
        .map_err(view_error)?;
    Ok(Json(view))
}

pub async fn get_example<S: ModelSource>(
    State(viewer): State<AppState<S>>,
    Path((model, version)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let catalogue = load_catalogue(&viewer).await?;
    let example = viewer
        .example(&catalogue, &model, &version)
        .await
        .map_err(view_error)?;
    Ok(Json(example))
}

pub async fn get_minimal_payload<S: ModelSource>(
    State(viewer): State<AppState<S>>,
    Path((model, version)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let catalogue = load_catalogue(&viewer).await?;
    let payload = viewer
        .minimal(&catalogue, &model, &version)
        .await
        .map_err(view_error)?;

    let filename = format!("{}-{}-minimal.json", model, version).replace('"', "");
    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )],
        Json(payload),
    )
        .into_response())
}

pub async fn get_diff<S: ModelSource>(
    State(viewer): State<AppState<S>>,
    Query(query): Query<DiffQuery>,
) -> Result<Json<DiffView>, ApiError> {
    let catalogue = load_catalogue(&viewer).await?;
    let view = viewer
        .diff_view(
            &catalogue,
            &query.model,
            query.from.as_deref().filter(|v| !v.is_empty()),
            query.to.as_deref().filter(|v| !v.is_empty()),
        )
        .await
        .map_err(view_error)?;
    Ok(Json(view))
}
