use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::logic::catalogue::build_catalogue;
use crate::logic::diagnostics::{Diagnostics, NoopDiagnostics};
use crate::logic::diagram::{load_diagram, DEFAULT_CONTAINER_ID};
use crate::logic::diff::diff_attributes;
use crate::logic::extract::{attach_examples, SchemaExtractor};
use crate::logic::minimal::minimal_payload;
use crate::logic::source_diff::diff_lines;
use crate::model::{
    ArtifactKind, Attribute, AttributeDiffView, Catalogue, DiffSummary, DiffView,
    ModelCatalogueEntry, ModelView, Panel, SourceDiffView, SourceDocument, VersionEntry,
};
use crate::store::{tree_entries, AttributeCache, CachedTree, ModelSource, SourceError, TreeCache};

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("model '{0}' not found")]
    UnknownModel(String),
    #[error("version '{version}' of model '{model}' not found")]
    UnknownVersion { model: String, version: String },
    #[error("{model}@{version} has no {artifact:?} artifact")]
    MissingArtifact {
        model: String,
        version: String,
        artifact: ArtifactKind,
    },
}

/// The four artifacts of one model version, each loaded independently
#[derive(Debug, Clone)]
pub struct VersionArtifacts {
    pub schema: Panel<Value>,
    pub example: Panel<Value>,
    pub diagram_html: Panel<String>,
    pub source: Panel<String>,
}

fn to_panel<T>(result: Result<T, SourceError>) -> Panel<T> {
    match result {
        Ok(value) => Panel::ready(value),
        Err(err) => {
            log::warn!("artifact unavailable: {}", err);
            Panel::unavailable(err.to_string())
        }
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Shared, stateless-per-request orchestration over a [`ModelSource`].
///
/// Owns the tree listing cache and the `model@version` attribute cache.
pub struct Viewer<S: ModelSource> {
    source: Arc<S>,
    tree_cache: TreeCache,
    attributes: AttributeCache,
    diagnostics: Arc<dyn Diagnostics>,
    diagram_container_id: String,
}

impl<S: ModelSource> Viewer<S> {
    pub fn new(source: Arc<S>, cache_ttl: Duration) -> Self {
        Self {
            source,
            tree_cache: TreeCache::new(cache_ttl),
            attributes: AttributeCache::new(),
            diagnostics: Arc::new(NoopDiagnostics),
            diagram_container_id: DEFAULT_CONTAINER_ID.to_string(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_diagram_container(mut self, container_id: impl Into<String>) -> Self {
        self.diagram_container_id = container_id.into();
        self
    }

    /// Tree listing, from cache while fresh; a stale listing covers upstream failures
    pub async fn tree(&self) -> Result<CachedTree, SourceError> {
        if let Some(tree) = self.tree_cache.get_fresh().await {
            log::debug!("serving cached tree listing");
            return Ok(CachedTree { tree, cached: true });
        }

        match self.source.fetch_tree().await {
            Ok(tree) => Ok(CachedTree {
                tree: self.tree_cache.put(tree).await,
                cached: false,
            }),
            Err(err) => match self.tree_cache.get_stale().await {
                Some(tree) => {
                    log::warn!("tree listing failed ({}), serving stale cache", err);
                    Ok(CachedTree { tree, cached: true })
                }
                None => Err(err),
            },
        }
    }

    pub async fn catalogue(&self) -> Result<Catalogue, SourceError> {
        let listing = self.tree().await?;
        let catalogue = build_catalogue(&tree_entries(&listing.tree), self.diagnostics.as_ref());
        log::debug!("catalogue built with {} models", catalogue.len());
        Ok(catalogue)
    }

    async fn json_panel(&self, path: Option<&str>, what: &str) -> Panel<Value> {
        match path {
            Some(path) => to_panel(self.source.fetch_json(path).await),
            None => Panel::unavailable(format!("no {} published for this version", what)),
        }
    }

    async fn text_panel(&self, path: Option<&str>, what: &str) -> Panel<String> {
        match path {
            Some(path) => to_panel(self.source.fetch_raw(path).await),
            None => Panel::unavailable(format!("no {} published for this version", what)),
        }
    }

    /// Fetch schema, example, diagram fragment and model source concurrently
    pub async fn load_artifacts(&self, entry: &VersionEntry) -> VersionArtifacts {
        let (schema, example, diagram_html, source) = tokio::join!(
            self.json_panel(entry.schema_path.as_deref(), "schema"),
            self.json_panel(entry.example_path.as_deref(), "example"),
            self.text_panel(entry.diagram_path.as_deref(), "diagram"),
            self.text_panel(entry.ttl_path.as_deref(), "model source"),
        );
        VersionArtifacts {
            schema,
            example,
            diagram_html,
            source,
        }
    }

    /// Flattened attributes of `schema`, memoised under `model@version`
    pub async fn attributes_for(
        &self,
        model: &str,
        version: &str,
        schema: &Value,
    ) -> Arc<Vec<Attribute>> {
        if let Some(cached) = self.attributes.get(model, version).await {
            return cached;
        }
        let attributes = SchemaExtractor::new(schema)
            .with_diagnostics(self.diagnostics.as_ref())
            .extract();
        self.attributes.put(model, version, attributes).await
    }

    pub async fn model_view(
        &self,
        catalogue: &Catalogue,
        model: &str,
        version: Option<&str>,
    ) -> Result<ModelView, ViewError> {
        let (model_entry, entry) = resolve_version(catalogue, model, version)?;
        let artifacts = self.load_artifacts(entry).await;

        let (attributes, minimal) = match artifacts.schema.as_ready() {
            Some(schema) => {
                let cached = self
                    .attributes_for(&model_entry.name, &entry.version, schema)
                    .await;
                let mut attributes = cached.as_ref().clone();
                if let Some(example) = artifacts.example.as_ready() {
                    attach_examples(&mut attributes, example);
                }
                let minimal = minimal_payload(schema, artifacts.example.as_ready());
                (Panel::ready(attributes), Panel::ready(minimal))
            }
            None => {
                let reason = artifacts.schema.reason().unwrap_or_default();
                (Panel::unavailable(reason), Panel::unavailable(reason))
            }
        };

        let diagram = match artifacts.diagram_html {
            Panel::Ready { value: html } => {
                let asset_base = entry
                    .diagram_path
                    .as_deref()
                    .and_then(|p| p.rsplit_once('/'))
                    .map(|(dir, _)| format!("{}/{}", self.source.raw_base_url(), dir));
                match load_diagram(&html, &self.diagram_container_id, asset_base.as_deref()) {
                    Some(diagram) => Panel::ready(diagram),
                    None => Panel::unavailable("no diagram found in the generated documentation"),
                }
            }
            Panel::Unavailable { reason } => Panel::Unavailable { reason },
        };

        Ok(ModelView {
            model: model_entry.name.clone(),
            label: model_entry.label.clone(),
            version: entry.version.clone(),
            versions: version_names(model_entry),
            entry: entry.clone(),
            attributes,
            example: artifacts.example,
            minimal_payload: minimal,
            diagram,
            source: artifacts.source,
        })
    }

    /// Compare two versions. Without explicit versions, `to` is the latest and
    /// `from` the one before it.
    pub async fn diff_view(
        &self,
        catalogue: &Catalogue,
        model: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<DiffView, ViewError> {
        let (model_entry, to_entry) = resolve_version(catalogue, model, to)?;
        let from_entry = match from {
            Some(_) => resolve_version(catalogue, model, from)?.1,
            None => {
                let position = model_entry
                    .versions
                    .iter()
                    .position(|v| v.version == to_entry.version)
                    .unwrap_or(0);
                model_entry.versions.get(position + 1).unwrap_or(to_entry)
            }
        };

        let (left, right) = tokio::join!(
            self.load_artifacts(from_entry),
            self.load_artifacts(to_entry)
        );

        let attributes = match (left.schema.as_ready(), right.schema.as_ready()) {
            (Some(left_schema), Some(right_schema)) => {
                let (before, after) = tokio::join!(
                    self.attributes_for(&model_entry.name, &from_entry.version, left_schema),
                    self.attributes_for(&model_entry.name, &to_entry.version, right_schema),
                );
                let items = diff_attributes(&before, &after);
                let summary: DiffSummary = items.iter().collect();
                Panel::ready(AttributeDiffView { summary, items })
            }
            _ => Panel::unavailable(side_failure(
                &from_entry.version,
                &left.schema,
                &to_entry.version,
                &right.schema,
            )),
        };

        let source = source_diff(from_entry, &left, to_entry, &right);

        Ok(DiffView {
            model: model_entry.name.clone(),
            label: model_entry.label.clone(),
            from: from_entry.version.clone(),
            to: to_entry.version.clone(),
            versions: version_names(model_entry),
            attributes,
            source,
        })
    }

    pub async fn example(
        &self,
        catalogue: &Catalogue,
        model: &str,
        version: &str,
    ) -> Result<Value, ViewError> {
        let (model_entry, entry) = resolve_version(catalogue, model, Some(version))?;
        let path = entry
            .example_path
            .as_deref()
            .ok_or_else(|| missing(model_entry, entry, ArtifactKind::Example))?;
        Ok(self.source.fetch_json(path).await?)
    }

    /// Minimal payload download; a missing or broken example only loses the hints
    pub async fn minimal(
        &self,
        catalogue: &Catalogue,
        model: &str,
        version: &str,
    ) -> Result<Value, ViewError> {
        let (model_entry, entry) = resolve_version(catalogue, model, Some(version))?;
        let schema_path = entry
            .schema_path
            .as_deref()
            .ok_or_else(|| missing(model_entry, entry, ArtifactKind::Schema))?;

        let (schema, example) = tokio::join!(
            self.source.fetch_json(schema_path),
            self.json_panel(entry.example_path.as_deref(), "example"),
        );
        Ok(minimal_payload(&schema?, example.as_ready()))
    }
}

pub fn resolve_version<'c>(
    catalogue: &'c Catalogue,
    model: &str,
    version: Option<&str>,
) -> Result<(&'c ModelCatalogueEntry, &'c VersionEntry), ViewError> {
    let model_entry = catalogue
        .model(model)
        .ok_or_else(|| ViewError::UnknownModel(model.to_string()))?;
    let entry = match version {
        Some(version) => model_entry.version(version),
        None => model_entry.latest(),
    };
    let entry = entry.ok_or_else(|| ViewError::UnknownVersion {
        model: model.to_string(),
        version: version.unwrap_or("latest").to_string(),
    })?;
    Ok((model_entry, entry))
}

fn version_names(model: &ModelCatalogueEntry) -> Vec<String> {
    model.versions.iter().map(|v| v.version.clone()).collect()
}

fn missing(model: &ModelCatalogueEntry, entry: &VersionEntry, artifact: ArtifactKind) -> ViewError {
    ViewError::MissingArtifact {
        model: model.name.clone(),
        version: entry.version.clone(),
        artifact,
    }
}

fn side_failure<T, U>(from: &str, left: &Panel<T>, to: &str, right: &Panel<U>) -> String {
    [(from, left.reason()), (to, right.reason())]
        .into_iter()
        .filter_map(|(version, reason)| reason.map(|r| format!("{}: {}", version, r)))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Model sources when both sides have one, otherwise the pretty-printed schemas
fn source_diff(
    from_entry: &VersionEntry,
    left: &VersionArtifacts,
    to_entry: &VersionEntry,
    right: &VersionArtifacts,
) -> Panel<SourceDiffView> {
    let title = |entry: &VersionEntry, kind: ArtifactKind| {
        let name = entry.path_for(kind).map(file_name).unwrap_or("schema");
        format!("{} ({})", name, entry.version)
    };

    let documents = match (left.source.as_ready(), right.source.as_ready()) {
        (Some(l), Some(r)) => Some((
            SourceDocument::from_text(title(from_entry, ArtifactKind::Source), l),
            SourceDocument::from_text(title(to_entry, ArtifactKind::Source), r),
        )),
        _ => match (left.schema.as_ready(), right.schema.as_ready()) {
            (Some(l), Some(r)) => Some((
                SourceDocument::from_json(title(from_entry, ArtifactKind::Schema), l),
                SourceDocument::from_json(title(to_entry, ArtifactKind::Schema), r),
            )),
            _ => None,
        },
    };

    match documents {
        Some((left_doc, right_doc)) => Panel::ready(SourceDiffView {
            lines: diff_lines(&left_doc, &right_doc),
            left_title: left_doc.title,
            right_title: right_doc.title,
        }),
        None => Panel::unavailable(side_failure(
            &from_entry.version,
            &left.schema,
            &to_entry.version,
            &right.schema,
        )),
    }
}
