use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Attribute, DiffItem, DiffSummary, SourceLine, VersionEntry};

/// Result of loading one artifact; a failed panel never aborts its siblings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready { value: T },
    Unavailable { reason: String },
}

impl<T> Panel<T> {
    pub fn ready(value: T) -> Self {
        Panel::Ready { value }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Panel::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Panel::Ready { value } => Some(value),
            Panel::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Panel::Ready { .. } => None,
            Panel::Unavailable { reason } => Some(reason),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Panel::Ready { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagram {
    /// Inline vector markup, sized by its container
    Svg { markup: String },
    /// Raster image reference
    Image { src: String },
}

/// Everything the model browser renders for one version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelView {
    pub model: String,
    pub label: String,
    pub version: String,
    pub versions: Vec<String>,
    pub entry: VersionEntry,
    pub attributes: Panel<Vec<Attribute>>,
    pub example: Panel<Value>,
    pub minimal_payload: Panel<Value>,
    pub diagram: Panel<Diagram>,
    pub source: Panel<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDiffView {
    pub left_title: String,
    pub right_title: String,
    pub lines: Vec<SourceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDiffView {
    pub summary: DiffSummary,
    pub items: Vec<DiffItem>,
}

/// Everything the diff page renders for a pair of versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffView {
    pub model: String,
    pub label: String,
    pub from: String,
    pub to: String,
    pub versions: Vec<String>,
    pub attributes: Panel<AttributeDiffView>,
    pub source: Panel<SourceDiffView>,
}
