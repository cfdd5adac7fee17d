use serde::{Deserialize, Serialize};

/// Kind of an upstream tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    Blob,
    Tree,
    #[serde(other)]
    Other,
}

/// One entry of the recursive repository tree listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: TreeEntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: TreeEntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: TreeEntryKind::Tree,
        }
    }
}

/// Artifact kinds a catalogue file can be classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Schema,
    Example,
    Diagram,
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    pub schema_path: Option<String>,
    pub example_path: Option<String>,
    pub ttl_path: Option<String>,
    pub diagram_path: Option<String>,
}

impl VersionEntry {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            schema_path: None,
            example_path: None,
            ttl_path: None,
            diagram_path: None,
        }
    }

    pub fn path_for(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Schema => self.schema_path.as_deref(),
            ArtifactKind::Example => self.example_path.as_deref(),
            ArtifactKind::Diagram => self.diagram_path.as_deref(),
            ArtifactKind::Source => self.ttl_path.as_deref(),
        }
    }

    pub fn set_path(&mut self, kind: ArtifactKind, path: String) {
        let slot = match kind {
            ArtifactKind::Schema => &mut self.schema_path,
            ArtifactKind::Example => &mut self.example_path,
            ArtifactKind::Diagram => &mut self.diagram_path,
            ArtifactKind::Source => &mut self.ttl_path,
        };
        *slot = Some(path);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalogueEntry {
    pub name: String,
    pub label: String,
    /// Newest first
    pub versions: Vec<VersionEntry>,
}

impl ModelCatalogueEntry {
    pub fn latest(&self) -> Option<&VersionEntry> {
        self.versions.first()
    }

    pub fn version(&self, version: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.version == version)
    }
}

/// Models -> versions -> artifact paths, rebuilt wholesale on every refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogue {
    pub models: Vec<ModelCatalogueEntry>,
}

impl Catalogue {
    pub fn model(&self, name: &str) -> Option<&ModelCatalogueEntry> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn version(&self, model: &str, version: &str) -> Option<&VersionEntry> {
        self.model(model).and_then(|m| m.version(version))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
