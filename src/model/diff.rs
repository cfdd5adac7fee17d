use serde::{Deserialize, Serialize};

use crate::model::Attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
}

/// Difference for one attribute path between two versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffItem {
    pub path: String,
    pub status: DiffStatus,
    pub from: Option<Attribute>,
    pub to: Option<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl DiffSummary {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.changed
    }
}

impl<'a> FromIterator<&'a DiffItem> for DiffSummary {
    fn from_iter<I: IntoIterator<Item = &'a DiffItem>>(iter: I) -> Self {
        let mut summary = DiffSummary::default();
        for item in iter {
            match item.status {
                DiffStatus::Added => summary.added += 1,
                DiffStatus::Removed => summary.removed += 1,
                DiffStatus::Changed => summary.changed += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    Same,
    Changed,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub title: String,
    pub lines: Vec<String>,
}

/// One positional row of a side-by-side source comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    pub index: usize,
    pub status: LineStatus,
    pub left: Option<String>,
    pub right: Option<String>,
}
