//! Side-by-side source comparison.
//!
//! Lines are aligned strictly by index, not by a minimal edit script. A line
//! inserted or deleted near the top of a document therefore marks every later
//! line as `changed`.

use serde_json::Value;

use crate::model::{LineStatus, SourceDocument, SourceLine};

impl SourceDocument {
    pub fn from_text(title: impl Into<String>, text: &str) -> Self {
        Self {
            title: title.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Pretty-printed JSON, used when a version has no model source
    pub fn from_json(title: impl Into<String>, value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::from_text(title, &text)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub fn diff_lines(left: &SourceDocument, right: &SourceDocument) -> Vec<SourceLine> {
    let len = left.len().max(right.len());
    (0..len)
        .map(|index| {
            let l = left.lines.get(index);
            let r = right.lines.get(index);
            let status = match (l, r) {
                (None, Some(_)) => LineStatus::Added,
                (Some(_), None) => LineStatus::Removed,
                (Some(a), Some(b)) if a != b => LineStatus::Changed,
                _ => LineStatus::Same,
            };
            SourceLine {
                index,
                status,
                left: l.cloned(),
                right: r.cloned(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(lines: &[&str]) -> SourceDocument {
        SourceDocument {
            title: "doc".to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_positional_diff() {
        let rows = diff_lines(&doc(&["a", "b", "c"]), &doc(&["a", "x", "c", "d"]));
        let statuses: Vec<LineStatus> = rows.iter().map(|r| r.status).collect();

        assert_eq!(
            statuses,
            vec![LineStatus::Same, LineStatus::Changed, LineStatus::Same, LineStatus::Added]
        );
        assert_eq!(rows[3].left, None);
        assert_eq!(rows[3].right.as_deref(), Some("d"));
    }

    #[test]
    fn test_removed_lines_and_cascade() {
        let rows = diff_lines(&doc(&["new", "a", "b"]), &doc(&["a", "b"]));
        let statuses: Vec<LineStatus> = rows.iter().map(|r| r.status).collect();

        // an insertion upstream shifts every later line
        assert_eq!(
            statuses,
            vec![LineStatus::Changed, LineStatus::Changed, LineStatus::Removed]
        );
    }

    #[test]
    fn test_empty_documents() {
        assert!(diff_lines(&doc(&[]), &doc(&[])).is_empty());
    }

    #[test]
    fn test_from_text_and_json() {
        let text = SourceDocument::from_text("Batch.ttl", "@prefix : <urn:x#> .\n:Batch a :Aspect .\n");
        assert_eq!(text.len(), 2);
        assert_eq!(text.title, "Batch.ttl");

        let json = SourceDocument::from_json("schema", &json!({"type": "object"}));
        assert_eq!(json.lines, vec!["{", "  \"type\": \"object\"", "}"]);
    }
}
