use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::logic::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::model::{
    ArtifactKind, Catalogue, ModelCatalogueEntry, TreeEntry, TreeEntryKind, VersionEntry,
};

/// Directory segment holding generated artifacts
pub const GENERATED_SEGMENT: &str = "gen";
pub const SOURCE_EXTENSION: &str = ".ttl";
const SCHEMA_SUFFIX: &str = "-schema.json";

/// Classify a file name by its suffix
pub fn classify(filename: &str, in_generated: bool) -> Option<ArtifactKind> {
    if filename.ends_with(SCHEMA_SUFFIX) {
        Some(ArtifactKind::Schema)
    } else if filename.ends_with(".json") {
        Some(ArtifactKind::Example)
    } else if filename.ends_with(SOURCE_EXTENSION) {
        Some(ArtifactKind::Source)
    } else if filename.ends_with(".html") && in_generated {
        Some(ArtifactKind::Diagram)
    } else {
        None
    }
}

/// Component-wise numeric comparison, missing or non-numeric components count as zero
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect()
    };
    let left = parse(a);
    let right = parse(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// `io.catenax.serial_part` -> `Serial Part`
pub fn model_label(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    last.split(|c| c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}

fn is_candidate(entry: &TreeEntry) -> bool {
    entry.kind == TreeEntryKind::Blob
        && (entry.path.split('/').any(|s| s == GENERATED_SEGMENT)
            || entry.path.ends_with(SOURCE_EXTENSION))
}

/// Build the model catalogue from a flat repository tree listing.
///
/// Malformed paths are dropped and reported to `diagnostics`. Within one
/// model version the last file of each artifact kind wins.
pub fn build_catalogue(entries: &[TreeEntry], diagnostics: &dyn Diagnostics) -> Catalogue {
    let mut models: BTreeMap<String, Vec<VersionEntry>> = BTreeMap::new();

    for entry in entries.iter().filter(|e| is_candidate(e)) {
        let parts: Vec<&str> = entry.path.split('/').collect();
        if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
            diagnostics.record(DiagnosticEvent::MalformedPath(entry.path.clone()));
            continue;
        }

        let model = parts[0];
        let version = parts[1];
        let filename = parts[parts.len() - 1];
        let in_generated = parts[2..parts.len() - 1].contains(&GENERATED_SEGMENT);

        let Some(kind) = classify(filename, in_generated) else {
            continue;
        };

        let versions = models.entry(model.to_string()).or_default();
        let index = match versions.iter().position(|v| v.version == version) {
            Some(index) => index,
            None => {
                versions.push(VersionEntry::new(version));
                versions.len() - 1
            }
        };
        versions[index].set_path(kind, entry.path.clone());
    }

    let models = models
        .into_iter()
        .filter_map(|(name, versions)| {
            let mut versions: Vec<VersionEntry> = versions
                .into_iter()
                .filter(|v| v.schema_path.is_some())
                .collect();
            if versions.is_empty() {
                return None;
            }
            // stable: equal versions keep input order
            versions.sort_by(|a, b| compare_versions(&b.version, &a.version));
            Some(ModelCatalogueEntry {
                label: model_label(&name),
                name,
                versions,
            })
        })
        .collect();

    Catalogue { models }
}
