use std::collections::{BTreeSet, HashMap};

use crate::model::{Attribute, DiffItem, DiffStatus};

/// Structural diff of two flattened attribute lists, sorted by path.
///
/// Attributes are keyed by path; a duplicate path within one list keeps the
/// last occurrence. Example values do not take part in the comparison.
pub fn diff_attributes(from: &[Attribute], to: &[Attribute]) -> Vec<DiffItem> {
    let from_by_path: HashMap<&str, &Attribute> =
        from.iter().map(|a| (a.path.as_str(), a)).collect();
    let to_by_path: HashMap<&str, &Attribute> = to.iter().map(|a| (a.path.as_str(), a)).collect();

    let paths: BTreeSet<&str> = from_by_path
        .keys()
        .chain(to_by_path.keys())
        .copied()
        .collect();

    paths
        .into_iter()
        .filter_map(|path| {
            let before = from_by_path.get(path).copied();
            let after = to_by_path.get(path).copied();
            let status = match (before, after) {
                (None, Some(_)) => DiffStatus::Added,
                (Some(_), None) => DiffStatus::Removed,
                (Some(a), Some(b)) if !a.same_shape(b) => DiffStatus::Changed,
                _ => return None,
            };
            Some(DiffItem {
                path: path.to_string(),
                status,
                from: before.cloned(),
                to: after.cloned(),
            })
        })
        .collect()
}
