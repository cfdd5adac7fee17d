//! Flattening of JSON-schema documents into leaf attributes.
//!
//! The walk resolves `$ref` nodes against the same document, unwraps arrays
//! into a `[]` path segment, descends into object properties in declaration
//! order and emits one [`Attribute`] per leaf. Descriptions are inherited as
//! a fallback hint from the nearest ancestor that supplies one.

use itertools::Itertools;
use serde_json::Value;

use crate::logic::diagnostics::{DiagnosticEvent, Diagnostics, NoopDiagnostics};
use crate::model::{Attribute, ARRAY_SEGMENT};

/// Flatten `schema` with no diagnostics observer
pub fn extract_attributes(schema: &Value) -> Vec<Attribute> {
    SchemaExtractor::new(schema).extract()
}

/// Resolve an internal reference (`#` or `#/json/pointer`) against `root`.
/// Anything else is an external reference and resolves to nothing.
pub fn resolve_reference<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    match reference.strip_prefix('#') {
        Some("") => Some(root),
        Some(pointer) if pointer.starts_with('/') => root.pointer(pointer),
        _ => None,
    }
}

pub(crate) fn description(node: &Value) -> Option<&str> {
    node.get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
}

pub(crate) fn declares_type(node: &Value, wanted: &str) -> bool {
    match node.get("type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

pub(crate) fn is_array(node: &Value) -> bool {
    if declares_type(node, "array") {
        return node.get("items").is_some();
    }
    node.get("type").is_none() && node.get("items").is_some()
}

pub(crate) fn is_object(node: &Value) -> bool {
    declares_type(node, "object") || node.get("properties").map_or(false, Value::is_object)
}

pub(crate) fn required_names(node: &Value) -> Vec<&str> {
    node.get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn type_name(node: &Value) -> String {
    match node.get("type") {
        Some(Value::String(t)) => t.clone(),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).join("|"),
        _ => String::new(),
    }
}

pub struct SchemaExtractor<'a> {
    root: &'a Value,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> SchemaExtractor<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            diagnostics: &NoopDiagnostics,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: &'a dyn Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn extract(&self) -> Vec<Attribute> {
        let mut walk = Walk {
            root: self.root,
            diagnostics: self.diagnostics,
            active_refs: Vec::new(),
            path: Vec::new(),
            out: Vec::new(),
        };
        walk.resolve(self.root, false, Inherited::default());
        walk.out
    }
}

/// Description context carried down the recursion
#[derive(Debug, Clone, Copy, Default)]
struct Inherited<'a> {
    /// Fallback for nodes that describe nothing themselves
    hint: Option<&'a str>,
    /// Description of a referencing node; beats the referenced node's own
    pinned: Option<&'a str>,
}

impl<'a> Inherited<'a> {
    fn hint(hint: Option<&'a str>) -> Self {
        Self { hint, pinned: None }
    }
}

struct Walk<'a> {
    root: &'a Value,
    diagnostics: &'a dyn Diagnostics,
    active_refs: Vec<&'a str>,
    path: Vec<&'a str>,
    out: Vec<Attribute>,
}

impl<'a> Walk<'a> {
    fn resolve(&mut self, node: &'a Value, required: bool, inherited: Inherited<'a>) {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            self.follow_reference(node, reference, required, inherited);
            return;
        }

        let own = match inherited.pinned {
            Some(pinned) => Some(pinned),
            None => description(node),
        };

        if is_array(node) {
            if let Some(items) = node.get("items") {
                self.path.push(ARRAY_SEGMENT);
                self.resolve(items, required, Inherited::hint(own.or(inherited.hint)));
                self.path.pop();
            }
            return;
        }

        if is_object(node) {
            let required_set = required_names(node);
            let hint = inherited.pinned.or(inherited.hint);
            if let Some(properties) = node.get("properties").and_then(Value::as_object) {
                for (key, child) in properties {
                    self.path.push(key.as_str());
                    self.resolve(
                        child,
                        required_set.contains(&key.as_str()),
                        Inherited::hint(hint),
                    );
                    self.path.pop();
                }
            }
            return;
        }

        self.out.push(Attribute::new(
            self.path.join("."),
            type_name(node),
            required,
            own.or(inherited.hint).unwrap_or_default(),
        ));
    }

    fn follow_reference(
        &mut self,
        node: &'a Value,
        reference: &'a str,
        required: bool,
        inherited: Inherited<'a>,
    ) {
        let Some(target) = resolve_reference(self.root, reference) else {
            self.diagnostics
                .record(DiagnosticEvent::UnresolvedReference(reference.to_string()));
            return;
        };
        if self.active_refs.contains(&reference) {
            self.diagnostics
                .record(DiagnosticEvent::CyclicReference(reference.to_string()));
            return;
        }

        let next = match description(node) {
            Some(referencing) => Inherited {
                hint: Some(referencing),
                pinned: Some(referencing),
            },
            None => inherited,
        };

        self.active_refs.push(reference);
        self.resolve(target, required, next);
        self.active_refs.pop();
    }
}

/// Walk `path` through an example document, `[]` taking the first element
pub fn sample_example(example: &Value, path: &str) -> Option<Value> {
    let mut current = example;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = if segment == ARRAY_SEGMENT {
            current.as_array()?.first()?
        } else {
            current.as_object()?.get(segment)?
        };
    }
    Some(current.clone())
}

/// Pair every attribute with its sampled example value, if any
pub fn attach_examples(attributes: &mut [Attribute], example: &Value) {
    for attribute in attributes.iter_mut() {
        attribute.example = sample_example(example, &attribute.path);
    }
}
