use serde_json::{Map, Value};

use crate::logic::extract::{is_array, is_object, required_names, resolve_reference};

/// Build the smallest payload that keeps every required field of `schema`,
/// filling values from `example` where it has them.
pub fn minimal_payload(schema: &Value, example: Option<&Value>) -> Value {
    let mut synth = Synthesizer {
        root: schema,
        active_refs: Vec::new(),
    };
    synth.build(schema, example)
}

struct Synthesizer<'a> {
    root: &'a Value,
    active_refs: Vec<&'a str>,
}

impl<'a> Synthesizer<'a> {
    fn build(&mut self, node: &'a Value, example: Option<&Value>) -> Value {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            let target = resolve_reference(self.root, reference);
            return match target {
                Some(target) if !self.active_refs.contains(&reference) => {
                    self.active_refs.push(reference);
                    let value = self.build(target, example);
                    self.active_refs.pop();
                    value
                }
                _ => example.cloned().unwrap_or(Value::Null),
            };
        }

        if is_array(node) {
            if let Some(items) = node.get("items") {
                let hint = example.and_then(Value::as_array).and_then(|a| a.first());
                return Value::Array(vec![self.build(items, hint)]);
            }
        }

        if is_object(node) {
            return self.build_object(node, example);
        }

        leaf_value(node, example)
    }

    fn build_object(&mut self, node: &'a Value, example: Option<&Value>) -> Value {
        let required = required_names(node);
        let mut payload = Map::new();

        if let Some(properties) = node.get("properties").and_then(Value::as_object) {
            for (key, child) in properties {
                if !required.contains(&key.as_str()) {
                    continue;
                }
                let hint = example.and_then(|e| e.get(key.as_str()));
                payload.insert(key.clone(), self.build(child, hint));
            }
        }

        // required names without a property schema
        for name in required {
            if !payload.contains_key(name) {
                let value = example
                    .and_then(|e| e.get(name))
                    .cloned()
                    .unwrap_or(Value::Null);
                payload.insert(name.to_string(), value);
            }
        }

        Value::Object(payload)
    }
}

fn leaf_value(node: &Value, example: Option<&Value>) -> Value {
    if let Some(example) = example {
        return example.clone();
    }
    if let Some(default) = node.get("default") {
        return default.clone();
    }
    node.get("enum")
        .and_then(Value::as_array)
        .and_then(|values| values.first())
        .cloned()
        .unwrap_or(Value::Null)
}
