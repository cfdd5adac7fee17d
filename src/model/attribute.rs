use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path segment used for array traversal
pub const ARRAY_SEGMENT: &str = "[]";

/// A leaf field discovered by flattening a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Segments joined by '.', `[]` marks array traversal
    pub path: String,
    pub description: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Attribute {
    pub fn new(
        path: impl Into<String>,
        data_type: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            data_type: data_type.into(),
            required,
            example: None,
        }
    }

    /// Compares the fields the diff engine cares about
    pub fn same_shape(&self, other: &Attribute) -> bool {
        self.description == other.description
            && self.data_type == other.data_type
            && self.required == other.required
    }
}

/// Cache key for the attributes of one model version
pub fn attribute_cache_key(model: &str, version: &str) -> String {
    format!("{}@{}", model, version)
}
