#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use semantic_model_viewer::routes::create_router;
use semantic_model_viewer::{ModelSource, SourceError, Viewer};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

pub const RAW_BASE: &str = "https://raw.example.test/models/main";
pub const BATCH: &str = "io.catenax.batch";
pub const SERIAL_PART: &str = "io.catenax.serial_part";

/// In-memory repository standing in for GitHub
pub struct MemorySource {
    tree: Vec<Value>,
    files: HashMap<String, String>,
    fail_tree: AtomicBool,
    tree_calls: AtomicUsize,
    gate: Mutex<Option<String>>,
    pub entered: Notify,
    pub release: Notify,
}

impl MemorySource {
    pub fn new(tree: Vec<Value>, files: HashMap<String, String>) -> Self {
        Self {
            tree,
            files,
            fail_tree: AtomicBool::new(false),
            tree_calls: AtomicUsize::new(0),
            gate: Mutex::new(None),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn set_tree_failure(&self, fail: bool) {
        self.fail_tree.store(fail, Ordering::SeqCst);
    }

    pub fn tree_calls(&self) -> usize {
        self.tree_calls.load(Ordering::SeqCst)
    }

    /// Hold fetches of `path` until `release` is notified
    pub fn hold(&self, path: &str) {
        *self.gate.lock() = Some(path.to_string());
    }
}

#[async_trait]
impl ModelSource for MemorySource {
    async fn fetch_tree(&self) -> Result<Vec<Value>, SourceError> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_tree.load(Ordering::SeqCst) {
            return Err(SourceError::Status {
                status: 503,
                detail: json!({"message": "Service Unavailable"}),
            });
        }
        Ok(self.tree.clone())
    }

    async fn fetch_raw(&self, path: &str) -> Result<String, SourceError> {
        let gated = self.gate.lock().as_deref() == Some(path);
        if gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }

    fn raw_base_url(&self) -> &str {
        RAW_BASE
    }
}

fn blob(path: &str) -> Value {
    json!({"path": path, "type": "blob", "mode": "100644"})
}

fn tree_dir(path: &str) -> Value {
    json!({"path": path, "type": "tree", "mode": "040000"})
}

fn batch_schema(value_required: bool) -> Value {
    let local_required = if value_required {
        json!(["key", "value"])
    } else {
        json!(["key"])
    };
    json!({
        "type": "object",
        "required": ["catenaXId", "localIdentifiers"],
        "properties": {
            "catenaXId": {"type": "string", "description": "The Catena-X ID"},
            "localIdentifiers": {
                "type": "array",
                "description": "Local ids",
                "items": {"$ref": "#/components/schemas/LocalId"}
            }
        },
        "components": {
            "schemas": {
                "LocalId": {
                    "type": "object",
                    "required": local_required,
                    "properties": {
                        "key": {"type": "string"},
                        "value": {"type": "string"}
                    }
                }
            }
        }
    })
}

fn batch_schema_v2() -> Value {
    let mut schema = batch_schema(true);
    schema["properties"]["manufacturingInformation"] = json!({
        "type": "object",
        "properties": {
            "date": {"type": "string", "description": "Production date"}
        }
    });
    schema
}

/// Two versions of the batch model plus a schema-only serial part model
pub fn sample_source() -> MemorySource {
    let tree = vec![
        blob("README.md"),
        tree_dir(BATCH),
        blob("io.catenax.batch/1.0.0/Batch.ttl"),
        blob("io.catenax.batch/1.0.0/gen/Batch-schema.json"),
        blob("io.catenax.batch/1.0.0/gen/Batch.json"),
        blob("io.catenax.batch/2.0.0/Batch.ttl"),
        blob("io.catenax.batch/2.0.0/gen/Batch-schema.json"),
        blob("io.catenax.batch/2.0.0/gen/Batch.json"),
        blob("io.catenax.batch/2.0.0/gen/Batch.html"),
        blob("io.catenax.serial_part/1.0.0/gen/SerialPart-schema.json"),
    ];

    let example_v1 = json!({
        "catenaXId": "urn:uuid:1",
        "localIdentifiers": [{"key": "partInstanceId", "value": "X1"}]
    });
    let example_v2 = json!({
        "catenaXId": "urn:uuid:2",
        "localIdentifiers": [{"key": "partInstanceId", "value": "X2"}],
        "manufacturingInformation": {"date": "2024-01-01"}
    });
    let serial_schema = json!({
        "type": "object",
        "required": ["partTypeInformation"],
        "properties": {
            "partTypeInformation": {"type": "string", "description": "Part type"}
        }
    });

    let files: HashMap<String, String> = [
        ("io.catenax.batch/1.0.0/Batch.ttl", "line1\nline2\n".to_string()),
        (
            "io.catenax.batch/1.0.0/gen/Batch-schema.json",
            batch_schema(false).to_string(),
        ),
        ("io.catenax.batch/1.0.0/gen/Batch.json", example_v1.to_string()),
        (
            "io.catenax.batch/2.0.0/Batch.ttl",
            "line1\nline2 changed\nline3\n".to_string(),
        ),
        (
            "io.catenax.batch/2.0.0/gen/Batch-schema.json",
            batch_schema_v2().to_string(),
        ),
        ("io.catenax.batch/2.0.0/gen/Batch.json", example_v2.to_string()),
        (
            "io.catenax.batch/2.0.0/gen/Batch.html",
            r#"<html><body><div id="diagram"><img src="Batch.png"></div></body></html>"#
                .to_string(),
        ),
        (
            "io.catenax.serial_part/1.0.0/gen/SerialPart-schema.json",
            serial_schema.to_string(),
        ),
    ]
    .into_iter()
    .map(|(path, content)| (path.to_string(), content))
    .collect();

    MemorySource::new(tree, files)
}

pub fn web_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("web")
}

/// Serve the router on an ephemeral port and return its base URL
pub async fn spawn_server(source: Arc<MemorySource>, cache_ttl: Duration) -> String {
    let viewer = Viewer::new(source, cache_ttl);
    let app = create_router(&web_dir()).with_state(Arc::new(viewer));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let address = listener.local_addr().expect("listener has an address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });

    format!("http://{}", address)
}
