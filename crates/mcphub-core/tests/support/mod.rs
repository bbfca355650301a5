#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use mcphub_core::config::RegistryPersistence;
use mcphub_core::registry::{ClientDefinition, Registry, ServerDefinition};

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {other}"),
    }
}

pub fn stdio(command: &str) -> Map<String, Value> {
    object(json!({ "command": command }))
}

pub fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Files named `<name>.backup.*` next to `path`.
pub fn backups_of(path: &Path) -> Vec<PathBuf> {
    let prefix = format!(
        "{}.backup.",
        path.file_name().unwrap().to_string_lossy()
    );
    let mut found: Vec<PathBuf> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with(&prefix))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    found
}

/// Temp dir holding client documents.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn client(&self, file: &str) -> ClientDefinition {
        ClientDefinition::new(self.path(file).to_string_lossy().into_owned())
    }

    /// Two `echo` servers and two clients with nothing enabled.
    pub fn registry(&self) -> Registry {
        Registry::new(6543)
            .with_server(ServerDefinition::new(
                "echo",
                object(json!({
                    "command": "echo",
                    "args": ["hello"],
                    "env": {"GREETING": "hi"},
                    "cwd": "/tmp",
                    "x-vendor": {"nested": [1, 2, 3]}
                })),
            ))
            .with_server(ServerDefinition::new(
                "remote",
                object(json!({
                    "httpUrl": "https://example.com/mcp",
                    "headers": {"Authorization": "Bearer token"}
                })),
            ))
            .with_client("alpha", self.client("alpha.json"))
            .with_client("beta", self.client("nested/beta/settings.json"))
    }
}

/// Registry persistence kept in memory, with a switch to make saves fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Arc<Mutex<Option<Registry>>>,
    fail_saves: Arc<AtomicBool>,
    save_count: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn with_registry(registry: Registry) -> Self {
        let store = Self::default();
        *store.saved.lock().unwrap() = Some(registry);
        store
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Option<Registry> {
        self.saved.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

impl RegistryPersistence for MemoryStore {
    fn load(&self) -> anyhow::Result<Registry> {
        self.saved()
            .ok_or_else(|| anyhow::anyhow!("nothing stored"))
    }

    fn save(&self, registry: &Registry) -> anyhow::Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        *self.saved.lock().unwrap() = Some(registry.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
