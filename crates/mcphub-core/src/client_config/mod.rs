//! Projection of registry state into client JSON documents.
//!
//! Only the `mcpServers` section of a client document is managed; every other
//! key is read, carried, and written back untouched.

pub mod backup;
pub mod json;

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::expand_home;
use crate::error::{HubError, ValidationError};
use crate::registry::Registry;
use crate::validation::TransportValidator;

pub use backup::{BACKUP_TIMESTAMP_FORMAT, backup_existing, backup_path_for};

/// Key of the managed section inside a client document.
pub const MCP_SERVERS_KEY: &str = "mcpServers";

/// A client document in memory.
///
/// `mcpServers` is always present and always an object; a document that lacks
/// it, or holds something else there, gets an empty mapping in its place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClientBlob {
    root: Map<String, Value>,
}

impl Default for ClientBlob {
    fn default() -> Self {
        Self::empty()
    }
}

impl ClientBlob {
    /// `{ "mcpServers": {} }`
    pub fn empty() -> Self {
        Self::from_map(Map::new())
    }

    pub fn from_map(mut root: Map<String, Value>) -> Self {
        match root.get_mut(MCP_SERVERS_KEY) {
            Some(Value::Object(_)) => {}
            Some(slot) => *slot = Value::Object(Map::new()),
            None => {
                root.insert(MCP_SERVERS_KEY.to_string(), Value::Object(Map::new()));
            }
        }
        Self { root }
    }

    /// The managed `mcpServers` section.
    pub fn servers(&self) -> Option<&Map<String, Value>> {
        self.root.get(MCP_SERVERS_KEY).and_then(Value::as_object)
    }

    pub fn server_names(&self) -> impl Iterator<Item = &str> {
        self.servers()
            .into_iter()
            .flat_map(|servers| servers.keys().map(String::as_str))
    }

    pub fn server(&self, name: &str) -> Option<&Value> {
        self.servers().and_then(|servers| servers.get(name))
    }

    pub fn contains_server(&self, name: &str) -> bool {
        self.server(name).is_some()
    }

    /// Set `mcpServers[name]`, returning the previous entry.
    pub fn insert_server(&mut self, name: impl Into<String>, config: Value) -> Option<Value> {
        let slot = self
            .root
            .entry(MCP_SERVERS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(servers) = slot.as_object_mut() {
            return servers.insert(name.into(), config);
        }

        let mut servers = Map::new();
        servers.insert(name.into(), config);
        *slot = Value::Object(servers);
        None
    }

    /// Drop `mcpServers[name]`; the remaining entries keep their order.
    pub fn remove_server(&mut self, name: &str) -> Option<Value> {
        self.root
            .get_mut(MCP_SERVERS_KEY)
            .and_then(Value::as_object_mut)
            .and_then(|servers| servers.shift_remove(name))
    }

    /// Any top-level key, managed or not.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.root
    }
}

impl From<Map<String, Value>> for ClientBlob {
    fn from(root: Map<String, Value>) -> Self {
        Self::from_map(root)
    }
}

/// Reads, edits, and writes client documents on behalf of the registry.
#[derive(Debug, Clone, Default)]
pub struct ClientProjector {
    validator: TransportValidator,
}

impl ClientProjector {
    pub fn new(validator: TransportValidator) -> Self {
        Self { validator }
    }

    /// Expanded location of a client's document.
    pub fn config_path(&self, registry: &Registry, client_id: &str) -> Result<PathBuf, HubError> {
        let client = registry
            .client(client_id)
            .ok_or_else(|| HubError::ClientNotFound(client_id.to_string()))?;
        Ok(expand_home(&client.config_path))
    }

    /// Load a client's document; a missing file reads as an empty blob.
    pub fn read(&self, registry: &Registry, client_id: &str) -> Result<ClientBlob, HubError> {
        let path = self.config_path(registry, client_id)?;
        let blob = match json::read_json_map(&path)? {
            Some(root) => ClientBlob::from_map(root),
            None => {
                tracing::debug!("No client config at {}, starting empty", path.display());
                ClientBlob::empty()
            }
        };
        Ok(blob)
    }

    /// Entry names must be non-empty and object entries need exactly one transport.
    pub fn validate_blob(&self, blob: &ClientBlob) -> Result<(), ValidationError> {
        match blob.servers() {
            Some(servers) => self.validator.validate_client_entries(servers),
            None => Ok(()),
        }
    }

    /// Replace a client's document with `blob`.
    ///
    /// An existing document is backed up first; the backup location is
    /// returned. A failed backup aborts the write.
    pub fn write(
        &self,
        registry: &Registry,
        client_id: &str,
        blob: &ClientBlob,
    ) -> Result<Option<PathBuf>, HubError> {
        let path = self.config_path(registry, client_id)?;
        self.validate_blob(blob)?;

        let backup = backup_existing(&path)?;
        json::write_json_map(&path, blob.as_map())?;
        tracing::info!("Wrote client config for '{}' to {}", client_id, path.display());
        Ok(backup)
    }

    /// Project one server into or out of a client's document.
    ///
    /// Enabling copies the server's whole config; disabling an entry that is
    /// not there still rewrites the document unchanged.
    pub fn update_server_status(
        &self,
        registry: &Registry,
        client_id: &str,
        server_name: &str,
        enabled: bool,
    ) -> Result<(), HubError> {
        let mut blob = self.read(registry, client_id)?;

        if enabled {
            let server = registry
                .server(server_name)
                .ok_or_else(|| HubError::ServerNotFound(server_name.to_string()))?;
            blob.insert_server(server_name, Value::Object(server.config.clone()));
        } else if blob.remove_server(server_name).is_none() {
            tracing::debug!(
                "Server '{}' already absent from client '{}'",
                server_name,
                client_id
            );
        }

        self.write(registry, client_id, &blob)?;
        Ok(())
    }

    /// Whether `server_name` is present in the client's `mcpServers`.
    pub fn server_status(
        &self,
        registry: &Registry,
        client_id: &str,
        server_name: &str,
    ) -> Result<bool, HubError> {
        Ok(self.read(registry, client_id)?.contains_server(server_name))
    }
}
