//! Registry mutations and client reconciliation.
//!
//! [`SyncOrchestrator`] is the only place that changes the registry. Every
//! mutation is applied to a copy, validated, persisted, and only then becomes
//! the live registry; client documents are updated afterwards.

pub mod shared;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client_config::{ClientBlob, ClientProjector};
use crate::config::RegistryPersistence;
use crate::error::{ClientFailure, HubError, ValidationError};
use crate::registry::{ClientDefinition, Registry, ServerDefinition};
use crate::validation::TransportValidator;

pub use shared::SharedHub;

/// One registry server as seen from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientServerStatus {
    pub server: String,
    /// Listed in the client's `enabled` set
    pub enabled: bool,
    /// Present in the client's document
    pub present: bool,
}

impl ClientServerStatus {
    /// Registry and client document disagree.
    pub fn is_drifted(&self) -> bool {
        self.enabled != self.present
    }
}

pub struct SyncOrchestrator {
    registry: Registry,
    store: Box<dyn RegistryPersistence>,
    validator: TransportValidator,
    projector: ClientProjector,
}

impl fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("registry", &self.registry)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl SyncOrchestrator {
    pub fn new(registry: Registry, store: impl RegistryPersistence + 'static) -> Self {
        Self::with_validator(registry, store, TransportValidator::new())
    }

    pub fn with_validator(
        registry: Registry,
        store: impl RegistryPersistence + 'static,
        validator: TransportValidator,
    ) -> Self {
        Self {
            registry,
            store: Box::new(store),
            projector: ClientProjector::new(validator.clone()),
            validator,
        }
    }

    /// Load the registry from `store`.
    pub fn open(store: impl RegistryPersistence + 'static) -> Result<Self, HubError> {
        Self::open_with_validator(store, TransportValidator::new())
    }

    pub fn open_with_validator(
        store: impl RegistryPersistence + 'static,
        validator: TransportValidator,
    ) -> Result<Self, HubError> {
        let registry = store.load()?;
        Ok(Self::with_validator(registry, store, validator))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn projector(&self) -> &ClientProjector {
        &self.projector
    }

    pub fn list_servers(&self) -> &[ServerDefinition] {
        self.registry.servers()
    }

    pub fn list_clients(&self) -> &BTreeMap<String, ClientDefinition> {
        self.registry.clients()
    }

    /// Registry-level status of a server: its stored definition.
    pub fn get_server(&self, name: &str) -> Result<&ServerDefinition, HubError> {
        self.registry
            .server(name)
            .ok_or_else(|| HubError::ServerNotFound(name.to_string()))
    }

    /// Run whole-registry validation against the live registry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.registry.validate(&self.validator)
    }

    /// Add a server to the registry. No client document is touched.
    pub fn add_server(
        &mut self,
        name: &str,
        config: Map<String, Value>,
    ) -> Result<ServerDefinition, HubError> {
        let mut candidate = self.registry.clone();
        let added = candidate.add_server(&self.validator, name, config)?.clone();
        self.commit(candidate)?;

        tracing::info!("Added server '{}'", name);
        Ok(added)
    }

    /// Remove a server from the registry and from every client that had it.
    pub fn remove_server(&mut self, name: &str) -> Result<ServerDefinition, HubError> {
        let affected: Vec<String> = self
            .registry
            .clients()
            .iter()
            .filter(|(_, client)| client.is_enabled(name))
            .map(|(id, _)| id.clone())
            .collect();

        let mut candidate = self.registry.clone();
        let removed = candidate.remove_server(name)?;
        self.commit(candidate)?;
        tracing::info!("Removed server '{}'", name);

        let failures: Vec<ClientFailure> = affected
            .into_iter()
            .filter_map(|client| {
                self.projector
                    .update_server_status(&self.registry, &client, name, false)
                    .err()
                    .map(|error| {
                        tracing::warn!("Failed to update client '{}': {}", client, error);
                        ClientFailure { client, error }
                    })
            })
            .collect();

        if failures.is_empty() {
            Ok(removed)
        } else {
            Err(HubError::SyncFailed { failures })
        }
    }

    /// Enable or disable one server for one client, then project the change.
    pub fn toggle_client_server(
        &mut self,
        client_id: &str,
        server_name: &str,
        enabled: bool,
    ) -> Result<(), HubError> {
        let mut candidate = self.registry.clone();
        let changed = candidate.set_enabled(client_id, server_name, enabled)?;
        self.commit(candidate)?;

        let action = if enabled { "Enabled" } else { "Disabled" };
        if changed {
            tracing::info!("{} server '{}' for client '{}'", action, server_name, client_id);
        } else {
            tracing::debug!(
                "{} server '{}' for client '{}' (unchanged)",
                action,
                server_name,
                client_id
            );
        }

        self.projector
            .update_server_status(&self.registry, client_id, server_name, enabled)
    }

    /// Whether `server_name` is present in the client's document.
    pub fn client_server_status(
        &self,
        client_id: &str,
        server_name: &str,
    ) -> Result<bool, HubError> {
        self.projector
            .server_status(&self.registry, client_id, server_name)
    }

    /// Every registry server, with its enablement and presence for one client.
    pub fn client_status(&self, client_id: &str) -> Result<Vec<ClientServerStatus>, HubError> {
        let client = self
            .registry
            .client(client_id)
            .ok_or_else(|| HubError::ClientNotFound(client_id.to_string()))?;
        let blob = self.projector.read(&self.registry, client_id)?;

        Ok(self
            .registry
            .servers()
            .iter()
            .map(|server| ClientServerStatus {
                server: server.name.clone(),
                enabled: client.is_enabled(&server.name),
                present: blob.contains_server(&server.name),
            })
            .collect())
    }

    /// A client's document as currently stored.
    pub fn read_client_config(&self, client_id: &str) -> Result<ClientBlob, HubError> {
        self.projector.read(&self.registry, client_id)
    }

    /// Rewrite every client document from the registry.
    ///
    /// Every client is attempted. A client stops at its first failing server
    /// and is reported in [`HubError::SyncFailed`]; the others still sync.
    pub fn sync_all_clients(&self) -> Result<(), HubError> {
        let mut failures = Vec::new();

        for (client_id, client) in self.registry.clients() {
            if let Err(error) = self.sync_client(client_id, client) {
                tracing::warn!("Failed to sync client '{}': {}", client_id, error);
                failures.push(ClientFailure {
                    client: client_id.clone(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            tracing::info!("Synced {} client(s)", self.registry.clients().len());
            Ok(())
        } else {
            Err(HubError::SyncFailed { failures })
        }
    }

    fn sync_client(&self, client_id: &str, client: &ClientDefinition) -> Result<(), HubError> {
        for server in self.registry.servers() {
            self.projector.update_server_status(
                &self.registry,
                client_id,
                &server.name,
                client.is_enabled(&server.name),
            )?;
        }
        Ok(())
    }

    fn commit(&mut self, candidate: Registry) -> Result<(), HubError> {
        candidate.validate(&self.validator)?;
        self.store.save(&candidate)?;
        self.registry = candidate;
        Ok(())
    }
}
