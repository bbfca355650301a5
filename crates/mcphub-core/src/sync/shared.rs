//! Thread-safe handle around the orchestrator.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use super::{ClientServerStatus, SyncOrchestrator};
use crate::client_config::ClientBlob;
use crate::error::{HubError, ValidationError};
use crate::registry::{ClientDefinition, Registry, ServerDefinition};

/// Cloneable handle that serializes all access to one [`SyncOrchestrator`].
///
/// Registry mutations and client document writes run under a single lock, so
/// concurrent callers cannot interleave writes to the registry or to a client
/// file.
#[derive(Debug, Clone)]
pub struct SharedHub {
    inner: Arc<Mutex<SyncOrchestrator>>,
}

impl SharedHub {
    pub fn new(orchestrator: SyncOrchestrator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(orchestrator)),
        }
    }

    // Mutations only swap in a validated copy, so a poisoned lock still
    // guards a consistent registry.
    fn lock(&self) -> MutexGuard<'_, SyncOrchestrator> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with exclusive access to the orchestrator.
    pub fn with<R>(&self, f: impl FnOnce(&mut SyncOrchestrator) -> R) -> R {
        f(&mut self.lock())
    }

    /// Copy of the live registry.
    pub fn snapshot(&self) -> Registry {
        self.lock().registry().clone()
    }

    pub fn list_servers(&self) -> Vec<ServerDefinition> {
        self.lock().list_servers().to_vec()
    }

    pub fn list_clients(&self) -> BTreeMap<String, ClientDefinition> {
        self.lock().list_clients().clone()
    }

    pub fn get_server(&self, name: &str) -> Result<ServerDefinition, HubError> {
        self.lock().get_server(name).cloned()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.lock().validate()
    }

    pub fn add_server(
        &self,
        name: &str,
        config: Map<String, Value>,
    ) -> Result<ServerDefinition, HubError> {
        self.lock().add_server(name, config)
    }

    pub fn remove_server(&self, name: &str) -> Result<ServerDefinition, HubError> {
        self.lock().remove_server(name)
    }

    pub fn toggle_client_server(
        &self,
        client_id: &str,
        server_name: &str,
        enabled: bool,
    ) -> Result<(), HubError> {
        self.lock()
            .toggle_client_server(client_id, server_name, enabled)
    }

    pub fn client_server_status(
        &self,
        client_id: &str,
        server_name: &str,
    ) -> Result<bool, HubError> {
        self.lock().client_server_status(client_id, server_name)
    }

    pub fn client_status(&self, client_id: &str) -> Result<Vec<ClientServerStatus>, HubError> {
        self.lock().client_status(client_id)
    }

    pub fn read_client_config(&self, client_id: &str) -> Result<ClientBlob, HubError> {
        self.lock().read_client_config(client_id)
    }

    pub fn sync_all_clients(&self) -> Result<(), HubError> {
        self.lock().sync_all_clients()
    }
}
