//! The canonical server registry and per-client enablement.

pub mod definition;

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::error::{HubError, ValidationError};
use crate::validation::TransportValidator;

pub use definition::{ClientDefinition, ServerDefinition};

/// Port used when the registry document does not set one.
pub const DEFAULT_SERVER_PORT: u32 = 6543;

/// Ordered servers plus the client map.
///
/// Server order is the order of the registry document, with additions
/// appended. Clients are keyed by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    server_port: u32,
    servers: Vec<ServerDefinition>,
    clients: BTreeMap<String, ClientDefinition>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_PORT)
    }
}

impl Registry {
    pub fn new(server_port: u32) -> Self {
        Self {
            server_port,
            servers: Vec::new(),
            clients: BTreeMap::new(),
        }
    }

    pub fn from_parts(
        server_port: u32,
        servers: Vec<ServerDefinition>,
        clients: BTreeMap<String, ClientDefinition>,
    ) -> Self {
        Self {
            server_port,
            servers,
            clients,
        }
    }

    /// Builder-style insert without validation, used by loaders and fixtures.
    pub fn with_server(mut self, server: ServerDefinition) -> Self {
        self.servers.push(server);
        self
    }

    pub fn with_client(mut self, id: impl Into<String>, client: ClientDefinition) -> Self {
        self.clients.insert(id.into(), client);
        self
    }

    pub fn server_port(&self) -> u32 {
        self.server_port
    }

    pub fn servers(&self) -> &[ServerDefinition] {
        &self.servers
    }

    pub fn clients(&self) -> &BTreeMap<String, ClientDefinition> {
        &self.clients
    }

    pub fn server(&self, name: &str) -> Option<&ServerDefinition> {
        self.servers.iter().find(|server| server.name == name)
    }

    pub fn contains_server(&self, name: &str) -> bool {
        self.server(name).is_some()
    }

    pub fn client(&self, id: &str) -> Option<&ClientDefinition> {
        self.clients.get(id)
    }

    /// Append a new server after validating it.
    ///
    /// Existing entries keep their positions.
    pub fn add_server(
        &mut self,
        validator: &TransportValidator,
        name: &str,
        config: Map<String, Value>,
    ) -> Result<&ServerDefinition, HubError> {
        if self.contains_server(name) {
            return Err(HubError::DuplicateServerName(name.to_string()));
        }
        validator.validate_server(name, &config)?;

        self.servers.push(ServerDefinition::new(name, config));
        let index = self.servers.len() - 1;
        Ok(&self.servers[index])
    }

    /// Remove a server and drop it from every client's enabled list.
    pub fn remove_server(&mut self, name: &str) -> Result<ServerDefinition, HubError> {
        let index = self
            .servers
            .iter()
            .position(|server| server.name == name)
            .ok_or_else(|| HubError::ServerNotFound(name.to_string()))?;
        let removed = self.servers.remove(index);
        for client in self.clients.values_mut() {
            client.disable(name);
        }
        Ok(removed)
    }

    /// Enable or disable a server for one client. Returns whether anything changed.
    pub fn set_enabled(
        &mut self,
        client_id: &str,
        server_name: &str,
        enabled: bool,
    ) -> Result<bool, HubError> {
        if !self.clients.contains_key(client_id) {
            return Err(HubError::ClientNotFound(client_id.to_string()));
        }
        if !self.contains_server(server_name) {
            return Err(HubError::ServerNotFound(server_name.to_string()));
        }
        let Some(client) = self.clients.get_mut(client_id) else {
            return Err(HubError::ClientNotFound(client_id.to_string()));
        };

        Ok(if enabled {
            client.enable(server_name)
        } else {
            client.disable(server_name)
        })
    }

    /// Check every registry-level invariant.
    ///
    /// Port range, non-empty server and client sets, each server valid on its
    /// own, each client with a config path and resolvable enabled list.
    pub fn validate(&self, validator: &TransportValidator) -> Result<(), ValidationError> {
        if !(1..=65535).contains(&self.server_port) {
            return Err(ValidationError::InvalidPort(self.server_port));
        }
        if self.servers.is_empty() {
            return Err(ValidationError::NoServers);
        }
        if self.clients.is_empty() {
            return Err(ValidationError::NoClients);
        }

        let mut names = HashSet::with_capacity(self.servers.len());
        for server in &self.servers {
            if !names.insert(server.name.as_str()) {
                return Err(ValidationError::DuplicateServer(server.name.clone()));
            }
            validator
                .validate_server(&server.name, &server.config)
                .map_err(|source| ValidationError::InvalidServer {
                    name: server.name.clone(),
                    source: Box::new(source),
                })?;
        }

        for (id, client) in &self.clients {
            if id.trim().is_empty() {
                return Err(ValidationError::EmptyClientName);
            }
            if client.config_path.trim().is_empty() {
                return Err(ValidationError::EmptyConfigPath { client: id.clone() });
            }
            if let Some(missing) = client
                .enabled
                .iter()
                .find(|server| !names.contains(server.as_str()))
            {
                return Err(ValidationError::DanglingServerReference {
                    client: id.clone(),
                    server: missing.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stdio(command: &str) -> Map<String, Value> {
        let mut config = Map::new();
        config.insert("command".to_string(), json!(command));
        config
    }

    fn sample() -> Registry {
        Registry::new(DEFAULT_SERVER_PORT)
            .with_server(ServerDefinition::new("filesystem", stdio("echo")))
            .with_server(ServerDefinition::new("git", stdio("echo")))
            .with_client(
                "claude_code",
                ClientDefinition::new("/tmp/claude.json").with_enabled(["filesystem", "git"]),
            )
    }

    #[test]
    fn add_server_appends() {
        let mut registry = sample();
        let validator = TransportValidator::new();
        registry
            .add_server(&validator, "extra", stdio("echo"))
            .unwrap();

        let names: Vec<_> = registry.servers().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["filesystem", "git", "extra"]);
    }

    #[test]
    fn add_server_rejects_duplicate_before_validating() {
        let mut registry = sample();
        let validator = TransportValidator::new();
        let err = registry
            .add_server(&validator, "git", Map::new())
            .unwrap_err();
        assert!(matches!(err, HubError::DuplicateServerName(name) if name == "git"));
    }

    #[test]
    fn remove_server_strips_enabled_lists() {
        let mut registry = sample();
        let removed = registry.remove_server("git").unwrap();
        assert_eq!(removed.name, "git");
        assert_eq!(
            registry.client("claude_code").unwrap().enabled,
            vec!["filesystem".to_string()]
        );
        assert!(matches!(
            registry.remove_server("git"),
            Err(HubError::ServerNotFound(_))
        ));
    }

    #[test]
    fn set_enabled_reports_lookup_failures() {
        let mut registry = sample();
        assert!(matches!(
            registry.set_enabled("nope", "git", true),
            Err(HubError::ClientNotFound(_))
        ));
        assert!(matches!(
            registry.set_enabled("claude_code", "nope", true),
            Err(HubError::ServerNotFound(_))
        ));
        assert!(!registry.set_enabled("claude_code", "git", true).unwrap());
        assert!(registry.set_enabled("claude_code", "git", false).unwrap());
    }

    #[test]
    fn validate_port_range() {
        let validator = TransportValidator::new();
        let mut registry = sample();
        registry.server_port = 0;
        assert!(matches!(
            registry.validate(&validator),
            Err(ValidationError::InvalidPort(0))
        ));
        registry.server_port = 70000;
        assert!(matches!(
            registry.validate(&validator),
            Err(ValidationError::InvalidPort(70000))
        ));
        registry.server_port = 65535;
        assert!(registry.validate(&validator).is_ok());
    }

    #[test]
    fn validate_requires_servers_and_clients() {
        let validator = TransportValidator::new();
        let no_servers = Registry::new(8080).with_client("c", ClientDefinition::new("/tmp/c.json"));
        assert!(matches!(
            no_servers.validate(&validator),
            Err(ValidationError::NoServers)
        ));

        let no_clients =
            Registry::new(8080).with_server(ServerDefinition::new("fs", stdio("echo")));
        assert!(matches!(
            no_clients.validate(&validator),
            Err(ValidationError::NoClients)
        ));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let validator = TransportValidator::new();
        let registry = sample().with_server(ServerDefinition::new("git", stdio("echo")));
        assert!(matches!(
            registry.validate(&validator),
            Err(ValidationError::DuplicateServer(name)) if name == "git"
        ));
    }
}
