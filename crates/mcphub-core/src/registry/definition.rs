//! Server and client definitions held by the registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named MCP server with an open-ended config.
///
/// `config` is passed through to clients verbatim, so every field the user
/// supplied survives, including ones this crate knows nothing about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDefinition {
    pub name: String,
    pub config: Map<String, Value>,
}

impl ServerDefinition {
    pub fn new(name: impl Into<String>, config: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// A client application and the servers it should have active.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientDefinition {
    /// Path to the client's own JSON config; may start with `~`
    pub config_path: String,

    /// Enabled server names, without duplicates
    #[serde(default)]
    pub enabled: Vec<String>,
}

impl ClientDefinition {
    pub fn new(config_path: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            enabled: Vec::new(),
        }
    }

    pub fn with_enabled<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for server in servers {
            self.enable(&server.into());
        }
        self
    }

    pub fn is_enabled(&self, server: &str) -> bool {
        self.enabled.iter().any(|name| name == server)
    }

    /// Add `server` unless already present. Returns whether the list changed.
    pub fn enable(&mut self, server: &str) -> bool {
        if self.is_enabled(server) {
            return false;
        }
        self.enabled.push(server.to_string());
        true
    }

    /// Remove every occurrence of `server`. Returns whether the list changed.
    pub fn disable(&mut self, server: &str) -> bool {
        let before = self.enabled.len();
        self.enabled.retain(|name| name != server);
        before != self.enabled.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_is_idempotent() {
        let mut client = ClientDefinition::new("~/.claude.json");
        assert!(client.enable("filesystem"));
        assert!(!client.enable("filesystem"));
        assert_eq!(client.enabled, vec!["filesystem".to_string()]);
    }

    #[test]
    fn disable_removes_all_occurrences() {
        let mut client = ClientDefinition {
            config_path: "/tmp/client.json".to_string(),
            enabled: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert!(client.disable("a"));
        assert_eq!(client.enabled, vec!["b".to_string()]);
        assert!(!client.disable("a"));
    }
}
