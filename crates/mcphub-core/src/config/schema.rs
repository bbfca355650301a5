//! On-disk schema of the registry document.
//!
//! ```toml
//! server_port = 6543
//!
//! [mcpServers.filesystem]
//! command = "npx"
//! args = ["@modelcontextprotocol/server-filesystem", "/tmp"]
//!
//! [clients.claude_code]
//! config_path = "~/.claude.json"
//! enabled = ["filesystem"]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::{ClientDefinition, DEFAULT_SERVER_PORT, Registry, ServerDefinition};

/// Root structure of the registry document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    /// Listening port of the web front-end; 0 or missing means the default
    #[serde(default)]
    pub server_port: u32,

    /// Server name -> open field set, in document order
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: Map<String, Value>,

    /// Client id -> client definition
    #[serde(default)]
    pub clients: BTreeMap<String, ClientDefinition>,
}

impl RegistryDocument {
    pub fn into_registry(self) -> anyhow::Result<Registry> {
        let server_port = if self.server_port == 0 {
            DEFAULT_SERVER_PORT
        } else {
            self.server_port
        };

        let mut servers = Vec::with_capacity(self.mcp_servers.len());
        for (name, value) in self.mcp_servers {
            match value {
                Value::Object(config) => servers.push(ServerDefinition::new(name, config)),
                _ => anyhow::bail!("Expected server '{}' to be a table", name),
            }
        }

        Ok(Registry::from_parts(server_port, servers, self.clients))
    }
}

impl From<&Registry> for RegistryDocument {
    fn from(registry: &Registry) -> Self {
        let mcp_servers = registry
            .servers()
            .iter()
            .map(|server| (server.name.clone(), Value::Object(server.config.clone())))
            .collect();

        Self {
            server_port: registry.server_port(),
            mcp_servers,
            clients: registry.clients().clone(),
        }
    }
}
