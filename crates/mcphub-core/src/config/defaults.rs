//! Starter registry written when no config exists yet.

use std::path::Path;

use anyhow::Context;

pub const DEFAULT_CONFIG: &str = r#"# mcphub configuration
# Server entries use the same field names as MCP client configs.
# Every field of a server is copied verbatim into the clients that enable it.

server_port = 6543

# STDIO transport (command-based)
[mcpServers.filesystem]
command = "npx"
args = ["@modelcontextprotocol/server-filesystem", "/path/to/your/directory"]
timeout = 30000
trust = false

[mcpServers.filesystem.env]
NODE_ENV = "production"

# HTTP transport with a `type` field
[mcpServers.context7-vscode]
type = "http"
url = "https://mcp.context7.com/mcp"
timeout = 10000

[mcpServers.context7-vscode.headers]
CONTEXT7_API_KEY = "ADD_YOUR_API_KEY"
Accept = "application/json, text/event-stream"

# HTTP transport through `httpUrl`
[mcpServers.context7-gemini]
httpUrl = "https://mcp.context7.com/mcp"

[mcpServers.context7-gemini.headers]
CONTEXT7_API_KEY = "ADD_YOUR_API_KEY"
Accept = "application/json, text/event-stream"

# SSE transport
# [mcpServers.sse_server]
# url = "http://localhost:8080/sse"
# timeout = 15000

# Clients and the servers each one should have
[clients.claude_code]
config_path = "~/.claude.json"
enabled = ["filesystem"]

[clients.gemini_cli]
config_path = "~/.gemini/settings.json"
enabled = []
"#;

/// Write the starter registry to `path`, creating parent directories.
pub fn write_default_config(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    tracing::info!("Created default config at {}", path.display());
    Ok(())
}
