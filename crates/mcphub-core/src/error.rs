//! Error types for validation, lookups, and client file I/O.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Structural validation failures for servers, clients, and the registry.
///
/// Validation short-circuits on the first failure, so a single value of this
/// type always describes exactly one problem.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server name cannot be empty")]
    EmptyServerName,

    #[error("server must have exactly one transport type: command, url, or httpUrl")]
    NoTransportType,

    #[error("server must have exactly one transport type, found {count}")]
    MultipleTransportTypes { count: usize },

    #[error("command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("invalid URL '{url}': URL missing scheme")]
    MissingScheme { url: String },

    #[error("invalid URL '{url}': URL missing host")]
    MissingHost { url: String },

    #[error("invalid URL '{url}': URL scheme must be http or https, got {scheme}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("timeout cannot be negative")]
    NegativeTimeout,

    #[error("env must be a mapping of variable names to string values")]
    EnvNotAMapping,

    #[error("environment variable key cannot be empty")]
    EmptyEnvKey,

    #[error("environment variable key cannot contain '=': {key}")]
    EnvKeyContainsEquals { key: String },

    #[error("environment variable value for '{key}' cannot be empty")]
    EmptyEnvValue { key: String },

    #[error("invalid server port: {0}")]
    InvalidPort(u32),

    #[error("no MCP servers configured")]
    NoServers,

    #[error("no clients configured")]
    NoClients,

    #[error("server '{0}' is defined more than once")]
    DuplicateServer(String),

    #[error("client name cannot be empty")]
    EmptyClientName,

    #[error("invalid client '{client}': client config path cannot be empty")]
    EmptyConfigPath { client: String },

    #[error("client '{client}' references non-existent server '{server}'")]
    DanglingServerReference { client: String, server: String },

    #[error("invalid MCP server '{name}': {source}")]
    InvalidServer {
        name: String,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("client config entry '{name}': {source}")]
    InvalidClientEntry {
        name: String,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Strip the registry/client wrappers and return the underlying failure.
    pub fn root(&self) -> &ValidationError {
        match self {
            Self::InvalidServer { source, .. } | Self::InvalidClientEntry { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}

/// The I/O step that failed while touching a client or registry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Backup,
    CreateDir,
    Write,
    Replace,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Read => "read",
            Self::Backup => "back up",
            Self::CreateDir => "create directory",
            Self::Write => "write",
            Self::Replace => "replace",
        };
        f.write_str(verb)
    }
}

/// One client that could not be reconciled during a full sync.
#[derive(Debug)]
pub struct ClientFailure {
    pub client: String,
    pub error: HubError,
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("MCP server '{0}' not found")]
    ServerNotFound(String),

    #[error("server with name '{0}' already exists")]
    DuplicateServerName(String),

    #[error("failed to parse client config '{}': {source}", .path.display())]
    MalformedClientConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to {op} '{}': {source}", .path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize client config: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Persist(#[from] anyhow::Error),

    #[error("failed to sync {} client(s): {}", .failures.len(), summarize(.failures))]
    SyncFailed { failures: Vec<ClientFailure> },
}

impl HubError {
    pub fn io(op: IoOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

fn summarize(failures: &[ClientFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.client, failure.error))
        .collect::<Vec<_>>()
        .join("; ")
}
