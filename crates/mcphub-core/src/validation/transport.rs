//! Transport detection and per-server field validation.

use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::ValidationError;

/// How an MCP server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportKind {
    /// Local process launched via `command`
    Command,
    /// Remote endpoint declared via `url`
    Url,
    /// Remote endpoint declared via `httpUrl`
    HttpUrl,
}

impl TransportKind {
    /// Candidate keys in detection order.
    pub const ALL: [TransportKind; 3] = [
        TransportKind::Command,
        TransportKind::Url,
        TransportKind::HttpUrl,
    ];

    /// The config key that declares this transport.
    pub fn field(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Url => "url",
            Self::HttpUrl => "httpUrl",
        }
    }
}

/// The single transport a server declares, with its trimmed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    pub kind: TransportKind,
    pub value: String,
}

/// Identify the transport declared by a server config.
///
/// A candidate counts only when it is a string that is non-empty after
/// trimming. Exactly one candidate must be present.
pub fn detect_transport(config: &Map<String, Value>) -> Result<Transport, ValidationError> {
    let mut found: Vec<Transport> = TransportKind::ALL
        .iter()
        .filter_map(|kind| {
            config
                .get(kind.field())
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| Transport {
                    kind: *kind,
                    value: value.to_string(),
                })
        })
        .collect();

    match found.len() {
        0 => Err(ValidationError::NoTransportType),
        1 => Ok(found.remove(0)),
        count => Err(ValidationError::MultipleTransportTypes { count }),
    }
}

/// Validates server definitions before they are persisted or projected.
///
/// Command transports are resolved against `PATH` unless an explicit search
/// path was configured with [`TransportValidator::with_search_path`].
#[derive(Debug, Clone, Default)]
pub struct TransportValidator {
    search_path: Option<OsString>,
}

impl TransportValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve commands against `search_path` instead of the process `PATH`.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    /// Validate a named server config.
    ///
    /// Checks run in a fixed order and stop at the first failure: name,
    /// transport count, transport value, timeout, env.
    pub fn validate_server(
        &self,
        name: &str,
        config: &Map<String, Value>,
    ) -> Result<Transport, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyServerName);
        }

        let transport = detect_transport(config)?;
        self.validate_transport(&transport)?;
        validate_timeout(config)?;
        validate_env(config)?;

        Ok(transport)
    }

    /// Hold the `mcpServers` entries of a client file to the transport contract.
    ///
    /// Entry names must be non-empty; object entries must declare exactly one
    /// transport. Non-object entries belong to the client and are skipped.
    pub fn validate_client_entries(
        &self,
        servers: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        for (name, entry) in servers {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyServerName);
            }
            if let Value::Object(entry) = entry {
                detect_transport(entry).map_err(|source| ValidationError::InvalidClientEntry {
                    name: name.clone(),
                    source: Box::new(source),
                })?;
            }
        }
        Ok(())
    }

    pub fn is_command_available(&self, command: &str) -> bool {
        match &self.search_path {
            Some(search_path) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(command, Some(search_path), cwd).is_ok()
            }
            None => which::which(command).is_ok(),
        }
    }

    fn validate_transport(&self, transport: &Transport) -> Result<(), ValidationError> {
        match transport.kind {
            TransportKind::Command => {
                if !self.is_command_available(&transport.value) {
                    return Err(ValidationError::CommandNotFound {
                        command: transport.value.clone(),
                    });
                }
                Ok(())
            }
            TransportKind::Url | TransportKind::HttpUrl => validate_url(&transport.value),
        }
    }
}

fn validate_url(raw: &str) -> Result<(), ValidationError> {
    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(ValidationError::MissingScheme {
                url: raw.to_string(),
            });
        }
        Err(url::ParseError::EmptyHost) => {
            return Err(ValidationError::MissingHost {
                url: raw.to_string(),
            });
        }
        Err(source) => {
            return Err(ValidationError::InvalidUrl {
                url: raw.to_string(),
                source,
            });
        }
    };

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost {
            url: raw.to_string(),
        });
    }

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ValidationError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}

fn validate_timeout(config: &Map<String, Value>) -> Result<(), ValidationError> {
    match config.get("timeout").and_then(Value::as_f64) {
        Some(timeout) if timeout < 0.0 => Err(ValidationError::NegativeTimeout),
        _ => Ok(()),
    }
}

fn validate_env(config: &Map<String, Value>) -> Result<(), ValidationError> {
    let env = match config.get("env") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Object(env)) => env,
        Some(_) => return Err(ValidationError::EnvNotAMapping),
    };

    for (key, value) in env {
        if key.trim().is_empty() {
            return Err(ValidationError::EmptyEnvKey);
        }
        if key.contains('=') {
            return Err(ValidationError::EnvKeyContainsEquals { key: key.clone() });
        }
        match value.as_str() {
            Some(value) if !value.trim().is_empty() => {}
            _ => return Err(ValidationError::EmptyEnvValue { key: key.clone() }),
        }
    }
    Ok(())
}
