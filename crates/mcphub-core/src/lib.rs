//! mcphub Core Library
//!
//! Keeps a central registry of MCP server definitions and projects the
//! servers each client has enabled into that client's own JSON config,
//! leaving everything else in the client's file alone.

pub mod client_config;
pub mod config;
pub mod error;
pub mod fs;
pub mod registry;
pub mod sync;
pub mod validation;

/// Re-exports of commonly used types
pub mod prelude {
    // Errors
    pub use crate::error::{ClientFailure, HubError, IoOp, ValidationError};

    // Registry
    pub use crate::registry::{ClientDefinition, DEFAULT_SERVER_PORT, Registry, ServerDefinition};

    // Validation
    pub use crate::validation::{Transport, TransportKind, TransportValidator};

    // Registry document
    pub use crate::config::{RegistryPersistence, RegistryStore, expand_home};

    // Client documents
    pub use crate::client_config::{ClientBlob, ClientProjector};

    // Sync
    pub use crate::sync::{ClientServerStatus, SharedHub, SyncOrchestrator};
}
