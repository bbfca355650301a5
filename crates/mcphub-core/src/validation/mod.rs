//! Server definition validation shared by the registry and client projections.

pub mod transport;

pub use transport::{Transport, TransportKind, TransportValidator, detect_transport};
