//! Registry document: format, location, and storage.

pub mod defaults;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use defaults::{DEFAULT_CONFIG, write_default_config};
pub use parser::{parse_registry_str, parse_registry_toml, to_toml};
pub use paths::{ConfigLocation, expand_home, resolve_config_path};
pub use schema::RegistryDocument;
pub use store::{RegistryPersistence, RegistryStore};
