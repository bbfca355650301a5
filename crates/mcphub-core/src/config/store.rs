//! Registry store for loading and saving the registry document.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{
    defaults::write_default_config,
    parser,
    paths::{self, ConfigLocation},
};
use crate::fs::write_atomic;
use crate::registry::Registry;

/// Durable storage for the registry.
///
/// The sync engine only talks to this trait, so tests can swap in stores
/// that fail on demand.
pub trait RegistryPersistence: Send + Sync {
    fn load(&self) -> anyhow::Result<Registry>;

    /// Replace the stored registry as a whole.
    fn save(&self, registry: &Registry) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct RegistryStore {
    config_path: PathBuf,
}

impl RegistryStore {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Locate the registry document, writing the starter config if none exists.
    pub fn resolve(explicit: Option<&str>) -> anyhow::Result<Self> {
        let user_config = paths::user_config_path()?;
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::resolve_in(explicit, &user_config, &cwd)
    }

    pub fn resolve_in(
        explicit: Option<&str>,
        user_config: &Path,
        cwd: &Path,
    ) -> anyhow::Result<Self> {
        let location = paths::resolve_config_path(explicit, user_config, cwd);
        if let ConfigLocation::Missing(path) = &location {
            write_default_config(path)?;
        }
        tracing::debug!("Using config file {}", location.path().display());
        Ok(Self::new(location.path()))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// The registry document exactly as stored.
    pub fn read_raw(&self) -> anyhow::Result<String> {
        std::fs::read_to_string(&self.config_path).with_context(|| {
            format!(
                "Failed to read config file: {}",
                self.config_path.display()
            )
        })
    }
}

impl RegistryPersistence for RegistryStore {
    fn load(&self) -> anyhow::Result<Registry> {
        parser::parse_registry_toml(&self.config_path)
    }

    fn save(&self, registry: &Registry) -> anyhow::Result<()> {
        let content = parser::to_toml(registry)?;
        write_atomic(&self.config_path, content.as_bytes()).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        tracing::debug!("Saved registry to {}", self.config_path.display());
        Ok(())
    }
}
