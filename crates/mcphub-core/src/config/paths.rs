//! Config path resolution helpers.

use std::path::{Path, PathBuf};

/// File name of the registry document.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory under the platform config dir that holds the registry.
pub const APP_DIR_NAME: &str = "mcphub";

/// Expand a leading `~` to the user's home directory.
///
/// Only `~` on its own or followed by a separator is expanded; `~user` forms
/// are returned unchanged, as is everything when no home directory is known.
pub fn expand_home(path: &str) -> PathBuf {
    expand_home_with(path, dirs::home_dir().as_deref())
}

pub fn expand_home_with(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return home.to_path_buf();
    }
    match path
        .strip_prefix("~/")
        .or_else(|| path.strip_prefix("~\\"))
    {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// `<platform config dir>/mcphub/config.toml`
pub fn user_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Where the registry lives, and whether it still has to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    Existing(PathBuf),
    Missing(PathBuf),
}

impl ConfigLocation {
    pub fn path(&self) -> &Path {
        match self {
            Self::Existing(path) | Self::Missing(path) => path,
        }
    }
}

/// Pick the registry document to use.
///
/// An explicit path always wins. Otherwise the per-user document is preferred,
/// then `config.toml` in `cwd`; when neither exists the per-user location is
/// returned as missing.
pub fn resolve_config_path(
    explicit: Option<&str>,
    user_config: &Path,
    cwd: &Path,
) -> ConfigLocation {
    if let Some(explicit) = explicit {
        let path = expand_home(explicit);
        return if path.exists() {
            ConfigLocation::Existing(path)
        } else {
            ConfigLocation::Missing(path)
        };
    }

    if user_config.exists() {
        return ConfigLocation::Existing(user_config.to_path_buf());
    }

    let local = cwd.join(CONFIG_FILE_NAME);
    if local.exists() {
        return ConfigLocation::Existing(local);
    }

    ConfigLocation::Missing(user_config.to_path_buf())
}
