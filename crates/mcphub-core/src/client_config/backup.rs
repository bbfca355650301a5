//! Timestamped sibling backups of client documents.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{HubError, IoOp};

/// Compact date-time with second resolution, e.g. `20250131-142501`.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// `<path>.backup.<timestamp>`
pub fn backup_path_for(path: &Path, at: DateTime<Local>) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".backup.");
    name.push(at.format(BACKUP_TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

/// Copy the current bytes of `path` next to it before it gets replaced.
///
/// Returns the backup location, or `None` when there was nothing to back up.
/// An existing backup is never overwritten: a second backup within the same
/// second gets a `.1`, `.2`, ... suffix.
pub fn backup_existing(path: &Path) -> Result<Option<PathBuf>, HubError> {
    backup_existing_at(path, Local::now())
}

pub(crate) fn backup_existing_at(
    path: &Path,
    at: DateTime<Local>,
) -> Result<Option<PathBuf>, HubError> {
    if !path.exists() {
        return Ok(None);
    }

    let io_err = |e: io::Error| HubError::io(IoOp::Backup, path, e);
    let mut source = File::open(path).map_err(io_err)?;
    let (backup, mut dest) = create_unique(&backup_path_for(path, at)).map_err(io_err)?;
    io::copy(&mut source, &mut dest).map_err(io_err)?;

    // mirror the source mode
    if let Ok(meta) = source.metadata() {
        if let Err(e) = fs::set_permissions(&backup, meta.permissions()) {
            tracing::warn!(
                "Could not copy permissions onto {}: {}",
                backup.display(),
                e
            );
        }
    }

    tracing::info!("Backed up {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}

fn create_unique(base: &Path) -> io::Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let candidate = if attempt == 0 {
            base.to_path_buf()
        } else {
            let mut name = OsString::from(base.as_os_str());
            name.push(format!(".{attempt}"));
            PathBuf::from(name)
        };

        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && attempt < u32::MAX => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
