//! Atomic whole-file replacement (tmp + rename).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HubError, IoOp};

/// Write `bytes` to `path` so readers see either the old or the new content.
///
/// Missing parent directories are created. When the target already exists
/// its permissions are carried over to the replacement. A symlinked `path`
/// is written through: the file it points at is replaced and the link stays.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), HubError> {
    let target = resolve_target(path);
    let parent = parent_dir(&target);
    fs::create_dir_all(parent).map_err(|e| HubError::io(IoOp::CreateDir, parent, e))?;

    let tmp_path = tmp_path_for(parent, &target);
    fs::write(&tmp_path, bytes).map_err(|e| HubError::io(IoOp::Write, &tmp_path, e))?;

    if let Ok(meta) = fs::metadata(&target) {
        if let Err(e) = fs::set_permissions(&tmp_path, meta.permissions()) {
            tracing::warn!(
                "Could not carry permissions of {} over to its replacement: {}",
                target.display(),
                e
            );
        }
    }

    // rename() only replaces an existing target on unix
    #[cfg(windows)]
    if target.exists() {
        if let Err(e) = fs::remove_file(&target) {
            let _ = fs::remove_file(&tmp_path);
            return Err(HubError::io(IoOp::Replace, &target, e));
        }
    }

    if let Err(e) = fs::rename(&tmp_path, &target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(HubError::io(IoOp::Replace, &target, e));
    }

    Ok(())
}

/// Follow `path` to the file that actually holds the content.
///
/// A dangling link resolves to its (not yet existing) destination.
fn resolve_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(resolved) => resolved,
            Err(_) => match fs::read_link(path) {
                Ok(link) => parent_dir(path).join(link),
                Err(_) => path.to_path_buf(),
            },
        },
        _ => path.to_path_buf(),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn tmp_path_for(parent: &Path, path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    parent.join(format!(".{}.{}.tmp", file_name, std::process::id()))
}
