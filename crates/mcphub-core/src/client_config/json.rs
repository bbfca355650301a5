//! Reading and writing client JSON documents.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{HubError, IoOp};
use crate::fs::write_atomic;

/// Read a client document. A file that does not exist yields `None`.
pub fn read_json_map(path: &Path) -> Result<Option<Map<String, Value>>, HubError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(HubError::io(IoOp::Read, path, e)),
    };

    serde_json::from_slice::<Map<String, Value>>(&bytes)
        .map(Some)
        .map_err(|source| HubError::MalformedClientConfig {
            path: path.to_path_buf(),
            source,
        })
}

/// Write a client document as indented JSON, replacing the file atomically.
pub fn write_json_map(path: &Path, map: &Map<String, Value>) -> Result<(), HubError> {
    let mut bytes = serde_json::to_vec_pretty(map).map_err(HubError::Serialize)?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(read_json_map(&tmp.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn non_object_root_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            read_json_map(&path),
            Err(HubError::MalformedClientConfig { .. })
        ));
    }

    #[test]
    fn write_keeps_key_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("client.json");
        let Value::Object(map) = json!({"zeta": 1, "alpha": {"b": 2, "a": 1}}) else {
            unreachable!()
        };

        write_json_map(&path, &map).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
        assert!(text.ends_with('\n'));
        assert_eq!(read_json_map(&path).unwrap(), Some(map));
    }
}
