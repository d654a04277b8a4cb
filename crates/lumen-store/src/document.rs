//! Tolerant JSON reads and atomic JSON writes.

use std::io::Write;
use std::path::Path;

use lumen_types::error::{LumenError, Result};
use lumen_types::models::CollectionKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read `path` as raw JSON. `None` (with a log line) when the file is
/// missing, unreadable or not JSON.
fn read_value(path: &Path) -> Option<Value> {
    if !path.exists() {
        log::debug!("{} does not exist", path.display());
        return None;
    }
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Failed to read {}: {e}", path.display());
            return None;
        },
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Malformed JSON in {}: {e}", path.display());
            None
        },
    }
}

/// Read a document whose root is an object.
pub(crate) fn read_object<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let value = read_value(path)?;
    if !value.is_object() {
        log::warn!("{} is not a JSON object", path.display());
        return None;
    }
    serde_json::from_value(value)
        .map_err(|e| log::warn!("Unusable document {}: {e}", path.display()))
        .ok()
}

/// Read a document whose root is an array. Elements that are not objects,
/// or that do not fit `T`, are skipped.
pub(crate) fn read_array<T: DeserializeOwned>(path: &Path) -> Option<Vec<T>> {
    let Value::Array(items) = read_value(path)? else {
        log::warn!("{} is not a JSON array", path.display());
        return None;
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if records.len() < total {
        log::warn!(
            "Skipped {} unusable records in {}",
            total - records.len(),
            path.display()
        );
    }
    Some(records)
}

/// Serialize `value` as pretty JSON and replace `path` with it.
///
/// The bytes go to a uniquely named temp file next to `path`, are synced,
/// and the temp file is renamed over the target. Readers see either the old
/// document or the new one, never a prefix.
pub(crate) fn write_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    kind: CollectionKind,
) -> Result<()> {
    let fail = |e: &dyn std::fmt::Display| LumenError::persistence(kind, e);

    let json = serde_json::to_vec_pretty(value).map_err(|e| fail(&e))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| fail(&e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| fail(&e))?;
    tmp.write_all(&json).map_err(|e| fail(&e))?;
    tmp.as_file().sync_all().map_err(|e| fail(&e))?;
    tmp.persist(path).map_err(|e| fail(&e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_object::<Item>(&dir.path().join("nope.json")).is_none());
        assert!(read_array::<Item>(&dir.path().join("nope.json")).is_none());
    }

    #[test]
    fn wrong_root_type_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"[{"name":"a"}]"#).unwrap();
        assert!(read_object::<Item>(&path).is_none());

        std::fs::write(&path, r#"{"name":"a"}"#).unwrap();
        assert!(read_array::<Item>(&path).is_none());
    }

    #[test]
    fn array_skips_unusable_elements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"[{"name":"a"}, 7, "x", {"name": 3}, {"name":"b"}]"#).unwrap();
        let items: Vec<Item> = read_array(&path).unwrap();
        assert_eq!(
            items,
            [
                Item { name: "a".into() },
                Item { name: "b".into() }
            ]
        );
    }

    #[test]
    fn write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "old and much longer content than the new one").unwrap();

        write_atomic(&path, &Item { name: "n".into() }, CollectionKind::Settings).unwrap();
        let back: Item = read_object(&path).unwrap();
        assert_eq!(back.name, "n");

        // Only the target remains; the temp file was renamed away.
        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn write_creates_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/doc.json");
        write_atomic(&path, &[1, 2, 3], CollectionKind::History).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_onto_directory_reports_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::create_dir(&path).unwrap();
        let err = write_atomic(&path, &[1], CollectionKind::History).unwrap_err();
        assert!(matches!(
            err,
            LumenError::Persistence {
                kind: CollectionKind::History,
                ..
            }
        ));
    }
}
