//! services/api/src/adapters/file_store.rs
//!
//! This module contains the file-backed implementation of the `SlotStorage` port.
//! Each slot is one `<slot>.json` file inside the data directory.

use scrible_core::ports::{PortError, PortResult, SlotStorage};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Slots persisted as JSON files. Writes land in a temporary file first and are
/// renamed into place, so readers see either the old or the new value.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates, if needed) the data directory.
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn slot_path(&self, slot: &str) -> PortResult<PathBuf> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PortError::Unexpected(format!("Invalid slot name '{}'", slot)));
        }
        Ok(self.dir.join(format!("{}.json", slot)))
    }
}

fn unavailable(action: &str, path: &Path, e: io::Error) -> PortError {
    PortError::Unavailable(format!("Failed to {} {}: {}", action, path.display(), e))
}

//=========================================================================================
// `SlotStorage` Trait Implementation
//=========================================================================================

impl SlotStorage for FileStorage {
    fn get(&self, slot: &str) -> PortResult<Option<String>> {
        let path = self.slot_path(slot)?;
        match fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(value) => Ok(Some(value)),
                // Not UTF-8: read as a missing slot so the next write replaces it.
                Err(e) => {
                    warn!("Ignoring {}, it is not valid UTF-8: {}", path.display(), e);
                    Ok(None)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable("read", &path, e)),
        }
    }

    fn set(&self, slot: &str, value: &str) -> PortResult<()> {
        let path = self.slot_path(slot)?;
        let tmp = self.dir.join(format!(
            ".{}.json.{}-{}.tmp",
            slot,
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(value.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(unavailable("write", &tmp, e));
        }

        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            unavailable("replace", &path, e)
        })?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, slot: &str) -> PortResult<()> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable("remove", &path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrible_core::clock::SystemClock;
    use scrible_core::domain::NewNotebook;
    use scrible_core::ids::TimestampIds;
    use scrible_core::repository::NotebookRepository;
    use std::sync::Arc;

    #[test]
    fn missing_slot_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.get("scrible_notebooks").unwrap(), None);
    }

    #[test]
    fn set_replaces_and_remove_deletes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path().join("nested")).unwrap();

        storage.set("slot", "[1]").unwrap();
        storage.set("slot", "[2]").unwrap();
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[2]"));

        storage.remove("slot").unwrap();
        storage.remove("slot").unwrap();
        assert_eq!(storage.get("slot").unwrap(), None);
    }

    #[test]
    fn no_temporary_files_are_left_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("slot", "[]").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["slot.json".to_string()]);
    }

    #[test]
    fn slot_names_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.set("../outside", "x").is_err());
        assert!(storage.get("a/b").is_err());
    }

    #[test]
    fn non_utf8_slot_reads_as_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("slot.json"), b"[\"\xff\"]").unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.get("slot").unwrap(), None);
        storage.set("slot", "[]").unwrap();
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn notebooks_survive_a_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let open_repo = || {
            NotebookRepository::new(
                Arc::new(FileStorage::open(dir.path()).unwrap()),
                Arc::new(SystemClock),
                Arc::new(TimestampIds::new()),
            )
        };

        let created = open_repo()
            .create(
                "guest",
                NewNotebook {
                    title: "Groceries".into(),
                    text: "eggs".into(),
                    paper_style: "grid".into(),
                    font_style: "handwritten".into(),
                },
            )
            .unwrap();

        let reopened = open_repo();
        assert_eq!(reopened.get_by_id(&created.id, "guest").unwrap(), Some(created));
    }

    #[test]
    fn corrupt_file_reads_as_empty_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("scrible_notebooks.json"), b"\xff\xfe garbage").unwrap();
        let repo = NotebookRepository::new(
            Arc::new(FileStorage::open(dir.path()).unwrap()),
            Arc::new(SystemClock),
            Arc::new(TimestampIds::new()),
        );
        assert!(repo.list_by_owner("guest").unwrap().is_empty());
    }
}
