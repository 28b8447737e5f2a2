//! Directory-backed key-value store: one file per key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use latch_core::{KeyValueStore, StorageError};

/// Stores each key as a file under a directory.
///
/// Keys are escaped into file names, so any string is a valid key. Writes
/// replace the whole file; there is no locking between processes.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", escape_key(key)))
    }
}

/// Keep ASCII alphanumerics, `-` and `.`; hex-escape every other byte.
fn escape_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("_{byte:02x}"));
        }
    }
    name
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<String, StorageError> {
        fs::read_to_string(self.path_for(key)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound { key: key.into() },
            _ => StorageError::Read {
                key: key.into(),
                message: e.to_string(),
            },
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value).map_err(|e| StorageError::Write {
            key: key.into(),
            message: e.to_string(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write {
                key: key.into(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state")).unwrap();

        assert_eq!(
            store.get("theme"),
            Err(StorageError::NotFound {
                key: "theme".into()
            })
        );

        store.set("theme", "\"dark\"").unwrap();
        assert_eq!(store.get("theme").unwrap(), "\"dark\"");

        // A second handle on the same directory sees the write
        let reopened = FileStore::open(store.dir()).unwrap();
        assert_eq!(reopened.get("theme").unwrap(), "\"dark\"");

        store.remove("theme").unwrap();
        store.remove("theme").unwrap();
        assert!(matches!(
            reopened.get("theme"),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn keys_are_escaped_into_file_names() {
        assert_eq!(escape_key("user-prefs.v2"), "user-prefs.v2");
        assert_eq!(escape_key("a/b c"), "a_2fb_20c");

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("../outside", "1").unwrap();
        store.set("__", "2").unwrap();
        assert_eq!(store.get("../outside").unwrap(), "1");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
