//! Directory-backed key-value storage, one file per key.
//!
//! # Invariants
//! - Keys map to `<root>/<percent-encoded key>.kv`, so any string is a valid
//!   key, including empty ones and ones containing path separators.
//! - Files without the `.kv` suffix are ignored when listing.
//! - Writes replace the whole file.

use super::{KeyValueBackend, StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::PathBuf;

const ENTRY_SUFFIX: &str = ".kv";

#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        self.root.as_path()
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}{ENTRY_SUFFIX}", urlencoding::encode(key)))
    }
}

impl KeyValueBackend for FileBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.entry_path(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                context: format!("failed to read storage file `{}`", path.display()),
                source,
            }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.entry_path(key);
        std::fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            context: format!(
                "failed to create storage directory `{}`",
                self.root.display()
            ),
            source,
        })?;
        std::fs::write(&path, value).map_err(|source| StorageError::Io {
            context: format!("failed to write storage file `{}`", path.display()),
            source,
        })
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<bool> {
        let path = self.entry_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Io {
                context: format!("failed to remove storage file `{}`", path.display()),
                source,
            }),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    context: format!(
                        "failed to list storage directory `{}`",
                        self.root.display()
                    ),
                    source,
                })
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                context: format!(
                    "failed to list storage directory `{}`",
                    self.root.display()
                ),
                source,
            })?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(key) = entry.file_name().to_str().and_then(decode_file_name) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn decode_file_name(name: &str) -> Option<String> {
    let encoded = name.strip_suffix(ENTRY_SUFFIX)?;
    urlencoding::decode(encoded).ok().map(|key| key.into_owned())
}
