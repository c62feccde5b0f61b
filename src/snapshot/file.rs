//! JSON file snapshot store.
//!
//! Each collection lives in its own pretty-printed JSON array file inside a
//! data directory. Writes go to a temporary sibling which is fsynced and then
//! renamed over the target, so readers see either the old or the new
//! snapshot and never a torn one.
//!
//! A collection's version is derived from the file itself: 0 while the file
//! does not exist, otherwise one more than the CRC32 of its bytes. Every
//! write re-reads the file and compares versions before the rename, so a
//! write based on a stale read fails with a conflict even when the newer
//! data came from another store or another process. Writers in one process
//! are serialized; between processes the check and the rename are not one
//! atomic step.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::debug;

use super::{Collection, Snapshot, SnapshotStore};
use crate::config::ShopConfig;
use crate::error::{Result, ShopError};

/// Default file name for the product snapshot.
pub const DEFAULT_PRODUCTS_FILE: &str = "products.json";
/// Default file name for the order snapshot.
pub const DEFAULT_ORDERS_FILE: &str = "orders.json";
/// Default file name for the id high-water marks.
pub const DEFAULT_SEQUENCES_FILE: &str = "sequences.json";

/// Snapshot store backed by one JSON file per collection.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    products_file: String,
    orders_file: String,
    sequences_file: String,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store in `dir` using the default file names.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&ShopConfig {
            data_dir: dir.into(),
            ..ShopConfig::default()
        })
    }

    /// Creates a store from the loaded application configuration.
    pub fn from_config(config: &ShopConfig) -> Self {
        Self {
            dir: config.data_dir.clone(),
            products_file: config.products_file.clone(),
            orders_file: config.orders_file.clone(),
            sequences_file: config.sequences_file.clone(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the file holding `collection`.
    pub fn path(&self, collection: Collection) -> PathBuf {
        let name = match collection {
            Collection::Products => &self.products_file,
            Collection::Orders => &self.orders_file,
            Collection::Sequences => &self.sequences_file,
        };
        self.dir.join(name)
    }

    /// Reads the raw file, `None` if it does not exist yet.
    fn read_bytes(&self, collection: Collection) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(collection)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ShopError::StorageUnavailable { collection, source }),
        }
    }
}

/// Version of a snapshot file with the given contents.
fn version_of(bytes: Option<&[u8]>) -> u64 {
    bytes.map_or(0, |bytes| u64::from(crc32fast::hash(bytes)) + 1)
}

impl SnapshotStore for JsonFileStore {
    fn read_collection<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Snapshot<T>> {
        let Some(bytes) = self.read_bytes(collection)? else {
            debug!(collection = collection.as_str(), "No snapshot yet, reading as empty");
            return Ok(Snapshot {
                version: 0,
                entries: Vec::new(),
            });
        };

        let version = version_of(Some(bytes.as_slice()));
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Snapshot {
                version,
                entries: Vec::new(),
            });
        }
        let entries = serde_json::from_slice(&bytes)
            .map_err(|source| ShopError::CorruptSnapshot { collection, source })?;
        Ok(Snapshot { version, entries })
    }

    fn write_collection<T: Serialize>(
        &self,
        collection: Collection,
        entries: &[T],
        expected: u64,
    ) -> Result<u64> {
        let mut buf = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        entries.serialize(&mut serializer)?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let found = version_of(self.read_bytes(collection)?.as_deref());
        if found != expected {
            return Err(ShopError::Conflict {
                collection,
                expected,
                found,
            });
        }

        let target = self.path(collection);
        write_atomically(&self.dir, &target, &buf)
            .map_err(|source| ShopError::StorageUnavailable { collection, source })?;
        debug!(
            collection = collection.as_str(),
            entries = entries.len(),
            path = %target.display(),
            "Wrote snapshot"
        );
        Ok(version_of(Some(buf.as_slice())))
    }
}

/// Writes `contents` to `target` through a fsynced temporary file and rename.
fn write_atomically(dir: &Path, target: &Path, contents: &[u8]) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{file_name}.tmp"));

    let mut file = File::create(&temp)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp, target)?;

    // Make the rename itself durable; not every platform can open a directory.
    if let Ok(dir) = File::open(dir) {
        let _ = dir.sync_all();
    }
    Ok(())
}
