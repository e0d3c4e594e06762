mod models;
mod seeders;

pub use models::*;
pub use seeders::{initialize_demo_data, DEMO_TEAM_SIZE};

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Namespace holding the signed-in session
pub const AUTH_NAMESPACE: &str = "auth-storage";
/// Namespace holding projects, tasks, team, notifications and preferences
pub const APP_NAMESPACE: &str = "app-storage";
/// Version written into every snapshot envelope
pub const SNAPSHOT_VERSION: u32 = 0;

/// Durable key-value storage, one value per namespace.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, namespace: &str) -> StoreResult<Option<String>>;
    fn set(&self, namespace: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, namespace: &str) -> StoreResult<()>;
}

pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// Stores each namespace as `<dir>/<namespace>.json`
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(dir)?;
        info!("Using state directory {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, namespace: &str) -> StoreResult<Option<String>> {
        match std::fs::read_to_string(self.path(namespace)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, namespace: &str, value: &str) -> StoreResult<()> {
        // Write-then-rename so a crash never leaves a truncated snapshot
        let path = self.path(namespace);
        let tmp = self.dir.join(format!("{}.json.tmp", namespace));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!(namespace, bytes = value.len(), "Snapshot written");
        Ok(())
    }

    fn remove(&self, namespace: &str) -> StoreResult<()> {
        match std::fs::remove_file(self.path(namespace)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, used by tests and throwaway sessions
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStorage {
        Arc::new(Self::new())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, namespace: &str) -> StoreResult<Option<String>> {
        Ok(self.values.lock().get(namespace).cloned())
    }

    fn set(&self, namespace: &str, value: &str) -> StoreResult<()> {
        self.values
            .lock()
            .insert(namespace.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> StoreResult<()> {
        self.values.lock().remove(namespace);
        Ok(())
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope<T> {
    state: T,
    version: u32,
}

/// Serialize `state` into the namespace
pub fn save_snapshot<T: Serialize>(
    storage: &dyn KeyValueStorage,
    namespace: &str,
    state: &T,
) -> StoreResult<()> {
    let json = serde_json::to_string(&EnvelopeRef {
        state,
        version: SNAPSHOT_VERSION,
    })?;
    storage.set(namespace, &json)
}

/// Restore the namespace, `None` when nothing was saved yet
pub fn load_snapshot<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    namespace: &str,
) -> StoreResult<Option<T>> {
    let Some(raw) = storage.get(namespace)? else {
        return Ok(None);
    };

    let envelope: Envelope<T> = serde_json::from_str(&raw)?;
    if envelope.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            namespace: namespace.to_string(),
            found: envelope.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    Ok(Some(envelope.state))
}

/// Namespace an unreadable snapshot is copied to before it is replaced
pub fn backup_namespace(namespace: &str) -> String {
    format!("{}.corrupt", namespace)
}

/// Copy the raw value of `namespace` aside so a fresh state written later
/// does not destroy it. Returns the backup namespace, `None` when there was
/// nothing to copy.
pub fn preserve_unreadable(
    storage: &dyn KeyValueStorage,
    namespace: &str,
) -> StoreResult<Option<String>> {
    let Some(raw) = storage.get(namespace)? else {
        return Ok(None);
    };
    let backup = backup_namespace(namespace);
    storage.set(&backup, &raw)?;
    Ok(Some(backup))
}
