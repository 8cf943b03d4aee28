//! Preference stores for the purchasekit SDK

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use serde_json::Value;

/// Durable string-keyed preference store shared between a host app and its
/// extension.
///
/// Values are JSON scalars. Writes are last-write-wins: the store does no
/// cross-process locking, matching the platform preference suites it stands
/// in for.
pub trait PreferenceStore: Send + Sync {
    /// Get a value by key
    fn get(&self, key: &str) -> Option<Value>;

    /// Set a value by key
    fn set(&self, key: &str, value: &Value);

    /// Remove a value by key
    fn remove(&self, key: &str);

    /// Read a key as a boolean.
    ///
    /// Coercion is lenient: numbers read as `n != 0` and the strings
    /// `"true"`/`"false"` parse, since the original stores held loosely
    /// typed plist values.
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(b),
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            Value::String(s) => s.parse::<bool>().ok(),
            _ => None,
        }
    }

    /// Read a key as a float. Numeric strings like `"3.5"` parse.
    fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Read a key as an integer. Numeric strings parse; floats truncate.
    fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }
}

/// In-memory preference store for tests and ephemeral use
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &Value) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.clone());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(key);
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish()
    }
}

/// One JSON-backed preference file
struct StoreFile {
    path: std::path::PathBuf,
    cache: RwLock<HashMap<String, Value>>,
}

impl StoreFile {
    fn open(dir: &Path) -> Option<Self> {
        if !dir.is_dir() {
            return None;
        }

        let path = dir.join("preferences.json");

        let cache = if path.exists() {
            let contents = std::fs::read_to_string(&path).ok()?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            HashMap::new()
        };

        Some(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.cache.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &Value) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key.to_string(), value.clone());
        }
        self.save();
    }

    fn remove(&self, key: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(key);
        }
        self.save();
    }

    fn save(&self) {
        if let Ok(cache) = self.cache.read() {
            if let Ok(contents) = serde_json::to_string_pretty(&*cache) {
                let _ = std::fs::write(&self.path, contents);
            }
        }
    }
}

/// File-based preference store.
///
/// Stores preferences in `preferences.json` within the app's own directory,
/// optionally mirrored into a second *app-group* directory that a host app
/// shares with its extension:
///
/// - writes land in both files;
/// - reads consult the group file first, then the local file, backfilling
///   the group file when only the local copy has the key.
pub struct FileStore {
    local: StoreFile,
    group: Option<StoreFile>,
}

impl FileStore {
    /// Create a file store in the given directory.
    ///
    /// The directory must exist and be writable. Returns `None` if the
    /// directory doesn't exist or an existing file isn't readable.
    pub fn new(dir: &Path) -> Option<Self> {
        Some(Self {
            local: StoreFile::open(dir)?,
            group: None,
        })
    }

    /// Create a file store with an app-group mirror directory.
    ///
    /// Both directories must exist. The group file is authoritative on
    /// reads; both files receive writes.
    pub fn with_group(dir: &Path, group_dir: &Path) -> Option<Self> {
        Some(Self {
            local: StoreFile::open(dir)?,
            group: Some(StoreFile::open(group_dir)?),
        })
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        if let Some(group) = &self.group {
            if let Some(value) = group.get(key) {
                return Some(value);
            }
        }

        let value = self.local.get(key)?;

        // Only the local copy has the key: backfill the group file so the
        // extension sees it too.
        if let Some(group) = &self.group {
            group.set(key, &value);
        }

        Some(value)
    }

    fn set(&self, key: &str, value: &Value) {
        self.local.set(key, value);
        if let Some(group) = &self.group {
            group.set(key, value);
        }
    }

    fn remove(&self, key: &str) {
        self.local.remove(key);
        if let Some(group) = &self.group {
            group.remove(key);
        }
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.local.path)
            .field("group", &self.group.as_ref().map(|g| &g.path))
            .finish()
    }
}
