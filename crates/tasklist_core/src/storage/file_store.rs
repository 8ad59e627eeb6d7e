use crate::error::AppError;
use crate::storage::kv::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const STORE_PATH_ENV_VAR: &str = "TASKLIST_STORE_PATH";
const STORE_FILE_NAME: &str = "storage.json";

/// Key-value medium backed by a single JSON object file. Every operation
/// re-reads the file, so several handles on one path stay consistent.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, AppError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|err| {
            AppError::invalid_data(format!("invalid JSON in {}: {}", self.path.display(), err))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|err| AppError::persistence(err.to_string()))?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|err| AppError::persistence(err.to_string()))?;
        std::fs::write(&self.path, content).map_err(|err| {
            AppError::persistence(format!("{}: {}", self.path.display(), err))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)
                .map_err(|err| AppError::persistence(err.to_string()))?;
        }

        Ok(())
    }

    /// Entries to write back on top of. A corrupt file is replaced rather than
    /// blocking every later write.
    fn entries_for_write(&self) -> Result<BTreeMap<String, String>, AppError> {
        match self.read_entries() {
            Ok(entries) => Ok(entries),
            Err(AppError::InvalidData(message)) => {
                log::warn!("discarding unreadable storage file: {message}");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(AppError::persistence(err.message())),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.entries_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        let mut entries = self.entries_for_write()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Resolves the storage file: environment first, then the configured path,
/// then the per-user default.
pub fn store_path(configured: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_PATH_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("tasklist").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("tasklist")
            .join(STORE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use crate::storage::kv::KeyValueStore;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));

        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn set_creates_parent_directories_and_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let mut store = FileStore::new(&path);

        store.set("theme", "dark").unwrap();
        store.set("tasks", "[]").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(reopened.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn remove_deletes_only_that_key() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("storage.json"));
        store.set("theme", "dark").unwrap();
        store.set("tasks", "[]").unwrap();

        store.remove("theme").unwrap();

        assert_eq!(store.get("theme").unwrap(), None);
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn corrupt_file_reports_invalid_data_then_recovers_on_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = FileStore::new(&path);

        assert_eq!(store.get("tasks").unwrap_err().code(), "invalid_data");

        store.set("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut store = FileStore::new(&path);
        store.set("tasks", "[]").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
