//! File-backed session store
//!
//! Persists the token as `{"token": "..."}` so it survives between console
//! invocations. A missing, empty or unreadable JSON file means no session.
//! Writes go to a temporary file in the same directory that is renamed over
//! the session file, so readers never observe a half-written token.

use autores_client::{ClientError, SESSION_TOKEN_KEY, SessionStore};
use serde_json::{Map, Value};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Session store kept in a JSON file
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write within this process
    lock: Mutex<()>,
}

impl FileSessionStore {
    /// Create a store backed by `path`. The file is created on first `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<String>, ClientError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error("read", &self.path, &err)),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let stored: Map<String, Value> = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    "Ignoring unreadable session file ({err}); log in again to replace it"
                );
                return Ok(None);
            }
        };

        Ok(stored
            .get(SESSION_TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string))
    }

    fn write(&self, token: &str) -> Result<(), ClientError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|err| io_error("create", parent, &err))?;
                parent
            }
            None => Path::new("."),
        };

        let mut stored = Map::new();
        stored.insert(SESSION_TOKEN_KEY.to_string(), Value::String(token.to_string()));
        let content = serde_json::to_string(&stored)?;

        let mut file =
            NamedTempFile::new_in(dir).map_err(|err| io_error("create a file in", dir, &err))?;
        file.write_all(content.as_bytes())
            .map_err(|err| io_error("write", file.path(), &err))?;
        file.as_file()
            .sync_all()
            .map_err(|err| io_error("flush", file.path(), &err))?;

        // On Unix, owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(file.path(), fs::Permissions::from_mode(0o600))
                .map_err(|err| io_error("restrict", file.path(), &err))?;
        }

        file.persist(&self.path)
            .map_err(|err| io_error("replace", &self.path, &err.error))?;

        debug!(path = %self.path.display(), "Session token saved");
        Ok(())
    }
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> ClientError {
    ClientError::Session(format!("failed to {action} {}: {err}", path.display()))
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<String>, ClientError> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.read()
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.write(token)
    }

    fn clear(&self) -> Result<(), ClientError> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session token removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove", &self.path, &err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_means_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.json"));
        assert_eq!(store.get().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_set_get_clear() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(&path);

        store.set("abc123").unwrap();
        assert!(path.exists());
        assert_eq!(store.get().unwrap().as_deref(), Some("abc123"));

        // A second store over the same file sees the same token
        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.get().unwrap().as_deref(), Some("abc123"));

        store.set("def456").unwrap();
        assert_eq!(reopened.get().unwrap().as_deref(), Some("def456"));

        reopened.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        FileSessionStore::new(&path).set("abc123").unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"token": "abc123"}));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        FileSessionStore::new(&path).set("abc123").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_readable_file_becomes_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, r#"{"token":"old"}"#).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileSessionStore::new(&path).set("abc123").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_write_leaves_no_stray_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        store.set("abc123").unwrap();
        store.set("def456").unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_corrupt_file_reads_as_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, r#"{"tok"#).unwrap();

        let store = FileSessionStore::new(&path);
        assert_eq!(store.get().unwrap(), None);

        // A new login replaces the damaged file
        store.set("abc123").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("abc123"));
    }
}
