use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::record::IdentityRecord;

/// Persistence seam for the identity record.
///
/// The manager never touches files directly; it talks to one of these, which
/// lets tests (and embedders) swap in an in-memory store.
pub trait RecordStore: Send {
    /// Load the persisted record, or a fresh default when nothing has been
    /// persisted yet. Unreadable or corrupt data is an error, never silently
    /// replaced with a fresh record.
    fn load(&self) -> io::Result<IdentityRecord>;

    /// Persist the record. Must be atomic: a crash mid-save may lose the
    /// update but must never leave a partial record to be read back.
    fn save(&self, record: &IdentityRecord) -> io::Result<()>;

    /// Remove the persisted record entirely.
    fn clear(&self) -> io::Result<()>;
}

/// File-backed store: one pretty-printed JSON document, written via a
/// temp-file-then-rename so readers never observe a partial write.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl RecordStore for FileStore {
    fn load(&self) -> io::Result<IdentityRecord> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(IdentityRecord::default());
            }
            Err(err) => return Err(err),
        };

        serde_json::from_str(&data).map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("corrupt auth record at {}: {}", self.path.display(), err),
            )
        })
    }

    fn save(&self, record: &IdentityRecord) -> io::Result<()> {
        let data = serde_json::to_string_pretty(record)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        // Write the whole document to a sibling temp file, then rename over
        // the real path; rename is atomic on the same filesystem
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// In-memory store for tests and embedding; no durability
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<IdentityRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> io::Result<IdentityRecord> {
        let guard = self.record.lock().expect("memory store lock poisoned");
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, record: &IdentityRecord) -> io::Result<()> {
        let mut guard = self.record.lock().expect("memory store lock poisoned");
        *guard = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        let mut guard = self.record.lock().expect("memory store lock poisoned");
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_record() -> IdentityRecord {
        IdentityRecord {
            setup_completed: true,
            username: Some("alice".to_string()),
            password_hash: Some("salt$hash".to_string()),
            totp_secret: Some("JBSWY3DPEHPK3PXP".to_string()),
            backup_codes: vec!["h1".to_string(), "h2".to_string()],
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("auth_record.json"));

        store.save(&sample_record()).unwrap();
        let loaded = store.load().unwrap();

        assert!(loaded.setup_completed);
        assert_eq!(loaded.username.as_deref(), Some("alice"));
        assert_eq!(loaded.backup_codes, vec!["h1", "h2"]);
    }

    #[test]
    fn test_missing_file_loads_fresh_record() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("does_not_exist.json"));

        let loaded = store.load().unwrap();
        assert!(!loaded.setup_completed);
        assert!(loaded.username.is_none());
    }

    #[test]
    fn test_corrupt_file_surfaces_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth_record.json");
        fs::write(&path, "{ not valid json").unwrap();

        let store = FileStore::new(&path);
        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("auth_record.json"));

        store.save(&sample_record()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["auth_record.json"]);
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("auth_record.json"));

        store.save(&sample_record()).unwrap();
        let mut updated = sample_record();
        updated.backup_codes.remove(0);
        store.save(&updated).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.backup_codes, vec!["h2"]);
    }

    #[test]
    fn test_clear_removes_file_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("auth_record.json"));

        store.save(&sample_record()).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());

        // Clearing an already-empty store is fine
        store.clear().unwrap();
        assert!(!store.load().unwrap().setup_completed);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(!store.load().unwrap().setup_completed);

        store.save(&sample_record()).unwrap();
        assert!(store.load().unwrap().setup_completed);

        store.clear().unwrap();
        assert!(!store.load().unwrap().setup_completed);
    }
}
