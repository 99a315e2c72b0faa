//! Record store
//!
//! The `RecordStore` owns the JSON database file. It is the only component
//! that writes to it.
//!
//! ## Persistence
//!
//! The whole document is loaded into memory on open. Every mutation
//! (create/update/delete) validates its input first and then rewrites the
//! full document before returning, so the file on disk always reflects the
//! last completed operation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = RecordStore::open(None, &config)?;  // Creates or loads default db
//!
//! let record = store.create(RecordFields::new().title("Hi").content("There"))?;
//! store.update(&record.id.to_string(), RecordFields::new().tag("greeting"))?;
//! store.delete(&record.id.to_string())?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::{Database, Record, RecordFields, RecordId};
use crate::persistence::{init_database, load_database, save_database};

/// Store for life records backed by a single JSON file
pub struct RecordStore {
    /// In-memory copy of the document; the source of truth while open
    db: Database,
    /// Location of the database file
    path: PathBuf,
    /// Write indented JSON
    pretty: bool,
}

impl RecordStore {
    /// Open a store
    ///
    /// With an explicit `path`, the file must already exist. Without one,
    /// the default database under the configured data directory is used
    /// and created empty if missing.
    pub fn open(path: Option<&Path>, config: &Config) -> StoreResult<Self> {
        match path {
            Some(path) => Self::open_path(path, config.pretty_json()),
            None => Self::open_default(config),
        }
    }

    /// Open the default database for `config`, creating it if needed
    pub fn open_default(config: &Config) -> StoreResult<Self> {
        let path = config.database_path();
        let db = if path.exists() {
            load_database(&path)?
        } else {
            info!("Creating new database at {:?}", path);
            init_database(&path)?
        };

        Ok(Self {
            db,
            path,
            pretty: config.pretty_json(),
        })
    }

    /// Open an existing database file
    pub fn open_path(path: &Path, pretty: bool) -> StoreResult<Self> {
        if !path.exists() {
            return Err(StoreError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            db: load_database(path)?,
            path: path.to_path_buf(),
            pretty,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Highest identifier counter issued so far
    pub fn last_id(&self) -> u64 {
        self.db.last_id
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.db.records.len()
    }

    /// Check if the store has no records
    pub fn is_empty(&self) -> bool {
        self.db.records.is_empty()
    }

    // ==================== Reads ====================

    /// All records keyed by identifier, as currently held in memory
    pub fn read(&self) -> &BTreeMap<RecordId, Record> {
        &self.db.records
    }

    /// Records in identifier (creation) order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.db.records.values()
    }

    /// The record with exactly this identifier, if any
    pub fn read_one(&self, identifier: &str) -> Option<&Record> {
        RecordId::parse(identifier).and_then(|id| self.db.records.get(&id))
    }

    // ==================== Mutations ====================

    /// Create a new record
    ///
    /// `title` and `content` are required. On success the counter advances
    /// by one and the new record is on disk before this returns.
    pub fn create(&mut self, fields: RecordFields) -> StoreResult<Record> {
        let mut next = self.db.clone();
        let id = next.next_id()?;
        let record = fields.into_record(id)?;
        next.records.insert(id, record.clone());

        self.commit(next)?;
        info!("Created record {}", id);
        Ok(record)
    }

    /// Overwrite the non-empty fields of an existing record
    pub fn update(&mut self, identifier: &str, fields: RecordFields) -> StoreResult<Record> {
        let id = self.existing_id(identifier)?;

        let mut next = self.db.clone();
        let record = next
            .records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))?;
        fields.apply_to(record);
        let updated = record.clone();

        self.commit(next)?;
        info!("Updated record {}", id);
        Ok(updated)
    }

    /// Remove a record
    ///
    /// The counter is left untouched, so the identifier is never reissued.
    pub fn delete(&mut self, identifier: &str) -> StoreResult<()> {
        let id = self.existing_id(identifier)?;

        let mut next = self.db.clone();
        next.records.remove(&id);

        self.commit(next)?;
        info!("Deleted record {}", id);
        Ok(())
    }

    /// Resolve an identifier that must exist in the store
    fn existing_id(&self, identifier: &str) -> StoreResult<RecordId> {
        RecordId::parse(identifier)
            .filter(|id| self.db.records.contains_key(id))
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))
    }

    /// Persist `next` and make it the in-memory state
    ///
    /// The in-memory database only changes once the write succeeded.
    fn commit(&mut self, next: Database) -> StoreResult<()> {
        save_database(&self.path, &next, self.pretty)?;
        self.db = next;
        debug!("Committed database ({} records)", self.db.records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: Some(temp_dir.path().to_path_buf()),
            debug: false,
            log_file: None,
        }
    }

    fn hello() -> RecordFields {
        RecordFields::new().tag("t").title("Hello").content("World")
    }

    #[test]
    fn test_open_creates_default_database() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let store = RecordStore::open(None, &config).unwrap();

        assert!(config.database_path().exists());
        assert_eq!(store.path(), config.database_path());
        assert_eq!(store.last_id(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_explicit_missing_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let missing = temp_dir.path().join("non_existent.json");

        let err = RecordStore::open(Some(&missing), &config).err().unwrap();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
        assert!(!missing.exists());
    }

    #[test]
    fn test_open_explicit_existing_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");
        fs::write(&path, r#"{"last_id": 0, "records": {}}"#).unwrap();

        let store = RecordStore::open(Some(&path), &test_config(&temp_dir)).unwrap();
        assert_eq!(store.path(), path);
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_loading_db_with_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        fs::write(
            &path,
            json!({
                "last_id": 3,
                "records": {
                    "lr-1": {"id": "lr-1", "timestamp": "01-Jan-2024 08:00", "tag": "a", "title": "One", "content": "First"},
                    "lr-3": {"id": "lr-3", "timestamp": "03-Jan-2024 08:00", "tag": "", "title": "Three", "content": "Third"}
                }
            })
            .to_string(),
        )
        .unwrap();

        let store = RecordStore::open_path(&path, false).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.last_id(), 3);
        assert_eq!(store.read_one("lr-1").unwrap().title, "One");
        assert!(store.read_one("lr-2").is_none());
        assert!(store.read_one("non_existent").is_none());
    }

    #[test]
    fn test_create_on_empty_database() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();

        let record = store.create(hello()).unwrap();

        assert_eq!(record.id.to_string(), "lr-1");
        assert_eq!(store.last_id(), 1);
        assert_eq!(store.len(), 1);

        let stored = store.read_one("lr-1").unwrap();
        assert_eq!(stored, &record);
        assert_eq!(stored.tag, "t");
        assert_eq!(stored.title, "Hello");
        assert_eq!(stored.content, "World");
    }

    #[test]
    fn test_create_ids_are_strictly_increasing() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();

        let mut previous = 0;
        for _ in 0..5 {
            let before = store.last_id();
            let record = store.create(hello()).unwrap();
            assert_eq!(store.last_id(), before + 1);
            assert!(record.id.seq() > previous);
            previous = record.id.seq();
        }
    }

    #[test]
    fn test_create_is_on_disk_before_returning() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = RecordStore::open(None, &config).unwrap();

        let record = store.create(hello()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(config.database_path()).unwrap()).unwrap();
        assert_eq!(raw["last_id"], json!(1));
        assert_eq!(raw["records"][record.id.to_string()]["title"], json!("Hello"));
    }

    #[test]
    fn test_create_validation_errors_leave_state_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = RecordStore::open(None, &config).unwrap();
        let before = fs::read_to_string(config.database_path()).unwrap();

        let empty = RecordFields::try_from(&json!({})).unwrap();
        assert!(matches!(store.create(empty), Err(StoreError::Validation(_))));

        let wrong = RecordFields::try_from(&json!({"wrong_key": "x"}));
        assert!(matches!(wrong, Err(StoreError::Validation(_))));

        let not_mapping = RecordFields::try_from(&json!("not a mapping"));
        assert!(matches!(not_mapping, Err(StoreError::Type(_))));

        assert_eq!(store.last_id(), 0);
        assert_eq!(fs::read_to_string(config.database_path()).unwrap(), before);
    }

    #[test]
    fn test_failed_write_keeps_memory_and_disk() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = RecordStore::open(None, &config).unwrap();
        let db_path = config.database_path();
        let before = fs::read(&db_path).unwrap();

        // A directory where the temp file should go makes the write fail
        fs::create_dir(db_path.with_extension("json.tmp")).unwrap();

        let err = store.create(hello()).unwrap_err();
        assert!(matches!(err, StoreError::WriteError { .. }));
        assert_eq!(store.last_id(), 0);
        assert!(store.is_empty());
        assert_eq!(fs::read(&db_path).unwrap(), before);
    }

    #[test]
    fn test_create_at_counter_limit_fails_cleanly() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        let content = format!(r#"{{"last_id": {}, "records": {{}}}}"#, u64::MAX);
        fs::write(&path, &content).unwrap();

        let mut store = RecordStore::open_path(&path, false).unwrap();
        let err = store.create(hello()).unwrap_err();

        assert!(matches!(err, StoreError::IdsExhausted { .. }));
        assert_eq!(store.last_id(), u64::MAX);
        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_create_without_tag() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();

        let record = store
            .create(RecordFields::new().title("Untagged").content("Body"))
            .unwrap();
        assert_eq!(record.tag, "");
    }

    #[test]
    fn test_round_trip_through_fresh_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let record = {
            let mut store = RecordStore::open(None, &config).unwrap();
            store.create(hello()).unwrap()
        };

        let reopened = RecordStore::open(Some(&config.database_path()), &config).unwrap();
        assert_eq!(reopened.read_one(&record.id.to_string()), Some(&record));
        assert_eq!(reopened.last_id(), 1);
    }

    #[test]
    fn test_update_overwrites_only_non_empty_fields() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();
        let original = store.create(hello()).unwrap();

        let updated = store
            .update(
                "lr-1",
                RecordFields::new().tag("").title("Updated").content(""),
            )
            .unwrap();

        assert_eq!(updated.title, "Updated");
        assert_eq!(updated.tag, original.tag);
        assert_eq!(updated.content, original.content);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.timestamp, original.timestamp);
        assert_eq!(store.read_one("lr-1"), Some(&updated));
    }

    #[test]
    fn test_update_with_no_fields_keeps_record() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();
        let original = store.create(hello()).unwrap();

        let updated = store.update("lr-1", RecordFields::new()).unwrap();
        assert_eq!(updated, original);
        assert_eq!(store.last_id(), 1);
    }

    #[test]
    fn test_update_persists() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        {
            let mut store = RecordStore::open(None, &config).unwrap();
            store.create(hello()).unwrap();
            store
                .update("lr-1", RecordFields::new().content("Changed"))
                .unwrap();
        }

        let store = RecordStore::open(None, &config).unwrap();
        assert_eq!(store.read_one("lr-1").unwrap().content, "Changed");
    }

    #[test]
    fn test_update_unknown_identifier() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();

        let err = store
            .update("lr-9", RecordFields::new().title("x"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref id) if id == "lr-9"));
    }

    #[test]
    fn test_delete_removes_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        {
            let mut store = RecordStore::open(None, &config).unwrap();
            store.create(hello()).unwrap();
            store.delete("lr-1").unwrap();
            assert!(!store.read().contains_key(&RecordId::new(1)));
        }

        let store = RecordStore::open(None, &config).unwrap();
        assert!(store.read_one("lr-1").is_none());
        assert_eq!(store.last_id(), 1);
    }

    #[test]
    fn test_delete_never_reuses_identifier() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();

        store.create(hello()).unwrap();
        store.create(hello()).unwrap();
        store.delete("lr-2").unwrap();
        assert_eq!(store.last_id(), 2);

        let next = store.create(hello()).unwrap();
        assert_eq!(next.id.to_string(), "lr-3");
    }

    #[test]
    fn test_delete_errors() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();

        let err = store.delete("missing-id").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        // Identifiers arriving as loose JSON are type-checked first
        let err = RecordId::try_from(&json!(12345)).unwrap_err();
        assert!(matches!(err, StoreError::Type(_)));
    }

    #[test]
    fn test_records_in_creation_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(None, &test_config(&temp_dir)).unwrap();

        for i in 1..=11 {
            store
                .create(RecordFields::new().title(format!("n{i}")).content("c"))
                .unwrap();
        }

        let ids: Vec<u64> = store.records().map(|r| r.id.seq()).collect();
        assert_eq!(ids, (1..=11).collect::<Vec<_>>());
    }

    #[test]
    fn test_pretty_json_in_debug() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            debug: true,
            ..test_config(&temp_dir)
        };
        let mut store = RecordStore::open(None, &config).unwrap();
        store.create(hello()).unwrap();

        let raw = fs::read_to_string(config.database_path()).unwrap();
        assert!(raw.contains("\n  \"last_id\": 1"));
    }
}
