//! JSON document persistence
//!
//! Handles loading and saving the database document to/from the filesystem.
//! Uses atomic writes (write to temp file, then rename) so a failed write
//! never leaves a half-written database behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::models::Database;

/// Load and validate the database at `path`
pub fn load_database(path: &Path) -> StoreResult<Database> {
    let content =
        fs::read_to_string(path).map_err(|e| StoreError::from_read_io(e, path.to_path_buf()))?;

    let db: Database = serde_json::from_str(&content).map_err(|e| StoreError::InvalidFormat {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    db.validate().map_err(|details| StoreError::InvalidFormat {
        path: path.to_path_buf(),
        details,
    })?;

    debug!(
        "Loaded {} record(s) from {:?} (last_id {})",
        db.records.len(),
        path,
        db.last_id
    );
    Ok(db)
}

/// Serialize the whole document and write it to `path`
///
/// `pretty` selects indented output.
pub fn save_database(path: &Path, db: &Database, pretty: bool) -> StoreResult<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(db)
    } else {
        serde_json::to_vec(db)
    }
    .map_err(|e| StoreError::InvalidFormat {
        path: path.to_path_buf(),
        details: format!("could not serialize database: {}", e),
    })?;

    atomic_write(path, &bytes)?;
    debug!("Saved {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

/// Create an empty database at `path`, including parent directories
pub fn init_database(path: &Path) -> StoreResult<Database> {
    let db = Database::new();
    save_database(path, &db, false)?;
    Ok(db)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("json.tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .and_then(|_| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StoreError::from_io(e, temp_path.clone())
        })?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
