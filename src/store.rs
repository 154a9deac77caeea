use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Keyed in-memory table, persisted as one JSON file per store directory.
pub type DB<T> = HashMap<String, T>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

fn db_file(location: &str) -> std::path::PathBuf {
    Path::new(location).join("db.json")
}

// A missing file is an empty store, not an error.
pub fn load_db<T: DeserializeOwned>(location: &str) -> Result<DB<T>, StoreError> {
    let path = db_file(location);
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    Ok(serde_json::from_str(&content)?)
}

pub fn save_db<T: Serialize>(location: &str, db: &DB<T>) -> Result<(), StoreError> {
    fs::create_dir_all(location)?;
    let content = serde_json::to_string_pretty(db)?;
    fs::write(db_file(location), content)?;
    Ok(())
}
