use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::store::{DB, StoreError, save_db};

// Returns the directory where the usage log DB lives.
// Defaults to a relative "./data/usage" directory.
pub fn get_db_location() -> String {
    if let Ok(path) = env::var("USAGE_DB_LOCATION") {
        return path;
    }
    let base = env::var("DB_LOCATION").unwrap_or("./data".to_string());
    format!("{}/usage", base)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UsageLog {
    pub id: String,
    pub avatar_type: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
    pub timestamp: NaiveDateTime,
}

pub fn add_usage_log(
    db: &mut DB<UsageLog>,
    avatar_type: &str,
    input_tokens: u64,
    output_tokens: u64,
    cost: f64,
    timestamp: NaiveDateTime,
) -> Result<String, StoreError> {
    let id = Uuid::new_v4().to_string();
    db.insert(
        id.clone(),
        UsageLog {
            id: id.clone(),
            avatar_type: avatar_type.to_string(),
            input_tokens,
            output_tokens,
            cost,
            timestamp,
        },
    );
    save_db(&get_db_location(), db)?;
    Ok(id)
}
