use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::store::{DB, StoreError, save_db};

// Returns the directory where the conversation DB lives.
// Defaults to a relative "./data/conversations" directory.
pub fn get_db_location() -> String {
    if let Ok(path) = env::var("CONVERSATION_DB_LOCATION") {
        return path;
    }
    let base = env::var("DB_LOCATION").unwrap_or("./data".to_string());
    format!("{}/conversations", base)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Conversation {
    pub id: String,
    pub avatar_type: String,
    pub role: String,
    pub content: String,
    pub timestamp: NaiveDateTime,
}

pub fn add_conversation(
    db: &mut DB<Conversation>,
    avatar_type: &str,
    role: &str,
    content: &str,
    timestamp: NaiveDateTime,
) -> Result<String, StoreError> {
    let id = Uuid::new_v4().to_string();
    db.insert(
        id.clone(),
        Conversation {
            id: id.clone(),
            avatar_type: avatar_type.to_string(),
            role: role.to_string(),
            content: content.to_string(),
            timestamp,
        },
    );
    save_db(&get_db_location(), db)?;
    Ok(id)
}

/// Newest `limit` messages for one avatar, returned in chronological order.
/// Both rows of one turn carry the turn's timestamp, so at equal timestamps
/// the user row sorts before the assistant reply it provoked.
pub fn recent_conversations(
    db: &DB<Conversation>,
    avatar_type: &str,
    limit: usize,
) -> Vec<Conversation> {
    let mut rows: Vec<Conversation> = db
        .values()
        .filter(|c| c.avatar_type == avatar_type)
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| role_rank(&a.role).cmp(&role_rank(&b.role)))
    });
    let skip = rows.len().saturating_sub(limit);
    rows.split_off(skip)
}

fn role_rank(role: &str) -> u8 {
    if role == "user" { 0 } else { 1 }
}
