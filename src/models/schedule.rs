use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::store::{DB, StoreError, save_db};

// Returns the directory where the schedule DB lives.
// Defaults to a relative "./data/schedules" directory.
pub fn get_db_location() -> String {
    if let Ok(path) = env::var("SCHEDULE_DB_LOCATION") {
        return path;
    }
    let base = env::var("DB_LOCATION").unwrap_or("./data".to_string());
    format!("{}/schedules", base)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Schedule {
    pub id: String,
    pub title: String,
    pub scheduled_at: NaiveDateTime,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub completed: bool,
}

/// Candidate appointment produced by the extractor, before persistence.
/// `title` may be empty when the utterance carried no usable remainder;
/// the caller decides whether that is a parse failure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub title: String,
    pub scheduled_at: NaiveDateTime,
    pub description: String,
}

pub fn create_schedule(
    db: &mut DB<Schedule>,
    request: &ScheduleRequest,
    created_at: NaiveDateTime,
) -> Result<String, StoreError> {
    let id = Uuid::new_v4().to_string();
    db.insert(
        id.clone(),
        Schedule {
            id: id.clone(),
            title: request.title.clone(),
            scheduled_at: request.scheduled_at,
            description: request.description.clone(),
            created_at,
            completed: false,
        },
    );
    save_db(&get_db_location(), db)?;
    Ok(id)
}

/// Incomplete schedules, ascending by timestamp, capped at `limit`.
pub fn upcoming_schedules(db: &DB<Schedule>, limit: usize) -> Vec<Schedule> {
    let mut rows: Vec<Schedule> = db.values().filter(|s| !s.completed).cloned().collect();
    rows.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
    rows.truncate(limit);
    rows
}

/// Every schedule regardless of completion, ascending by timestamp.
pub fn all_schedules(db: &DB<Schedule>) -> Vec<Schedule> {
    let mut rows: Vec<Schedule> = db.values().cloned().collect();
    rows.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
    rows
}

pub fn complete_schedule(db: &mut DB<Schedule>, id: &str) -> Result<bool, StoreError> {
    let Some(schedule) = db.get_mut(id) else {
        return Ok(false);
    };
    schedule.completed = true;
    save_db(&get_db_location(), db)?;
    Ok(true)
}

pub fn delete_schedule(db: &mut DB<Schedule>, id: &str) -> Result<bool, StoreError> {
    let removed = db.remove(id).is_some();
    if removed {
        save_db(&get_db_location(), db)?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn insert(db: &mut DB<Schedule>, title: &str, ts: NaiveDateTime, completed: bool) -> String {
        let id = Uuid::new_v4().to_string();
        db.insert(
            id.clone(),
            Schedule {
                id: id.clone(),
                title: title.to_string(),
                scheduled_at: ts,
                description: String::new(),
                created_at: at(1, 0),
                completed,
            },
        );
        id
    }

    #[test]
    fn upcoming_skips_completed_and_sorts_ascending() {
        let mut db: DB<Schedule> = HashMap::new();
        insert(&mut db, "late", at(5, 10), false);
        insert(&mut db, "done", at(2, 10), true);
        insert(&mut db, "early", at(3, 10), false);

        let rows = upcoming_schedules(&db, 20);
        let titles: Vec<&str> = rows.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late"]);
    }

    #[test]
    fn complete_marks_row_without_removing_it() {
        let dir = std::env::temp_dir().join(format!("secretary_test_{}", Uuid::new_v4()));
        unsafe {
            std::env::set_var("SCHEDULE_DB_LOCATION", &dir);
        }

        let mut db: DB<Schedule> = HashMap::new();
        let id = insert(&mut db, "meeting", at(4, 10), false);

        assert!(complete_schedule(&mut db, &id).unwrap());
        assert!(db.get(&id).unwrap().completed);
        assert!(!complete_schedule(&mut db, "missing").unwrap());
    }
}
