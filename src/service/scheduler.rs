use chrono::{Datelike, Duration, Local, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::models::schedule::{Schedule, ScheduleRequest};

const NO_SCHEDULES_MESSAGE: &str = "現在、予定はありません。";
const SCHEDULE_LIST_HEADER: &str = "📅 **今後の予定**\n\n";

/// Immutable pattern and keyword tables for one locale.
/// Built once and shared by reference; parallel callers with different
/// locales each hold their own value.
pub struct SchedulerConfig {
    time_patterns: Vec<Regex>,
    days_later: Regex,
    title_after_particle: Regex,
    relative_days: Vec<(&'static str, i64)>,
    weekdays: Vec<(&'static str, u32)>,
    command_keywords: Vec<&'static str>,
    default_time: NaiveTime,
}

impl SchedulerConfig {
    pub fn japanese() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("hardcoded pattern compiles");
        Self {
            // Scanned in order; first successful pattern wins.
            time_patterns: vec![
                compile(r"(\d{1,2}):(\d{2})"),
                compile(r"(\d{1,2})時(\d{1,2})分"),
                compile(r"(\d{1,2})時"),
            ],
            days_later: compile(r"(\d+)日後"),
            title_after_particle: compile(r"に(.+)"),
            relative_days: vec![("今日", 0), ("明日", 1), ("明後日", 2), ("来週", 7)],
            weekdays: vec![
                ("月", 0),
                ("火", 1),
                ("水", 2),
                ("木", 3),
                ("金", 4),
                ("土", 5),
                ("日", 6),
            ],
            command_keywords: vec![
                "予定",
                "スケジュール",
                "予約",
                "会議",
                "ミーティング",
                "打ち合わせ",
                "アポ",
                "イベント",
                "タスク",
                "入れて",
                "追加",
                "登録",
                "確認",
                "教えて",
            ],
            default_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid default time"),
        }
    }

    /// Literal substring membership over the keyword table. A keyword inside
    /// an unrelated longer word still counts; that imprecision is accepted.
    pub fn is_schedule_command(&self, text: &str) -> bool {
        self.command_keywords.iter().any(|k| text.contains(k))
    }

    pub fn parse_schedule_request(&self, text: &str) -> ScheduleRequest {
        self.parse_schedule_request_at(text, Local::now().naive_local())
    }

    /// Extracts a schedule from a free-form utterance against a fixed `now`.
    /// Total: the worst input yields an empty title at today 09:00.
    pub fn parse_schedule_request_at(&self, text: &str, now: NaiveDateTime) -> ScheduleRequest {
        let mut target_date = now.date();
        let mut target_time: Option<NaiveTime> = None;

        for pattern in &self.time_patterns {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let hour: u32 = match caps[1].parse() {
                Ok(h) => h,
                Err(_) => continue,
            };
            let minute: u32 = match caps.get(2) {
                Some(m) => match m.as_str().parse() {
                    Ok(m) => m,
                    Err(_) => continue,
                },
                None => 0,
            };
            // Out-of-range captures fail over to the next pattern.
            if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                target_time = Some(time);
                break;
            }
        }

        // Date rules run in sequence; a later rule overwrites an earlier one.
        for (keyword, days) in &self.relative_days {
            if text.contains(keyword) {
                target_date = (now + Duration::days(*days)).date();
                break;
            }
        }

        if let Some(caps) = self.days_later.captures(text) {
            if let Ok(days) = caps[1].parse::<i64>() {
                // A count past the calendar's range leaves the date resolved so far.
                if let Some(moved) =
                    Duration::try_days(days).and_then(|d| now.checked_add_signed(d))
                {
                    target_date = moved.date();
                }
            }
        }

        for (day_name, day_num) in &self.weekdays {
            if text.contains(&format!("{}曜", day_name)) {
                let today = now.date().weekday().num_days_from_monday();
                let mut days_ahead = (*day_num as i64 - today as i64 + 7) % 7;
                if days_ahead == 0 {
                    // Same weekday as today means next week's occurrence.
                    days_ahead = 7;
                }
                target_date = (now + Duration::days(days_ahead)).date();
                break;
            }
        }

        let scheduled_at = target_date.and_time(target_time.unwrap_or(self.default_time));

        let title = match self.title_after_particle.captures(text) {
            Some(caps) => caps[1].trim().to_string(),
            None => text.trim().to_string(),
        };

        ScheduleRequest {
            title,
            scheduled_at,
            description: String::new(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::japanese()
    }
}

/// Renders a digest of the given schedules, in caller order.
pub fn format_schedule_list(schedules: &[Schedule]) -> String {
    if schedules.is_empty() {
        return NO_SCHEDULES_MESSAGE.to_string();
    }

    let mut result = SCHEDULE_LIST_HEADER.to_string();
    for schedule in schedules {
        result.push_str(&format!(
            "- **{}**: {}\n",
            schedule.scheduled_at.format("%m/%d(%a) %H:%M"),
            schedule.title
        ));
        if !schedule.description.is_empty() {
            result.push_str(&format!("  _{}_\n", schedule.description));
        }
    }
    result
}
