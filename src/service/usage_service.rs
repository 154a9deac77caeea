use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use crate::models::usage::UsageLog;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotals {
    pub requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

impl UsageTotals {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    fn add(&mut self, log: &UsageLog) {
        self.requests += 1;
        self.input_tokens += log.input_tokens;
        self.output_tokens += log.output_tokens;
        self.cost += log.cost;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub totals: UsageTotals,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvatarUsage {
    pub avatar_type: String,
    pub totals: UsageTotals,
}

pub fn total_usage(logs: &[UsageLog]) -> UsageTotals {
    let mut totals = UsageTotals::default();
    for log in logs {
        totals.add(log);
    }
    totals
}

pub fn today_totals(logs: &[UsageLog], today: NaiveDate) -> UsageTotals {
    let mut totals = UsageTotals::default();
    for log in logs.iter().filter(|l| l.timestamp.date() == today) {
        totals.add(log);
    }
    totals
}

/// Per-day totals for logs at or after `since`, ascending by date.
pub fn daily_breakdown(logs: &[UsageLog], since: NaiveDateTime) -> Vec<DailyUsage> {
    let mut by_date: HashMap<NaiveDate, UsageTotals> = HashMap::new();
    for log in logs.iter().filter(|l| l.timestamp >= since) {
        by_date.entry(log.timestamp.date()).or_default().add(log);
    }
    let mut days: Vec<DailyUsage> = by_date
        .into_iter()
        .map(|(date, totals)| DailyUsage { date, totals })
        .collect();
    days.sort_by_key(|d| d.date);
    days
}

/// Per-avatar totals over all logs, sorted by avatar key.
pub fn avatar_breakdown(logs: &[UsageLog]) -> Vec<AvatarUsage> {
    let mut by_avatar: HashMap<String, UsageTotals> = HashMap::new();
    for log in logs {
        by_avatar.entry(log.avatar_type.clone()).or_default().add(log);
    }
    let mut avatars: Vec<AvatarUsage> = by_avatar
        .into_iter()
        .map(|(avatar_type, totals)| AvatarUsage {
            avatar_type,
            totals,
        })
        .collect();
    avatars.sort_by(|a, b| a.avatar_type.cmp(&b.avatar_type));
    avatars
}
