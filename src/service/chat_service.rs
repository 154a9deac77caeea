use chrono::NaiveDateTime;

use crate::avatars::{AvatarConfig, SECRETARY};
use crate::clients::anthropic_client::ChatMessage;
use crate::models::conversation::{self, Conversation};
use crate::models::schedule::{self, Schedule};
use crate::models::usage::{self, UsageLog};
use crate::service::llm_service::LlmClient;
use crate::service::scheduler::{SchedulerConfig, format_schedule_list};
use crate::store::{DB, StoreError};

const LIST_KEYWORDS: &[&str] = &["確認", "教えて", "見せて", "一覧", "リスト"];
const ADD_KEYWORDS: &[&str] = &["入れて", "追加", "登録", "予約"];

const PARSE_FAILURE_MESSAGE: &str =
    "スケジュールの解析に失敗しました。もう一度具体的に教えてください。\n例: 「明日の10時に会議を入れて」";
const LLM_ERROR_MESSAGE: &str = "申し訳ございません。エラーが発生しました。";

const HISTORY_LIMIT: usize = 50;
const LIST_LIMIT: usize = 20;
const CONTEXT_LIMIT: usize = 10;

/// USD per million tokens, matching the published Sonnet pricing.
#[derive(Debug, Clone, Copy)]
pub struct CostConfig {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            input_per_mtok: 3.0,
            output_per_mtok: 15.0,
        }
    }
}

impl CostConfig {
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        input_tokens as f64 / 1_000_000.0 * self.input_per_mtok
            + output_tokens as f64 / 1_000_000.0 * self.output_per_mtok
    }
}

#[derive(Debug, Clone)]
pub struct TurnUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Clone)]
pub struct ChatTurnOutcome {
    pub reply: String,
    /// Present only when the LLM answered; schedule turns cost nothing.
    pub usage: Option<TurnUsage>,
    pub schedule_handled: bool,
}

/// Runs one chat turn: persists the user message, routes secretary schedule
/// commands, falls back to the LLM, and persists the reply. `now` is captured
/// once by the caller so all date arithmetic in the turn shares one reference.
pub async fn run_chat_turn<C: LlmClient + ?Sized>(
    conversations: &mut DB<Conversation>,
    schedules: &mut DB<Schedule>,
    usage_logs: &mut DB<UsageLog>,
    avatar: &AvatarConfig,
    scheduler: &SchedulerConfig,
    llm: &C,
    costs: &CostConfig,
    text: &str,
    now: NaiveDateTime,
) -> Result<ChatTurnOutcome, StoreError> {
    conversation::add_conversation(conversations, avatar.key, "user", text, now)?;

    let outcome = match schedule_reply(schedules, avatar, scheduler, text, now)? {
        Some(reply) => ChatTurnOutcome {
            reply,
            usage: None,
            schedule_handled: true,
        },
        None => llm_reply(conversations, schedules, usage_logs, avatar, llm, costs, now).await?,
    };

    conversation::add_conversation(conversations, avatar.key, "assistant", &outcome.reply, now)?;
    Ok(outcome)
}

fn schedule_reply(
    schedules: &mut DB<Schedule>,
    avatar: &AvatarConfig,
    scheduler: &SchedulerConfig,
    text: &str,
    now: NaiveDateTime,
) -> Result<Option<String>, StoreError> {
    if avatar.key != SECRETARY || !scheduler.is_schedule_command(text) {
        return Ok(None);
    }

    if LIST_KEYWORDS.iter().any(|k| text.contains(k)) {
        let upcoming = schedule::upcoming_schedules(schedules, LIST_LIMIT);
        return Ok(Some(format_schedule_list(&upcoming)));
    }

    if ADD_KEYWORDS.iter().any(|k| text.contains(k)) {
        let request = scheduler.parse_schedule_request_at(text, now);
        if request.title.is_empty() {
            return Ok(Some(PARSE_FAILURE_MESSAGE.to_string()));
        }
        schedule::create_schedule(schedules, &request, now)?;
        tracing::debug!(title = %request.title, at = %request.scheduled_at, "schedule created from chat");
        return Ok(Some(format!(
            "✅ スケジュールを追加しました:\n\n**{}**\n📅 {}",
            request.title,
            request.scheduled_at.format("%Y年%m月%d日 %H:%M")
        )));
    }

    Ok(None)
}

async fn llm_reply<C: LlmClient + ?Sized>(
    conversations: &DB<Conversation>,
    schedules: &DB<Schedule>,
    usage_logs: &mut DB<UsageLog>,
    avatar: &AvatarConfig,
    llm: &C,
    costs: &CostConfig,
    now: NaiveDateTime,
) -> Result<ChatTurnOutcome, StoreError> {
    let mut system = avatar.system_prompt.to_string();
    if avatar.key == SECRETARY {
        let upcoming = schedule::upcoming_schedules(schedules, CONTEXT_LIMIT);
        if !upcoming.is_empty() {
            system.push_str("\n\n現在登録されている予定:\n");
            for s in &upcoming {
                system.push_str(&format!(
                    "- {}: {}\n",
                    s.scheduled_at.format("%m/%d %H:%M"),
                    s.title
                ));
            }
        }
    }

    // The user message was persisted before this call, so the stored
    // history already ends with it.
    let messages: Vec<ChatMessage> =
        conversation::recent_conversations(conversations, avatar.key, HISTORY_LIMIT)
            .into_iter()
            .map(|c| ChatMessage {
                role: c.role,
                content: c.content,
            })
            .collect();

    match llm.complete(&system, &messages).await {
        Ok(completion) => {
            let cost = costs.cost(completion.input_tokens, completion.output_tokens);
            usage::add_usage_log(
                usage_logs,
                avatar.key,
                completion.input_tokens,
                completion.output_tokens,
                cost,
                now,
            )?;
            Ok(ChatTurnOutcome {
                reply: completion.text,
                usage: Some(TurnUsage {
                    input_tokens: completion.input_tokens,
                    output_tokens: completion.output_tokens,
                    cost,
                }),
                schedule_handled: false,
            })
        }
        Err(err) => {
            tracing::error!(error = %err, "LLM call failed, sending apology");
            Ok(ChatTurnOutcome {
                reply: LLM_ERROR_MESSAGE.to_string(),
                usage: None,
                schedule_handled: false,
            })
        }
    }
}
