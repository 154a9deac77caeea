use std::collections::HashMap;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use secretaryBot::avatars::{SECRETARY, get_avatar_config};
use secretaryBot::clients::anthropic_client::{ChatCompletion, ChatMessage};
use secretaryBot::models::conversation::Conversation;
use secretaryBot::models::schedule::Schedule;
use secretaryBot::models::usage::UsageLog;
use secretaryBot::service::chat_service::{CostConfig, run_chat_turn};
use secretaryBot::service::llm_service::LlmClient;
use secretaryBot::service::scheduler::SchedulerConfig;
use secretaryBot::store::DB;

static ENV_LOCK: StdMutex<()> = StdMutex::new(());

fn prepare_db_location(test_name: &str) -> std::sync::MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap();
    let base = std::env::temp_dir().join(format!("secretary_chat_flow_{}", test_name));
    std::fs::create_dir_all(&base).unwrap();
    unsafe {
        std::env::set_var("DB_LOCATION", &base);
    }
    guard
}

struct RecordingLlm {
    response: Result<ChatCompletion, String>,
    seen_system: StdMutex<Vec<String>>,
}

impl RecordingLlm {
    fn ok(text: &str, input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            response: Ok(ChatCompletion {
                text: text.to_string(),
                input_tokens,
                output_tokens,
            }),
            seen_system: StdMutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmClient for RecordingLlm {
    async fn complete(
        &self,
        system: &str,
        _messages: &[ChatMessage],
    ) -> Result<ChatCompletion, Box<dyn std::error::Error + Send + Sync>> {
        self.seen_system.lock().unwrap().push(system.to_string());
        match &self.response {
            Ok(c) => Ok(c.clone()),
            Err(e) => Err(e.clone().into()),
        }
    }
}

fn fixed_now() -> NaiveDateTime {
    // Monday.
    NaiveDate::from_ymd_opt(2026, 3, 9)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn empty_stores() -> (DB<Conversation>, DB<Schedule>, DB<UsageLog>) {
    (HashMap::new(), HashMap::new(), HashMap::new())
}

#[tokio::test]
async fn add_then_list_round_trips_through_the_stores() {
    let _guard = prepare_db_location("add_then_list");
    let (mut conversations, mut schedules, mut usage_logs) = empty_stores();
    let scheduler = SchedulerConfig::japanese();
    let llm = RecordingLlm::ok("unused", 0, 0);

    let added = run_chat_turn(
        &mut conversations,
        &mut schedules,
        &mut usage_logs,
        get_avatar_config(SECRETARY),
        &scheduler,
        &llm,
        &CostConfig::default(),
        "明日の10時に会議を登録",
        fixed_now(),
    )
    .await
    .unwrap();
    assert!(added.schedule_handled);
    assert_eq!(schedules.len(), 1);

    let listed = run_chat_turn(
        &mut conversations,
        &mut schedules,
        &mut usage_logs,
        get_avatar_config(SECRETARY),
        &scheduler,
        &llm,
        &CostConfig::default(),
        "予定の一覧を見せて",
        fixed_now(),
    )
    .await
    .unwrap();
    assert!(listed.schedule_handled);
    assert!(listed.reply.contains("📅 **今後の予定**"));
    assert!(listed.reply.contains("03/10(Tue) 10:00"));

    // The LLM was never needed and nothing was billed.
    assert!(llm.seen_system.lock().unwrap().is_empty());
    assert!(usage_logs.is_empty());
    // 2 turns x (user + assistant).
    assert_eq!(conversations.len(), 4);
}

#[tokio::test]
async fn secretary_llm_turn_carries_schedule_context() {
    let _guard = prepare_db_location("secretary_context");
    let (mut conversations, mut schedules, mut usage_logs) = empty_stores();
    let scheduler = SchedulerConfig::japanese();
    let llm = RecordingLlm::ok("今日も頑張りましょう。", 500, 300);

    run_chat_turn(
        &mut conversations,
        &mut schedules,
        &mut usage_logs,
        get_avatar_config(SECRETARY),
        &scheduler,
        &llm,
        &CostConfig::default(),
        "明日の10時に会議を登録",
        fixed_now(),
    )
    .await
    .unwrap();

    // A plain chat message afterwards goes to the LLM with the stored
    // schedules rendered into the system prompt.
    let outcome = run_chat_turn(
        &mut conversations,
        &mut schedules,
        &mut usage_logs,
        get_avatar_config(SECRETARY),
        &scheduler,
        &llm,
        &CostConfig::default(),
        "おはようございます",
        fixed_now(),
    )
    .await
    .unwrap();

    assert!(!outcome.schedule_handled);
    assert_eq!(outcome.reply, "今日も頑張りましょう。");
    let systems = llm.seen_system.lock().unwrap();
    assert_eq!(systems.len(), 1);
    assert!(systems[0].contains("現在登録されている予定:"));
    assert!(systems[0].contains("03/10 10:00"));
    assert_eq!(usage_logs.len(), 1);
}

#[tokio::test]
async fn unparseable_add_request_asks_to_rephrase() {
    let _guard = prepare_db_location("rephrase");
    let (mut conversations, mut schedules, mut usage_logs) = empty_stores();
    let scheduler = SchedulerConfig::japanese();
    let llm = RecordingLlm::ok("unused", 0, 0);

    // に is followed only by whitespace, so the extracted title trims to empty.
    let outcome = run_chat_turn(
        &mut conversations,
        &mut schedules,
        &mut usage_logs,
        get_avatar_config(SECRETARY),
        &scheduler,
        &llm,
        &CostConfig::default(),
        "登録に ",
        fixed_now(),
    )
    .await
    .unwrap();

    assert!(outcome.schedule_handled);
    assert!(outcome.reply.contains("スケジュールの解析に失敗しました"));
    assert!(schedules.is_empty());
}
