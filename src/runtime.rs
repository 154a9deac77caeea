use std::sync::Arc;

use chrono::Local;
use inquire::Text;
use tokio::sync::Mutex;

use crate::avatars::get_avatar_config;
use crate::models::conversation::Conversation;
use crate::models::schedule::Schedule;
use crate::models::usage::UsageLog;
use crate::service::chat_service::{self, CostConfig};
use crate::service::llm_service::LlmClient;
use crate::service::scheduler::SchedulerConfig;
use crate::store::DB;

const EXIT_COMMANDS: &[&str] = &["exit", "quit", "終了"];

/// Interactive chat session against one avatar. Runs until the user types
/// an exit command or cancels the prompt.
pub async fn run_chat<C: LlmClient + ?Sized>(
    conversations: Arc<Mutex<DB<Conversation>>>,
    schedules: Arc<Mutex<DB<Schedule>>>,
    usage_logs: Arc<Mutex<DB<UsageLog>>>,
    avatar_type: &str,
    llm: &C,
    costs: CostConfig,
) {
    let avatar = get_avatar_config(avatar_type);
    let scheduler = SchedulerConfig::japanese();
    println!("{} {} とのチャットを開始します。(exit で終了)", avatar.icon, avatar.name);

    loop {
        let input = match Text::new("メッセージを入力...").prompt() {
            Ok(text) => text,
            Err(_) => break,
        };
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&trimmed) {
            break;
        }

        let mut conversations = conversations.lock().await;
        let mut schedules = schedules.lock().await;
        let mut usage_logs = usage_logs.lock().await;
        let outcome = chat_service::run_chat_turn(
            &mut conversations,
            &mut schedules,
            &mut usage_logs,
            avatar,
            &scheduler,
            llm,
            &costs,
            trimmed,
            Local::now().naive_local(),
        )
        .await;

        match outcome {
            Ok(outcome) => {
                println!("\n{} {}\n", avatar.icon, outcome.reply);
                if let Some(usage) = outcome.usage {
                    tracing::debug!(
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        cost = usage.cost,
                        "turn usage"
                    );
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to persist chat turn");
                println!("保存に失敗しました: {}", err);
            }
        }
    }

    println!("チャットを終了しました。");
}
