use chrono::{Duration, Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::conversation::Conversation;
use crate::models::schedule::{self, Schedule, ScheduleRequest};
use crate::models::usage::UsageLog;
use crate::runtime;
use crate::service::chat_service::CostConfig;
use crate::service::llm_service::AnthropicService;
use crate::service::scheduler::format_schedule_list;
use crate::service::usage_service;
use crate::store::DB;

const YEN_PER_USD: f64 = 150.0;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat with an avatar
    Chat {
        #[arg(long, default_value = "secretary")]
        avatar: String,
    },
    /// Schedule administration
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Token and cost usage report
    Usage,
    /// List available avatars
    Avatars,
}

#[derive(Subcommand)]
enum ScheduleCommands {
    Add {
        title: String,
        scheduled_at: NaiveDateTime,
        #[arg(default_value = "")]
        description: String,
    },
    List {
        /// Include completed schedules
        #[arg(long)]
        all: bool,
    },
    Complete {
        id: String,
    },
    Delete {
        id: String,
    },
}

pub async fn cli(
    conversations: Arc<Mutex<DB<Conversation>>>,
    schedules: Arc<Mutex<DB<Schedule>>>,
    usage_logs: Arc<Mutex<DB<UsageLog>>>,
    anthropic_api_key: Option<String>,
    costs: CostConfig,
) {
    // Fine to panic here
    let cli = Cli::parse();
    match cli.command {
        Commands::Chat { avatar } => {
            let Some(api_key) = anthropic_api_key else {
                println!("ANTHROPIC_API_KEY must be set for chat mode");
                return;
            };
            let llm = AnthropicService::new(api_key);
            runtime::run_chat(conversations, schedules, usage_logs, &avatar, &llm, costs).await;
        }
        Commands::Schedule { command } => {
            let mut db = schedules.lock().await;
            run_schedule_command(&mut db, command);
        }
        Commands::Usage => {
            let db = usage_logs.lock().await;
            print_usage_report(&db);
        }
        Commands::Avatars => {
            for avatar in crate::avatars::avatar_list() {
                println!("{} {} ({})", avatar.icon, avatar.name, avatar.key);
            }
        }
    }
}

fn run_schedule_command(db: &mut DB<Schedule>, command: ScheduleCommands) {
    match command {
        ScheduleCommands::Add {
            title,
            scheduled_at,
            description,
        } => {
            let request = ScheduleRequest {
                title,
                scheduled_at,
                description,
            };
            match schedule::create_schedule(db, &request, Local::now().naive_local()) {
                Ok(id) => println!("✅ 予定を追加しました: {} ({})", request.title, id),
                Err(e) => println!("Failed to create schedule: {}", e),
            }
        }
        ScheduleCommands::List { all } => {
            if all {
                let rows = schedule::all_schedules(db);
                if rows.is_empty() {
                    println!("現在、予定はありません。");
                    return;
                }
                for s in rows {
                    let mark = if s.completed { "✓" } else { " " };
                    println!(
                        "[{}] {} {}  {}",
                        mark,
                        s.scheduled_at.format("%m/%d(%a) %H:%M"),
                        s.title,
                        s.id
                    );
                }
            } else {
                println!("{}", format_schedule_list(&schedule::upcoming_schedules(db, 20)));
            }
        }
        ScheduleCommands::Complete { id } => match schedule::complete_schedule(db, &id) {
            Ok(true) => println!("✓ 完了にしました: {}", id),
            Ok(false) => println!("予定が見つかりません: {}", id),
            Err(e) => println!("Failed to update schedule: {}", e),
        },
        ScheduleCommands::Delete { id } => match schedule::delete_schedule(db, &id) {
            Ok(true) => println!("🗑️ 削除しました: {}", id),
            Ok(false) => println!("予定が見つかりません: {}", id),
            Err(e) => println!("Failed to delete schedule: {}", e),
        },
    }
}

fn print_usage_report(db: &DB<UsageLog>) {
    let logs: Vec<UsageLog> = db.values().cloned().collect();
    let totals = usage_service::total_usage(&logs);

    println!("📊 API使用量レポート");
    println!("総リクエスト数: {}", totals.requests);
    println!(
        "総トークン数: {} (入力 {} / 出力 {})",
        totals.total_tokens(),
        totals.input_tokens,
        totals.output_tokens
    );
    println!(
        "総コスト: ${:.4} (約 ¥{:.2}, ¥{}/USD換算)",
        totals.cost,
        totals.cost * YEN_PER_USD,
        YEN_PER_USD
    );
    if totals.requests > 0 {
        println!("平均コスト/リクエスト: ${:.4}", totals.cost / totals.requests as f64);
    }

    let since = Local::now().naive_local() - Duration::days(30);
    let days = usage_service::daily_breakdown(&logs, since);
    if !days.is_empty() {
        println!("\n📈 過去30日の使用量:");
        for day in days {
            println!(
                "  {}  入力 {:>8}  出力 {:>8}  ${:.4}",
                day.date.format("%m/%d"),
                day.totals.input_tokens,
                day.totals.output_tokens,
                day.totals.cost
            );
        }
    }

    let avatars = usage_service::avatar_breakdown(&logs);
    if !avatars.is_empty() {
        println!("\n🤖 アバター別使用統計:");
        for avatar in avatars {
            println!(
                "  {:<16} リクエスト {:>5}  トークン {:>10}  ${:.4}",
                avatar.avatar_type,
                avatar.totals.requests,
                avatar.totals.total_tokens(),
                avatar.totals.cost
            );
        }
    }
}
