#![allow(non_snake_case)]

use std::env;
use std::sync::Arc;

use secretaryBot::cli;
use secretaryBot::config::AppConfig;
use secretaryBot::models::{conversation, schedule, usage};
use secretaryBot::service::chat_service::CostConfig;
use secretaryBot::store::{DB, load_db};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    let conversation_db: DB<conversation::Conversation> =
        load_db(&conversation::get_db_location()).expect("Unable to load conversation database.");
    let schedule_db: DB<schedule::Schedule> =
        load_db(&schedule::get_db_location()).expect("Unable to load schedule database.");
    let usage_db: DB<usage::UsageLog> =
        load_db(&usage::get_db_location()).expect("Unable to load usage database.");

    let get_cost = |key: &str, default: f64| -> f64 {
        config
            .get_f64(key)
            .or_else(|| env::var(key).ok().and_then(|v| v.parse().ok()))
            .unwrap_or(default)
    };
    let default_costs = CostConfig::default();
    let costs = CostConfig {
        input_per_mtok: get_cost("CLAUDE_SONNET_INPUT_COST", default_costs.input_per_mtok),
        output_per_mtok: get_cost("CLAUDE_SONNET_OUTPUT_COST", default_costs.output_per_mtok),
    };
    let api_key = get_prop("ANTHROPIC_API_KEY");

    cli::cli(
        Arc::new(tokio::sync::Mutex::new(conversation_db)),
        Arc::new(tokio::sync::Mutex::new(schedule_db)),
        Arc::new(tokio::sync::Mutex::new(usage_db)),
        api_key,
        costs,
    )
    .await;
}
