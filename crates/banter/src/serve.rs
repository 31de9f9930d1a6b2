// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `banter serve` command implementation.
//!
//! Startup order: logging, Telegram credentials, Redis connection and
//! probe (fatal if unreachable), provider clients, bot identity, liveness
//! endpoint, then the long-polling dispatcher until ctrl-c.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use banter_config::BanterConfig;
use banter_config::model::EndpointConfig;
use banter_core::{BanterError, ConversationStore};
use banter_openai::ChatClient;
use banter_storage::{ChatStore, RedisBackend};
use banter_telegram::BotIdentity;

use crate::handlers::{self, App};
use crate::health;

/// Runs the `banter serve` command.
pub async fn run_serve(config: BanterConfig) -> Result<(), BanterError> {
    init_tracing(&config.agent.log_level);
    info!(name = %config.agent.name, "starting banter serve");

    let token = config
        .telegram
        .bot_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| BanterError::Config("telegram.bot_token is required to serve".into()))?
        .to_string();

    // Storage: an unreachable Redis at startup is fatal.
    let backend = RedisBackend::connect(&config.redis.url).await?;
    let store = ChatStore::new(backend);
    store.probe().await?;
    info!("redis reachable");
    let store: Arc<dyn ConversationStore> = Arc::new(store);

    // Provider clients, one per endpoint.
    let reply_client = build_client("provider.reply", &config.provider.reply)?;
    let overview_client = build_client("provider.overview", &config.provider.overview)?;

    let bot = Bot::new(token);
    let me = bot.get_me().await.map_err(|e| BanterError::Channel {
        message: format!("failed to fetch bot identity: {e}"),
        source: Some(Box::new(e)),
    })?;
    let identity = BotIdentity::from_me(&me);
    info!(username = %identity.username, "bot identity fetched");

    tokio::spawn(health::serve_health(config.health.port));

    let app = Arc::new(App {
        config,
        store,
        reply_client,
        overview_client,
        identity,
    });

    info!("starting Telegram long polling");

    let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let app = Arc::clone(&app);
        async move {
            handlers::process_message(&bot, &app, &msg).await;
            respond(())
        }
    });

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {}) // Silently ignore non-message updates
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("banter serve stopped");
    Ok(())
}

fn build_client(name: &str, endpoint: &EndpointConfig) -> Result<ChatClient, BanterError> {
    let api_key = endpoint
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| BanterError::Config(format!("{name}.api_key is required to serve")))?;

    Ok(ChatClient::new(&endpoint.base_url, api_key, &endpoint.model)?
        .with_reasoning_effort(endpoint.reasoning_effort.clone()))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("banter={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
