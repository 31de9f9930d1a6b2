// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Banter bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Banter configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; secrets (bot token, API keys) have no defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BanterConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram transport and reply-gating settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Redis connection settings.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Completion endpoints for replies and overview analysis.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Context window sizing.
    #[serde(default)]
    pub context: ContextConfig,

    /// Liveness endpoint settings.
    #[serde(default)]
    pub health: HealthConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot, used in logs only.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

/// Telegram transport and gating configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. Required to serve; no default.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat ids allowed to use the bot. Empty means every chat is allowed.
    #[serde(default)]
    pub allowed_chat_ids: Vec<i64>,

    /// Probability (0.0-1.0) of replying to an ordinary group-chat message.
    /// Private chats, commands, mentions and replies to the bot always get
    /// a response.
    #[serde(default = "default_group_reply_probability")]
    pub group_reply_probability: f64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            allowed_chat_ids: Vec::new(),
            group_reply_probability: default_group_reply_probability(),
        }
    }
}

/// Redis connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// Connection URL, including credentials when the server requires them,
    /// e.g. `redis://:password@host:6379/0`.
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

/// The two completion endpoints the bot talks to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Endpoint used for conversational replies.
    #[serde(default = "default_reply_endpoint")]
    pub reply: EndpointConfig,

    /// Endpoint used for the history analysis overview.
    #[serde(default = "default_overview_endpoint")]
    pub overview: EndpointConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            reply: default_reply_endpoint(),
            overview: default_overview_endpoint(),
        }
    }
}

/// One OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// API base URL, up to but excluding `/chat/completions`.
    pub base_url: String,

    /// Bearer token. Required to serve; no default.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with every request.
    pub model: String,

    /// Optional `reasoning_effort` request parameter.
    #[serde(default)]
    pub reasoning_effort: Option<String>,
}

/// Context window sizing.
///
/// `history_budget` bounds how many trailing messages are considered at
/// all; `recent_count` is the most-recent tail kept separate from the
/// older history; `overview_budget` is the (larger) slice handed to the
/// analysis flow.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    #[serde(default = "default_history_budget")]
    pub history_budget: usize,

    #[serde(default = "default_recent_count")]
    pub recent_count: usize,

    #[serde(default = "default_overview_budget")]
    pub overview_budget: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_budget: default_history_budget(),
            recent_count: default_recent_count(),
            overview_budget: default_overview_budget(),
        }
    }
}

/// Liveness endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// TCP port for the `GET /` liveness endpoint.
    #[serde(default = "default_health_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            port: default_health_port(),
        }
    }
}

fn default_agent_name() -> String {
    "banter".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_group_reply_probability() -> f64 {
    1.0
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_reply_endpoint() -> EndpointConfig {
    EndpointConfig {
        base_url: "https://api.x.ai/v1".to_string(),
        api_key: None,
        model: "grok-3-mini-beta".to_string(),
        reasoning_effort: Some("low".to_string()),
    }
}

fn default_overview_endpoint() -> EndpointConfig {
    EndpointConfig {
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai/".to_string(),
        api_key: None,
        model: "gemini-2.5-pro".to_string(),
        reasoning_effort: None,
    }
}

fn default_history_budget() -> usize {
    1000
}

fn default_recent_count() -> usize {
    20
}

fn default_overview_budget() -> usize {
    7000
}

fn default_health_port() -> u16 {
    8080
}
