// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./banter.toml` > `~/.config/banter/banter.toml` > `/etc/banter/banter.toml`
//! with environment variable overrides via `BANTER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BanterConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/banter/banter.toml` (system-wide)
/// 3. `~/.config/banter/banter.toml` (user XDG config)
/// 4. `./banter.toml` (local directory)
/// 5. `BANTER_*` environment variables
pub fn load_config() -> Result<BanterConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BanterConfig::default()))
        .merge(Toml::file("/etc/banter/banter.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("banter/banter.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("banter.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BanterConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BanterConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BanterConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BanterConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BANTER_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("BANTER_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: BANTER_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("redis_", "redis.", 1)
            .replacen("provider_reply_", "provider.reply.", 1)
            .replacen("provider_overview_", "provider.overview.", 1)
            .replacen("context_", "context.", 1)
            .replacen("health_", "health.", 1);
        mapped.into()
    })
}
