// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as probability ranges and non-zero window budgets.

use crate::ConfigError;
use crate::model::BanterConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BanterConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let p = config.telegram.group_reply_probability;
    if !(0.0..=1.0).contains(&p) || p.is_nan() {
        errors.push(ConfigError::Validation {
            message: format!(
                "telegram.group_reply_probability must be within 0.0-1.0, got {p}"
            ),
        });
    }

    if config.redis.url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "redis.url must not be empty".to_string(),
        });
    }

    if config.context.history_budget == 0 {
        errors.push(ConfigError::Validation {
            message: "context.history_budget must be at least 1".to_string(),
        });
    }

    if config.context.overview_budget == 0 {
        errors.push(ConfigError::Validation {
            message: "context.overview_budget must be at least 1".to_string(),
        });
    }

    for (name, endpoint) in [
        ("provider.reply", &config.provider.reply),
        ("provider.overview", &config.provider.overview),
    ] {
        if endpoint.base_url.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{name}.base_url must not be empty"),
            });
        }
        if endpoint.model.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{name}.model must not be empty"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
