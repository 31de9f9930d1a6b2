// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context window assembly.
//!
//! Carves a bounded window out of a conversation's history and substitutes
//! it, together with the persona prompt, the cached summary and the bot's
//! identity, into a caller-supplied template. Pure functions: the store is
//! read elsewhere, and nothing here performs I/O.
//!
//! The reply window is split in two: a `recent_count`-sized tail the model
//! should weigh most, and the older history before it, both drawn from at
//! most the trailing `history_budget` messages.

use banter_core::{BanterError, ChatState};

/// Payload returned in place of a prompt when a conversation has no state
/// yet, so the caller can respond gracefully instead of failing.
pub const MISSING_STATE_PAYLOAD: &str =
    r#"{"error":"state missing","conversation_analysis":"","response_message":""}"#;

/// Window boundaries over a history of `len` messages.
///
/// Returns `(window_start, recent_start)` with
/// `window_start <= recent_start <= len`: the older history is
/// `[window_start, recent_start)` and the recent tail `[recent_start, len)`.
pub fn window_bounds(len: usize, history_budget: usize, recent_count: usize) -> (usize, usize) {
    let window_start = len.saturating_sub(history_budget);
    let recent_start = len.saturating_sub(recent_count).max(window_start);
    (window_start, recent_start)
}

/// Renders the conversational reply prompt.
///
/// Substitutes each of `{{PROMPT}}`, `{{OVERVIEW}}`, `{{BOT_NAME}}`,
/// `{{CHAT_HISTORY}}` and `{{LAST_MESSAGES}}` exactly once; placeholders
/// the template does not contain are ignored. `None` state yields
/// [`MISSING_STATE_PAYLOAD`] instead of a prompt.
pub fn render_reply_prompt(
    template: &str,
    state: Option<&ChatState>,
    bot_name: &str,
    history_budget: usize,
    recent_count: usize,
) -> Result<String, BanterError> {
    let Some(state) = state else {
        return Ok(MISSING_STATE_PAYLOAD.to_string());
    };

    let (window_start, recent_start) =
        window_bounds(state.messages.len(), history_budget, recent_count);
    let older = serde_json::to_string(&state.messages[window_start..recent_start])?;
    let recent = serde_json::to_string(&state.messages[recent_start..])?;

    let mut prompt = template.to_string();
    prompt = substitute_once(prompt, "{{PROMPT}}", &state.prompt);
    prompt = substitute_once(prompt, "{{OVERVIEW}}", &state.summary);
    prompt = substitute_once(prompt, "{{BOT_NAME}}", bot_name);
    prompt = substitute_once(prompt, "{{CHAT_HISTORY}}", &older);
    prompt = substitute_once(prompt, "{{LAST_MESSAGES}}", &recent);
    Ok(prompt)
}

/// Renders the chat-overview prompt: one larger trailing slice, no
/// older/recent split. Substitutes `{{CHAT_HISTORY}}` and `{{BOT_INFO}}`.
pub fn render_overview_prompt(
    template: &str,
    state: &ChatState,
    bot_info: &str,
    overview_budget: usize,
) -> Result<String, BanterError> {
    let start = state.messages.len().saturating_sub(overview_budget);
    let history = serde_json::to_string(&state.messages[start..])?;

    let mut prompt = template.to_string();
    prompt = substitute_once(prompt, "{{CHAT_HISTORY}}", &history);
    prompt = substitute_once(prompt, "{{BOT_INFO}}", bot_info);
    Ok(prompt)
}

fn substitute_once(template: String, placeholder: &str, value: &str) -> String {
    template.replacen(placeholder, value, 1)
}
