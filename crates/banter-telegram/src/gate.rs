// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply gating.
//!
//! Every surviving message is stored; the gate only decides whether the
//! bot *responds*. Private chats, commands, mentions and replies to the
//! bot always pass; ordinary group traffic passes with a configured
//! probability so the bot does not answer every single message in a busy
//! group.

use teloxide::types::{ChatKind, Message};
use tracing::debug;

use crate::BotIdentity;

/// Checks whether a chat may use the bot at all.
///
/// An empty allow list means every chat is allowed.
pub fn is_chat_allowed(allowed_chat_ids: &[i64], chat_id: i64) -> bool {
    allowed_chat_ids.is_empty() || allowed_chat_ids.contains(&chat_id)
}

/// The deterministic bypasses: messages the bot must always answer.
pub fn always_replies(msg: &Message, bot: &BotIdentity) -> bool {
    // Private chats always get a response.
    if matches!(msg.chat.kind, ChatKind::Private(_)) {
        return true;
    }

    let text = msg.text().unwrap_or_default();

    // Commands always get a response.
    if text.starts_with('/') {
        return true;
    }

    // Explicit mentions of the bot.
    if !text.is_empty() && text.contains(&bot.mention()) {
        return true;
    }

    // Replies targeting one of the bot's own messages.
    msg.reply_to_message()
        .and_then(|reply| reply.from.as_ref())
        .is_some_and(|user| user.id == bot.id)
}

/// Full gate: deterministic bypasses first, then the probability roll for
/// ordinary group traffic.
pub fn should_reply(msg: &Message, bot: &BotIdentity, probability: f64) -> bool {
    if always_replies(msg, bot) {
        return true;
    }

    if rand::random::<f64>() <= probability {
        return true;
    }

    debug!(chat_id = msg.chat.id.0, "randomly skipping reply in group chat");
    false
}
