// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram-side logic for the Banter bot.
//!
//! Everything in this crate is a pure function over message data: the
//! normalizers turn the two inbound representations (live Bot API messages
//! and bulk export files) into the canonical [`banter_core::ChatMessage`],
//! and the gate decides which messages deserve a reply. Transport and
//! dispatch live in the binary.

pub mod export;
pub mod gate;
pub mod normalize;

use teloxide::types::{Me, UserId};

pub use export::{ExportBundle, ExportMessage, from_export};
pub use gate::{always_replies, is_chat_allowed, should_reply};
pub use normalize::from_telegram;

/// The bot's own identity, fetched once at startup and threaded through
/// gating and prompt assembly.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl BotIdentity {
    pub fn from_me(me: &Me) -> Self {
        Self {
            id: me.id,
            username: me.username.clone().unwrap_or_default(),
            first_name: me.first_name.clone(),
            last_name: me.last_name.clone().unwrap_or_default(),
        }
    }

    /// `@username` form used for mention detection and reply prompts.
    pub fn mention(&self) -> String {
        format!("@{}", self.username)
    }

    /// `First Last: @username` form used by the overview prompt.
    pub fn descriptor(&self) -> String {
        format!("{} {}: {}", self.first_name, self.last_name, self.mention())
    }
}
