// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical conversation data model.
//!
//! [`ChatMessage`] is the single normalized representation of any inbound
//! message, whether it arrived live from the Bot API or from a bulk export
//! file. The JSON shape of these types is the storage wire format: zero and
//! empty optional fields are omitted, so a stored history stays compact and
//! byte-stable across append/rewrite cycles.

use serde::{Deserialize, Serialize};

/// A formatted rich-text span extracted from a message (bold, link, mention...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntity {
    /// Span type as reported by Telegram, e.g. `bold` or `text_link`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The literal text covered by the span.
    pub text: String,
    /// Link target, present only for `text_link` spans.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub href: String,
}

/// The normalized unit of conversation history.
///
/// `id` is the sole ordering key within a conversation. Ids are assumed
/// unique per conversation but duplicates are tolerated by the store layer,
/// which only sorts and never deduplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    /// Sender display name; empty for system-originated entries.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from_user: String,
    /// Numeric sender identifier; 0 when unknown.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub from_id: i64,
    /// Epoch seconds.
    pub date: i64,
    /// Epoch seconds of the last edit; 0 means never edited.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub edit_date: i64,
    /// Plain textual content; empty for pure-media messages.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Id of the message this one replies to, within the same conversation.
    /// Lookup-only; dangling references are legal and never validated.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reply_to_id: i64,
    /// Media descriptor: `photo`, `video`, `audio`, `document` or `sticker`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_type: String,
    /// Attached file name, when one was reported.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    /// Caption accompanying a media message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
    /// Marks assistant-authored messages.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_from_bot: bool,
    /// Ordered rich-text spans extracted from `text`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<TextEntity>,
}

/// Everything the store keeps for one conversation.
///
/// `prompt` and `summary` are independent of `messages` and of each other:
/// each lives under its own key and may be absent without affecting the
/// others. A conversation exists iff its message list exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    /// Persona/system-instruction string, default empty.
    pub prompt: String,
    /// Cached free-text analysis of the history, default empty.
    pub summary: String,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}
