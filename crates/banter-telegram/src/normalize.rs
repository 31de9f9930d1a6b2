// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live-message normalization.
//!
//! Converts a Bot API [`Message`] into the canonical [`ChatMessage`].
//! Pure and infallible: anything the message does not carry degrades to
//! the field's default.

use banter_core::{ChatMessage, TextEntity};
use teloxide::types::{Message, MessageEntity, MessageEntityKind};

/// Normalizes a live Telegram message.
pub fn from_telegram(msg: &Message) -> ChatMessage {
    let text = msg.text().unwrap_or_default();

    let mut out = ChatMessage {
        id: i64::from(msg.id.0),
        date: msg.date.timestamp(),
        edit_date: msg.edit_date().map(|d| d.timestamp()).unwrap_or(0),
        text: text.to_string(),
        is_from_bot: msg.from.as_ref().is_some_and(|user| user.is_bot),
        ..Default::default()
    };

    if let Some(user) = msg.from.as_ref() {
        out.from_user = match user.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {last}", user.first_name),
            _ => user.first_name.clone(),
        };
        out.from_id = user.id.0 as i64;
    }

    if let Some(reply) = msg.reply_to_message() {
        out.reply_to_id = i64::from(reply.id.0);
    }

    if let Some(caption) = msg.caption() {
        out.caption = caption.to_string();
    }

    // Media precedence: the first matching descriptor wins.
    if msg.photo().is_some_and(|sizes| !sizes.is_empty()) {
        out.media_type = "photo".into();
    } else if msg.video().is_some() {
        out.media_type = "video".into();
    } else if msg.audio().is_some() {
        out.media_type = "audio".into();
    } else if let Some(document) = msg.document() {
        out.media_type = "document".into();
        if let Some(name) = document.file_name.as_deref()
            && !name.is_empty()
        {
            out.file = name.to_string();
        }
    } else if msg.sticker().is_some() {
        out.media_type = "sticker".into();
    }

    if let Some(entities) = msg.entities() {
        out.entities = entities
            .iter()
            .filter_map(|entity| extract_span(text, entity))
            .collect();
    }

    out
}

/// Extracts one rich-text span.
///
/// Spans whose reported range exceeds the text, or does not land on
/// character boundaries, are dropped rather than extracted out of bounds.
fn extract_span(text: &str, entity: &MessageEntity) -> Option<TextEntity> {
    let end = entity.offset.checked_add(entity.length)?;
    let covered = text.get(entity.offset..end)?;

    let href = match &entity.kind {
        MessageEntityKind::TextLink { url } => url.to_string(),
        _ => String::new(),
    };

    Some(TextEntity {
        kind: entity_kind_name(&entity.kind).to_string(),
        text: covered.to_string(),
        href,
    })
}

/// Wire name of an entity kind, as the Bot API spells it.
fn entity_kind_name(kind: &MessageEntityKind) -> &'static str {
    use MessageEntityKind::*;
    match kind {
        Mention => "mention",
        Hashtag => "hashtag",
        Cashtag => "cashtag",
        BotCommand => "bot_command",
        Url => "url",
        Email => "email",
        PhoneNumber => "phone_number",
        Bold => "bold",
        Italic => "italic",
        Underline => "underline",
        Strikethrough => "strikethrough",
        Spoiler => "spoiler",
        Code => "code",
        Pre { .. } => "pre",
        TextLink { .. } => "text_link",
        TextMention { .. } => "text_mention",
        CustomEmoji { .. } => "custom_emoji",
        _ => "unknown",
    }
}
