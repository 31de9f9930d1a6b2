// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export-file normalization.
//!
//! Telegram desktop clients export a chat as one JSON bundle whose message
//! schema differs from the Bot API in three awkward ways: `text` is either
//! a plain string or a list of span objects, sender ids arrive as composite
//! strings like `"user12345"`, and timestamps arrive as strings. All of
//! that is decoded here, once, at the boundary; downstream code only ever
//! sees [`ChatMessage`].

use banter_core::{ChatMessage, TextEntity};
use serde::Deserialize;

/// A chat history bundle as exported by a Telegram client.
///
/// Unknown fields (thumbnails, reactions, durations...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportBundle {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: i64,
    #[serde(default)]
    pub messages: Vec<ExportMessage>,
}

impl ExportBundle {
    /// Parses a downloaded export file.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Normalizes every message of the bundle, in order.
    pub fn canonical_messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(from_export).collect()
    }
}

/// One message record within an export bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportMessage {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Epoch seconds, as a string in the export format.
    #[serde(default)]
    pub date_unixtime: String,
    /// Absent on some system messages.
    #[serde(default)]
    pub from: Option<String>,
    /// Composite sender id, `"user<digits>"`.
    #[serde(default)]
    pub from_id: Option<String>,
    #[serde(default)]
    pub text: ExportText,
    #[serde(default)]
    pub text_entities: Vec<ExportSpan>,
    /// Epoch seconds as a string; absent when never edited.
    #[serde(default)]
    pub edited_unixtime: Option<String>,
    #[serde(default)]
    pub reply_to_message_id: i64,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub file_name: String,
}

/// The polymorphic `text` field: a plain string, or an ordered list of
/// pieces where only span objects carry text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExportText {
    Plain(String),
    Pieces(Vec<ExportPiece>),
}

impl Default for ExportText {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl ExportText {
    /// Flattens to the canonical text: the string itself, or the
    /// concatenation of every span's `text` field in order. Pieces without
    /// a `text` field contribute nothing.
    pub fn flatten(&self) -> String {
        match self {
            Self::Plain(text) => text.clone(),
            Self::Pieces(pieces) => pieces
                .iter()
                .filter_map(|piece| match piece {
                    ExportPiece::Span(span) => span.text.as_deref(),
                    ExportPiece::Other(_) => None,
                })
                .collect(),
        }
    }
}

/// One element of the list form of `text`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExportPiece {
    Span(ExportSpan),
    /// Anything that is not a span object. Contributes no text.
    Other(serde_json::Value),
}

/// A formatted span in the export schema.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSpan {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

/// Normalizes one export-file message.
pub fn from_export(msg: &ExportMessage) -> ChatMessage {
    let mut out = ChatMessage {
        id: msg.id,
        from_user: msg.from.clone().unwrap_or_default(),
        from_id: numeric_peer_id(msg.from_id.as_deref().unwrap_or_default()),
        date: msg.date_unixtime.parse().unwrap_or(0),
        edit_date: msg
            .edited_unixtime
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0),
        text: msg.text.flatten(),
        reply_to_id: msg.reply_to_message_id,
        ..Default::default()
    };

    if !msg.media_type.is_empty() {
        out.media_type = msg.media_type.clone();
        if !msg.file_name.is_empty() {
            out.file = msg.file_name.clone();
        }
    }

    out.entities = msg
        .text_entities
        .iter()
        .map(|span| TextEntity {
            kind: span.kind.clone(),
            text: span.text.clone().unwrap_or_default(),
            href: span.href.clone().unwrap_or_default(),
        })
        .collect();

    out
}

/// Extracts the numeric suffix from a composite sender id like `"user12345"`.
///
/// The prefix is fixed-width: the suffix starts at byte offset 4. Yields 0
/// when the value is four characters or shorter, or when the suffix does
/// not parse; malformed ids never fail a conversion.
pub fn numeric_peer_id(from_id: &str) -> i64 {
    from_id
        .get(4..)
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}
