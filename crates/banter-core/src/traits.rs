// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the bot and its storage backend.
//!
//! Handlers consume [`ConversationStore`]; the store implementation is in
//! turn generic over [`KvBackend`], the minimal transport it needs from a
//! remote key-value service. Both seams exist so tests can construct the
//! stack without a network.

use async_trait::async_trait;

use crate::error::BanterError;
use crate::types::{ChatMessage, ChatState};

/// Per-conversation persistence operations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetches the full state for a conversation in one backend round trip.
    ///
    /// Returns `Ok(None)` when the conversation has no message list yet. A
    /// present but malformed message list is an error; a missing prompt or
    /// summary silently falls back to the empty default.
    async fn state(&self, chat_id: i64) -> Result<Option<ChatState>, BanterError>;

    /// Appends one message to a conversation's history, keeping the stored
    /// list sorted ascending by message id. Creates the conversation if it
    /// does not exist. Never touches the prompt or summary.
    async fn append_message(&self, chat_id: i64, message: ChatMessage) -> Result<(), BanterError>;

    /// Replaces a conversation's history wholesale and resets its prompt
    /// and summary to their defaults, atomically. Nothing is written if the
    /// message list cannot be serialized.
    async fn import_messages(
        &self,
        chat_id: i64,
        messages: Vec<ChatMessage>,
    ) -> Result<(), BanterError>;

    /// Overwrites the persona prompt. Independent of messages and summary.
    async fn set_prompt(&self, chat_id: i64, prompt: &str) -> Result<(), BanterError>;

    /// Overwrites the cached analysis summary. Independent of messages and prompt.
    async fn set_summary(&self, chat_id: i64, summary: &str) -> Result<(), BanterError>;

    /// Bounded-time reachability check, run once at startup. Failure is
    /// fatal to the process.
    async fn probe(&self) -> Result<(), BanterError>;
}

/// Minimal key-value transport required by the store.
///
/// Implementations must guarantee that [`set_many`](KvBackend::set_many)
/// applies all entries or none.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Fetches several keys in one round trip; `None` per absent key.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, BanterError>;

    /// Sets a single key.
    async fn set(&self, key: &str, value: &str) -> Result<(), BanterError>;

    /// Sets several keys as one all-or-nothing transaction.
    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), BanterError>;

    /// Cheap liveness command against the backend.
    async fn ping(&self) -> Result<(), BanterError>;
}
