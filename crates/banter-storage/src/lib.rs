// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation store for the Banter bot.
//!
//! Each conversation occupies three independent keys in the backing
//! key-value service:
//!
//! ```text
//! conversation:<id>            -> JSON array of ChatMessage, ascending by id
//! conversation:<id>:prompt     -> UTF-8 string
//! conversation:<id>:summary    -> UTF-8 string
//! ```
//!
//! [`ChatStore`] implements [`ConversationStore`] over any [`KvBackend`];
//! the production transport is [`RedisBackend`].

pub mod backend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use banter_core::{BanterError, ChatMessage, ChatState, ConversationStore, KvBackend};

pub use backend::RedisBackend;

/// Startup reachability probe bound.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

fn messages_key(chat_id: i64) -> String {
    format!("conversation:{chat_id}")
}

fn prompt_key(chat_id: i64) -> String {
    format!("conversation:{chat_id}:prompt")
}

fn summary_key(chat_id: i64) -> String {
    format!("conversation:{chat_id}:summary")
}

/// Key-value-backed conversation store.
///
/// Appends are read-modify-write over the entire stored history: the full
/// message list is fetched, extended, re-sorted and written back. That
/// sequence is made linearizable *per conversation id* by an in-process
/// mutex registry held across both appends and imports, so a bot reply
/// being stored cannot race a newly arriving message for the same chat.
/// The registry is process-local: running two store-sharing processes
/// against the same conversation can still lose an append.
pub struct ChatStore<B> {
    backend: B,
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl<B: KvBackend> ChatStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, chat_id: i64) -> Arc<Mutex<()>> {
        self.locks.entry(chat_id).or_default().clone()
    }

    /// Fetches and decodes state without taking the per-conversation lock.
    async fn fetch_state(&self, chat_id: i64) -> Result<Option<ChatState>, BanterError> {
        let keys = [
            messages_key(chat_id),
            prompt_key(chat_id),
            summary_key(chat_id),
        ];
        let mut values = self.backend.get_many(&keys).await?.into_iter();
        let raw_messages = values.next().flatten();
        let prompt = values.next().flatten();
        let summary = values.next().flatten();

        // The conversation exists iff its message list exists. A missing or
        // unreadable prompt/summary degrades to the empty default instead
        // of failing the whole read.
        let Some(raw_messages) = raw_messages else {
            return Ok(None);
        };
        let messages: Vec<ChatMessage> = serde_json::from_str(&raw_messages)?;

        Ok(Some(ChatState {
            messages,
            prompt: prompt.unwrap_or_default(),
            summary: summary.unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl<B: KvBackend> ConversationStore for ChatStore<B> {
    async fn state(&self, chat_id: i64) -> Result<Option<ChatState>, BanterError> {
        self.fetch_state(chat_id).await
    }

    async fn append_message(&self, chat_id: i64, message: ChatMessage) -> Result<(), BanterError> {
        let lock = self.lock_for(chat_id);
        let _guard = lock.lock().await;

        let mut state = self.fetch_state(chat_id).await?.unwrap_or_default();
        state.messages.push(message);
        // Stable sort: duplicate ids are tolerated and keep arrival order.
        state.messages.sort_by_key(|m| m.id);

        let encoded = serde_json::to_string(&state.messages)?;
        self.backend.set(&messages_key(chat_id), &encoded).await?;
        debug!(chat_id, count = state.messages.len(), "message appended");
        Ok(())
    }

    async fn import_messages(
        &self,
        chat_id: i64,
        mut messages: Vec<ChatMessage>,
    ) -> Result<(), BanterError> {
        messages.sort_by_key(|m| m.id);
        // Serialize before touching the backend so a failure aborts the
        // import with no partial state.
        let encoded = serde_json::to_string(&messages)?;

        let lock = self.lock_for(chat_id);
        let _guard = lock.lock().await;

        self.backend
            .set_many(&[
                (messages_key(chat_id), encoded),
                (prompt_key(chat_id), String::new()),
                (summary_key(chat_id), String::new()),
            ])
            .await?;
        debug!(chat_id, count = messages.len(), "history imported");
        Ok(())
    }

    async fn set_prompt(&self, chat_id: i64, prompt: &str) -> Result<(), BanterError> {
        self.backend.set(&prompt_key(chat_id), prompt).await
    }

    async fn set_summary(&self, chat_id: i64, summary: &str) -> Result<(), BanterError> {
        self.backend.set(&summary_key(chat_id), summary).await
    }

    async fn probe(&self) -> Result<(), BanterError> {
        match tokio::time::timeout(PROBE_TIMEOUT, self.backend.ping()).await {
            Ok(result) => result,
            Err(_) => Err(BanterError::Timeout {
                duration: PROBE_TIMEOUT,
            }),
        }
    }
}
