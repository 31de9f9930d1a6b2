// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test support for the Banter workspace.
//!
//! [`MemoryBackend`] implements the [`KvBackend`] transport over a plain
//! in-process map, so store semantics can be exercised through the
//! production `ChatStore` code path without a Redis server.

use std::collections::HashMap;

use async_trait::async_trait;
use banter_core::{BanterError, ChatMessage, KvBackend};
use tokio::sync::Mutex;

/// In-memory [`KvBackend`] with transactional multi-key writes.
///
/// All operations run under a single map lock, which makes
/// [`set_many`](KvBackend::set_many) trivially all-or-nothing.
#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw key, bypassing the store layer. For arranging
    /// partial-state scenarios in tests.
    pub async fn insert_raw(&self, key: &str, value: &str) {
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
    }

    /// Returns a copy of the raw key space for assertions.
    pub async fn dump(&self) -> HashMap<String, String> {
        self.data.lock().await.clone()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, BanterError> {
        let data = self.data.lock().await;
        Ok(keys.iter().map(|key| data.get(key).cloned()).collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BanterError> {
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), BanterError> {
        let mut data = self.data.lock().await;
        for (key, value) in entries {
            data.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), BanterError> {
        Ok(())
    }
}

/// Builds a plain user text message with the given id.
///
/// The timestamp is derived from the id so fixtures stay deterministic.
pub fn text_message(id: i64, text: &str) -> ChatMessage {
    ChatMessage {
        id,
        from_user: "Test User".into(),
        from_id: 100,
        date: 1_700_000_000 + id,
        text: text.into(),
        ..Default::default()
    }
}
