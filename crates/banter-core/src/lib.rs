// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Banter bot.
//!
//! Provides the error type, the canonical conversation data model, and the
//! storage trait seams shared across the Banter workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BanterError;
pub use traits::{ConversationStore, KvBackend};
pub use types::{ChatMessage, ChatState, TextEntity};
