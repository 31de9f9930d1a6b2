// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat-completions client for the Banter bot.
//!
//! The reply endpoint and the overview endpoint both speak this dialect;
//! the binary constructs one [`ChatClient`] per configured endpoint.

pub mod client;
pub mod types;

pub use client::ChatClient;
