// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Banter - a persona-driven Telegram chat assistant.
//!
//! Library surface of the binary: the serve wiring, the message handlers
//! and the liveness endpoint, exposed so integration tests can drive the
//! full message pipeline without a live Telegram connection.

pub mod handlers;
pub mod health;
pub mod serve;
