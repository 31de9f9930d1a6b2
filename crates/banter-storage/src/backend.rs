// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis implementation of the [`KvBackend`] transport.
//!
//! All commands go through a [`ConnectionManager`], which multiplexes one
//! connection, reconnects on failure, and applies the client-configured
//! response timeout to every call.

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use banter_core::{BanterError, KvBackend};

/// Redis-backed key-value transport.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connects to the Redis server at `url`
    /// (e.g. `redis://:password@host:6379/0`).
    pub async fn connect(url: &str) -> Result<Self, BanterError> {
        let client = redis::Client::open(url).map_err(into_storage_err)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(into_storage_err)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, BanterError> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.get(key);
        }
        pipe.query_async(&mut conn).await.map_err(into_storage_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BanterError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(into_storage_err)
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), BanterError> {
        let mut conn = self.conn.clone();
        // MULTI/EXEC: all entries land or none do.
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in entries {
            pipe.set(key, value).ignore();
        }
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(into_storage_err)
    }

    async fn ping(&self) -> Result<(), BanterError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(into_storage_err)?;
        Ok(())
    }
}

fn into_storage_err(err: redis::RedisError) -> BanterError {
    BanterError::Storage {
        source: Box::new(err),
    }
}
