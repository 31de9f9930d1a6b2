// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Liveness endpoint for platform health checks.
//!
//! `GET /` answers `200 OK` as long as the process is up. Deliberately
//! knows nothing about Redis or Telegram: it reports liveness, not
//! readiness.

use std::net::SocketAddr;

use axum::{Router, routing::get};
use tracing::{error, info};

/// Serves the liveness endpoint until the process exits.
pub async fn serve_health(port: u16) {
    let router = Router::new().route("/", get(|| async { "OK" }));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            error!(%addr, %error, "failed to bind health check listener");
            return;
        }
    };

    info!(%addr, "health check endpoint listening");
    if let Err(error) = axum::serve(listener, router).await {
        error!(%error, "health check server error");
    }
}
