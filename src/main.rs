//! Lesson Quiz · interactive question backend
//!
//! - Axum HTTP catalog API + WebSocket lesson sessions
//! - One interaction engine per question per connection; answer reports are
//!   relayed to the client and logged, never stored
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   LESSON_BANK_PATH : path to a TOML bank of grades, courses and lessons
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod state;
mod normalize;
mod interaction;
mod session;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Read-only catalog shared by every connection.
  let state = Arc::new(AppState::new());

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "lesson_quiz", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "lesson_quiz", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => info!(target: "lesson_quiz", "Ctrl-C received, shutting down"),
    Err(e) => {
      warn!(target: "lesson_quiz", error = %e, "Failed to listen for Ctrl-C; running until killed");
      std::future::pending::<()>().await
    }
  }
}
