//! Fieldcall · Softball Positional Quiz Backend
//!
//! - Axum HTTP + WebSocket API
//! - Round composition and answer synthesis over a cached scenario pool
//! - Optional remote KV scenario store (via config)
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   FIELDCALL_CONFIG_PATH  : path to TOML config (game seed, scenario file, KV store)
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod state;
mod protocol;
mod logic;
mod routes;
mod compose;
mod options;
mod round_state;
mod stats;
mod validate;
mod kv;
#[cfg(test)]
mod testutil;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: scenario cache from file + seeds, stats store, round sessions.
  let state = Arc::new(AppState::new());

  // Remote store wins over local sources when configured.
  if state.kv.is_some() {
    state.reload_scenarios().await;
  }

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "fieldcall_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
