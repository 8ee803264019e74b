//! `/ws` endpoint. Every text frame carries one tagged client message and gets
//! exactly one tagged server message back; protocol pings are answered in place.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, info, instrument, warn};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  ws.on_upgrade(move |socket| session_loop(socket, state))
}

async fn session_loop(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "fieldcall_backend", "Player connected over WebSocket");
  loop {
    let frame = match socket.recv().await {
      Some(Ok(frame)) => frame,
      Some(Err(e)) => {
        warn!(target: "fieldcall_backend", error = %e, "WebSocket receive failed");
        break;
      }
      None => break,
    };
    let reply = match frame {
      Message::Text(txt) => Message::Text(dispatch_text(&state, &txt).await),
      Message::Ping(payload) => Message::Pong(payload),
      Message::Close(_) => break,
      _ => continue,
    };
    if let Err(e) = socket.send(reply).await {
      warn!(target: "fieldcall_backend", error = %e, "WebSocket send failed; dropping connection");
      break;
    }
  }
  info!(target: "fieldcall_backend", "Player disconnected");
}

/// Parse one text frame, run it, and encode the reply.
async fn dispatch_text(state: &AppState, txt: &str) -> String {
  let reply = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(msg) => {
      debug!(target: "fieldcall_backend", ?msg, "WS message");
      handle_client_ws(msg, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("unreadable message: {e}") },
  };
  serde_json::to_string(&reply)
    .unwrap_or_else(|e| format!(r#"{{"type":"error","message":"encoding failed: {e}"}}"#))
}

fn error_reply(e: RoundError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartRound(req) => match start_round(state, req.mode, &req.focus, req.weak_spot_count).await {
      Ok(round) => {
        info!(target: "round", round_id = %round.round_id, "WS round started");
        ServerWsMessage::RoundStarted(round)
      }
      Err(e) => error_reply(e),
    },

    ClientWsMessage::NextPrompt { round_id } => match next_prompt(state, &round_id).await {
      Ok(p) => ServerWsMessage::Prompt(p),
      Err(e) => error_reply(e),
    },

    ClientWsMessage::SubmitAnswer(a) => match submit_answer(state, &a.round_id, a.choice, a.elapsed_ms).await {
      Ok(result) => {
        info!(target: "round", round_id = %a.round_id, correct = result.correct, "WS answer evaluated");
        ServerWsMessage::AnswerResult(result)
      }
      Err(e) => error_reply(e),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::stats::MemoryStats;

  #[tokio::test]
  async fn ws_messages_drive_a_round() {
    let state = AppState::with_config(AppConfig::default(), Box::new(MemoryStats::new()));

    let start: ClientWsMessage = serde_json::from_str(r#"{"type":"start_round","mode":"whole_field"}"#).unwrap();
    let ServerWsMessage::RoundStarted(round) = handle_client_ws(start, &state).await else {
      panic!("expected round_started");
    };

    let next: ClientWsMessage =
      serde_json::from_str(&format!(r#"{{"type":"next_prompt","roundId":"{}"}}"#, round.round_id)).unwrap();
    let reply = handle_client_ws(next, &state).await;
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["type"], "prompt");
    assert_eq!(json["options"].as_array().unwrap().len(), 4);

    let answer: ClientWsMessage = serde_json::from_str(&format!(
      r#"{{"type":"submit_answer","roundId":"{}","choice":0,"elapsedMs":10}}"#,
      round.round_id
    ))
    .unwrap();
    let json = serde_json::to_value(handle_client_ws(answer, &state).await).unwrap();
    assert_eq!(json["type"], "answer_result");
    assert_eq!(json["answered"], 1);
  }

  #[tokio::test]
  async fn garbage_frames_get_an_error_reply() {
    let state = AppState::with_config(AppConfig::default(), Box::new(MemoryStats::new()));
    let reply: serde_json::Value = serde_json::from_str(&dispatch_text(&state, "{nope").await).unwrap();
    assert_eq!(reply["type"], "error");
    let reply: serde_json::Value =
      serde_json::from_str(&dispatch_text(&state, r#"{"type":"next_prompt","roundId":"missing"}"#).await).unwrap();
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().contains("missing"));
  }

  #[tokio::test]
  async fn ping_gets_pong() {
    let state = AppState::with_config(AppConfig::default(), Box::new(MemoryStats::new()));
    let json = serde_json::to_value(handle_client_ws(ClientWsMessage::Ping, &state).await).unwrap();
    assert_eq!(json["type"], "pong");
  }
}
