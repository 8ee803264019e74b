//! JSON handlers over the round logic. Round errors become status codes here.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::compose::ComposeError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for RoundError {
  fn into_response(self) -> Response {
    let status = match &self {
      RoundError::Compose(ComposeError::NoFocusPosition) => StatusCode::BAD_REQUEST,
      RoundError::Compose(ComposeError::EmptyCoverage) => StatusCode::UNPROCESSABLE_ENTITY,
      RoundError::UnknownRound(_) => StatusCode::NOT_FOUND,
      RoundError::RoundFinished | RoundError::NoPendingPrompt => StatusCode::CONFLICT,
      RoundError::ChoiceOutOfRange(_) => StatusCode::BAD_REQUEST,
    };
    warn!(target: "round", status = status.as_u16(), error = %self, "Round request rejected");
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_scenarios(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let list: Vec<ScenarioSummaryOut> = state.scenarios.read().await.iter().map(to_summary).collect();
  Json(list)
}

#[instrument(level = "info", skip(state))]
pub async fn http_reload_scenarios(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let count = state.reload_scenarios().await;
  Json(ReloadOut { count })
}

#[instrument(level = "info", skip(state, body), fields(mode = ?body.mode, focus = ?body.focus))]
pub async fn http_start_round(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartRoundIn>,
) -> Result<Json<RoundStartedOut>, RoundError> {
  let out = start_round(&state, body.mode, &body.focus, body.weak_spot_count).await?;
  info!(target: "round", round_id = %out.round_id, "HTTP round started");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_next_prompt(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<PromptOut>, RoundError> {
  Ok(Json(next_prompt(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(choice = body.choice, elapsed_ms = body.elapsed_ms))]
pub async fn http_submit_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, RoundError> {
  let out = submit_answer(&state, &id, body.choice, body.elapsed_ms).await?;
  info!(target: "round", round_id = %id, correct = out.correct, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.stats.read().await.summary())
}

#[instrument(level = "info", skip(state))]
pub async fn http_weak_spots(
  State(state): State<Arc<AppState>>,
  Query(q): Query<WeakSpotQuery>,
) -> impl IntoResponse {
  let count = q.count.unwrap_or(state.config.game.weak_spot_count);
  Json(state.stats.read().await.weak_spots(count))
}
