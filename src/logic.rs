//! Core game-loop behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting a round (composition against the cached scenario pool)
//!   - Presenting the next prompt (options synthesized at presentation time, in order)
//!   - Checking an answer and feeding the stats sink

use std::collections::HashMap;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::compose::{compose_round, ComposeError, Focus};
use crate::domain::{GameMode, Position};
use crate::options::resolve_options;
use crate::protocol::{AnswerOut, PromptOut, RoundStartedOut, SituationOut};
use crate::round_state::RoundState;
use crate::state::{AppState, RoundSession};
use crate::util::now_ms;

/// Answer times above this are clamped before they reach the stats sink.
pub const MAX_ELAPSED_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, thiserror::Error)]
pub enum RoundError {
  #[error(transparent)]
  Compose(#[from] ComposeError),
  #[error("unknown round `{0}`")]
  UnknownRound(String),
  #[error("round is already finished")]
  RoundFinished,
  #[error("no prompt is waiting for an answer")]
  NoPendingPrompt,
  #[error("choice {0} is out of range")]
  ChoiceOutOfRange(usize),
}

#[instrument(level = "info", skip(state))]
pub async fn start_round(
  state: &AppState,
  mode: GameMode,
  focus: &[Position],
  weak_spot_count: Option<usize>,
) -> Result<RoundStartedOut, RoundError> {
  let mut rng = state.round_rng();
  let (prompts, scenarios) = {
    let scenarios = state.scenarios.read().await;
    let stats = state.stats.read().await;
    let weak = if mode == GameMode::WeakSpot {
      stats.weak_spots(weak_spot_count.unwrap_or(state.config.game.weak_spot_count))
    } else {
      Vec::new()
    };
    let prompts = compose_round(&scenarios, mode, Focus::from_positions(focus), &weak, &**stats, &mut rng)?;

    let referenced: HashMap<String, _> = scenarios
      .iter()
      .filter(|s| prompts.iter().any(|p| p.scenario_id == s.id))
      .map(|s| (s.id.clone(), s.clone()))
      .collect();
    (prompts, referenced)
  };

  let id = Uuid::new_v4().to_string();
  let total = prompts.len();
  state
    .insert_round(RoundSession {
      id: id.clone(),
      mode,
      prompts,
      scenarios,
      cursor: 0,
      pending: false,
      score: 0,
      round_state: RoundState::new(),
      rng,
      last_touched_ms: now_ms(),
    })
    .await;

  info!(target: "round", round_id = %id, total, "Round started");
  Ok(RoundStartedOut { round_id: id, mode, total })
}

/// Resolve and present the prompt at the cursor. Asking again before answering
/// returns the same prompt.
#[instrument(level = "info", skip(state))]
pub async fn next_prompt(state: &AppState, round_id: &str) -> Result<PromptOut, RoundError> {
  let session = state
    .get_round(round_id)
    .await
    .ok_or_else(|| RoundError::UnknownRound(round_id.to_string()))?;
  let mut guard = session.lock().await;
  let s = &mut *guard;
  if s.is_finished() {
    return Err(RoundError::RoundFinished);
  }

  s.last_touched_ms = now_ms();
  let idx = s.cursor;
  let scenario_id = s.prompts[idx].scenario_id.clone();
  let scenario = s
    .scenarios
    .get(&scenario_id)
    .ok_or_else(|| RoundError::UnknownRound(round_id.to_string()))?;

  if !s.pending {
    resolve_options(&mut s.prompts[idx], scenario, &mut s.round_state, &mut s.rng);
    s.pending = true;
  }

  let p = &s.prompts[idx];
  Ok(PromptOut {
    round_id: s.id.clone(),
    index: idx,
    total: s.prompts.len(),
    situation: SituationOut::from_scenario(scenario),
    position: p.position,
    question_type: p.question_type,
    options: p.options.clone(),
  })
}

/// Check the player's choice for the pending prompt and record stats.
#[instrument(level = "info", skip(state))]
pub async fn submit_answer(state: &AppState, round_id: &str, choice: usize, elapsed_ms: u64) -> Result<AnswerOut, RoundError> {
  let session = state
    .get_round(round_id)
    .await
    .ok_or_else(|| RoundError::UnknownRound(round_id.to_string()))?;
  let mut guard = session.lock().await;
  let s = &mut *guard;
  if s.is_finished() {
    return Err(RoundError::RoundFinished);
  }
  if !s.pending {
    return Err(RoundError::NoPendingPrompt);
  }
  s.last_touched_ms = now_ms();
  let elapsed_ms = if elapsed_ms > MAX_ELAPSED_MS {
    warn!(target: "round", %round_id, elapsed_ms, "Answer time out of range; clamping");
    MAX_ELAPSED_MS
  } else {
    elapsed_ms
  };

  let prompt = s.prompts[s.cursor].clone();
  if choice >= prompt.options.len() {
    return Err(RoundError::ChoiceOutOfRange(choice));
  }
  let correct = choice == prompt.correct_index;
  let explanation = s
    .scenarios
    .get(&prompt.scenario_id)
    .and_then(|sc| sc.role(prompt.position))
    .map(|r| r.explanation.clone())
    .unwrap_or_default();

  {
    let mut stats = state.stats.write().await;
    stats.record_position(prompt.position, correct, elapsed_ms, now_ms());
    stats.record_scenario(&prompt.scenario_id, correct);
    stats.record_overall(correct);
    if !correct {
      stats.record_miss(prompt.position, prompt.question_type, prompt.correct_answer);
    }
  }

  s.pending = false;
  s.cursor += 1;
  if correct {
    s.score += 1;
  }
  let finished = s.is_finished();
  let mode = s.mode;
  let out = AnswerOut {
    correct,
    correct_index: prompt.correct_index,
    correct_answer: prompt.correct_answer,
    explanation,
    score: s.score,
    answered: s.cursor,
    total: s.prompts.len(),
    finished,
  };
  drop(guard);

  info!(target: "round", %round_id, ?mode, position = %prompt.position, correct, finished, "Answer checked");
  if finished {
    state.remove_round(round_id).await;
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compose::ROUND_SIZE;
  use crate::config::AppConfig;
  use crate::stats::MemoryStats;

  fn seeded_state() -> AppState {
    let mut cfg = AppConfig::default();
    cfg.game.seed = Some(77);
    AppState::with_config(cfg, Box::new(MemoryStats::new()))
  }

  #[tokio::test]
  async fn full_round_records_stats_and_closes() {
    let state = seeded_state();
    let started = start_round(&state, GameMode::WholeField, &[], None).await.expect("start");
    assert_eq!(started.total, ROUND_SIZE);

    for i in 0..ROUND_SIZE {
      let p = next_prompt(&state, &started.round_id).await.expect("prompt");
      assert_eq!(p.index, i);
      assert_eq!(p.options.len(), 4);
      // Miss every odd question on purpose.
      let choice = if i % 2 == 0 { 0 } else { 3 };
      let out = submit_answer(&state, &started.round_id, choice, 900).await.expect("answer");
      assert_eq!(out.answered, i + 1);
      assert_eq!(out.finished, i + 1 == ROUND_SIZE);
    }

    assert!(state.get_round(&started.round_id).await.is_none());
    let summary = state.stats.read().await.summary();
    assert_eq!(summary.overall.attempts as usize, ROUND_SIZE);
    assert!(matches!(
      next_prompt(&state, &started.round_id).await,
      Err(RoundError::UnknownRound(_))
    ));
  }

  #[tokio::test]
  async fn repeated_next_returns_same_prompt() {
    let state = seeded_state();
    let started = start_round(&state, GameMode::WholeField, &[], None).await.expect("start");
    let a = next_prompt(&state, &started.round_id).await.expect("a");
    let b = next_prompt(&state, &started.round_id).await.expect("b");
    assert_eq!(a.index, b.index);
    assert_eq!(a.options, b.options);
  }

  #[tokio::test]
  async fn answering_before_presenting_is_rejected() {
    let state = seeded_state();
    let started = start_round(&state, GameMode::WholeField, &[], None).await.expect("start");
    let err = submit_answer(&state, &started.round_id, 0, 0).await.unwrap_err();
    assert!(matches!(err, RoundError::NoPendingPrompt));

    next_prompt(&state, &started.round_id).await.expect("prompt");
    let err = submit_answer(&state, &started.round_id, 9, 0).await.unwrap_err();
    assert!(matches!(err, RoundError::ChoiceOutOfRange(9)));
  }

  #[tokio::test]
  async fn focus_without_positions_is_a_configuration_error() {
    let state = seeded_state();
    let err = start_round(&state, GameMode::Focus, &[], None).await.unwrap_err();
    assert!(matches!(err, RoundError::Compose(ComposeError::NoFocusPosition)));
  }

  #[tokio::test]
  async fn misses_feed_weak_spot_rounds() {
    let state = seeded_state();
    {
      let mut stats = state.stats.write().await;
      for _ in 0..3 {
        stats.record_miss(
          Position::SS,
          crate::domain::QuestionType::PrimaryIntent,
          crate::domain::AnswerValue::Intent(crate::domain::PrimaryIntent::Cutoff),
        );
      }
    }
    let started = start_round(&state, GameMode::WeakSpot, &[], None).await.expect("start");
    let p = next_prompt(&state, &started.round_id).await.expect("prompt");
    assert_eq!(p.position, Position::SS);
  }

  #[tokio::test]
  async fn absurd_answer_times_are_clamped() {
    let state = seeded_state();
    let started = start_round(&state, GameMode::Focus, &[Position::SS], None).await.expect("start");
    for _ in 0..2 {
      next_prompt(&state, &started.round_id).await.expect("prompt");
      let out = submit_answer(&state, &started.round_id, 0, u64::MAX).await.expect("answer");
      assert!(!out.finished);
    }
    let summary = state.stats.read().await.summary();
    let ss = &summary.positions[&Position::SS];
    assert_eq!(ss.tally.attempts, 2);
    assert_eq!(ss.total_elapsed_ms, 2 * MAX_ELAPSED_MS);
    let p = next_prompt(&state, &started.round_id).await.expect("round still usable");
    assert_eq!(p.index, 2);
  }

  #[tokio::test]
  async fn abandoned_rounds_are_capped() {
    let mut cfg = AppConfig::default();
    cfg.game.seed = Some(5);
    cfg.game.max_live_rounds = 8;
    let state = AppState::with_config(cfg, Box::new(MemoryStats::new()));
    let mut ids = Vec::new();
    for _ in 0..50 {
      ids.push(start_round(&state, GameMode::WholeField, &[], None).await.expect("start").round_id);
    }
    assert_eq!(state.rounds.read().await.len(), 8);
    let newest = ids.last().expect("id");
    assert!(state.get_round(newest).await.is_some());
  }

  #[tokio::test]
  async fn idle_rounds_expire_after_ttl() {
    let state = seeded_state();
    for _ in 0..5 {
      start_round(&state, GameMode::WholeField, &[], None).await.expect("start");
    }
    assert_eq!(state.prune_rounds(now_ms()).await, 0);
    assert_eq!(state.rounds.read().await.len(), 5);

    let later = now_ms() + state.config.game.round_ttl_secs * 1000 + 1;
    assert_eq!(state.prune_rounds(later).await, 5);
    assert!(state.rounds.read().await.is_empty());
  }
}
