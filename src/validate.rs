//! Scenario integrity checks applied before a scenario enters the pool.
//!
//! Hard failures drop the scenario (logged, never fatal to the session). Soft findings
//! are returned as warnings so authors can fix sparse distractor data before it forces
//! the runtime fallbacks.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::domain::{AnswerValue, Position, QuestionType, Scenario};

/// Known ball-landing zones and their field coordinates in feet
/// (x toward the first-base side, y out from home plate).
const BALL_ZONES: &[(&str, (f32, f32))] = &[
  ("LF", (-130.0, 190.0)),
  ("LCF_GAP", (-75.0, 215.0)),
  ("CF", (0.0, 230.0)),
  ("RCF_GAP", (75.0, 215.0)),
  ("RF", (130.0, 190.0)),
  ("INF_3B", (-50.0, 55.0)),
  ("INF_SS", (-25.0, 80.0)),
  ("INF_2B", (25.0, 80.0)),
  ("INF_1B", (50.0, 55.0)),
  ("BUNT_3B", (-18.0, 20.0)),
  ("BUNT_P", (0.0, 22.0)),
  ("BUNT_1B", (18.0, 20.0)),
];

pub fn ball_zone_coordinates(tag: &str) -> Option<(f32, f32)> {
  BALL_ZONES.iter().find(|(name, _)| *name == tag).map(|(_, xy)| *xy)
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
  #[error("malformed scenario: {0}")]
  Malformed(#[from] serde_json::Error),
  #[error("missing or empty `{0}`")]
  MissingField(&'static str),
  #[error("unknown ball zone `{0}`")]
  UnknownBallZone(String),
  #[error("scenario defines no roles")]
  NoRoles,
  #[error("role {0} has an empty explanation")]
  EmptyExplanation(Position),
}

/// Check a deserialized scenario. `Ok` carries non-fatal authoring warnings.
pub fn validate_scenario(s: &Scenario) -> Result<Vec<String>, ValidationError> {
  if s.id.trim().is_empty() {
    return Err(ValidationError::MissingField("id"));
  }
  if s.title.trim().is_empty() {
    return Err(ValidationError::MissingField("title"));
  }
  if ball_zone_coordinates(&s.situation.ball_zone).is_none() {
    return Err(ValidationError::UnknownBallZone(s.situation.ball_zone.clone()));
  }
  if s.roles.is_empty() {
    return Err(ValidationError::NoRoles);
  }

  let mut warnings = Vec::new();
  for (pos, role) in &s.roles {
    if role.explanation.trim().is_empty() {
      return Err(ValidationError::EmptyExplanation(*pos));
    }
    if role.fielder_action.is_some() && !role.supports_fielder_action() {
      warnings.push(format!("{pos}: fielderAction is ignored because primaryIntent is not FIELD"));
    }

    let correct: AnswerValue = role.primary_intent.into();
    let pools: Vec<_> = role.distractor_pool_high.iter().chain(role.distractor_pool_low.iter()).collect();
    if pools.iter().any(|v| **v == correct) {
      warnings.push(format!("{pos}: distractor pools contain the correct answer {correct}"));
    }
    let usable: HashSet<_> = pools
      .iter()
      .filter(|v| v.question_type() == QuestionType::PrimaryIntent && ***v != correct)
      .collect();
    if usable.len() < 3 {
      warnings.push(format!("{pos}: only {} primary-intent distractors; fallback list will fill the rest", usable.len()));
    }
    if role.supports_fielder_action() {
      warnings.push(format!("{pos}: fielder-action question needs primary-intent filler options"));
    }
  }

  let g = &s.role_groups;
  for (name, group) in [("ballSide", &g.ball_side), ("infieldCore", &g.infield_core), ("coverage", &g.coverage), ("backups", &g.backups)] {
    if !group.iter().any(|p| s.roles.contains_key(p)) {
      warnings.push(format!("role group {name} has no position with a role; it will be skipped"));
    }
  }
  if let Some(plan) = &s.prompt_plan {
    for p in plan.recommended_roles.iter().filter(|p| !s.roles.contains_key(p)) {
      warnings.push(format!("recommended role {p} has no role definition"));
    }
  }

  Ok(warnings)
}

/// Deserialize and validate one raw scenario.
pub fn parse_scenario(value: Value) -> Result<(Scenario, Vec<String>), ValidationError> {
  let scenario: Scenario = serde_json::from_value(value)?;
  let warnings = validate_scenario(&scenario)?;
  Ok((scenario, warnings))
}

/// Build a pool from raw scenarios, dropping invalid ones and duplicate ids (first wins).
pub fn load_pool(raw: Vec<Value>, source: &str) -> Vec<Scenario> {
  let total = raw.len();
  let mut seen = HashSet::new();
  let mut out = Vec::with_capacity(total);

  for (idx, value) in raw.into_iter().enumerate() {
    let hint = value.get("id").and_then(Value::as_str).unwrap_or("?").to_string();
    match parse_scenario(value) {
      Ok((s, warnings)) => {
        if !seen.insert(s.id.clone()) {
          warn!(target: "scenario", %source, id = %s.id, "Duplicate scenario id; keeping the first");
          continue;
        }
        for w in warnings {
          warn!(target: "scenario", %source, id = %s.id, warning = %w, "Scenario authoring warning");
        }
        out.push(s);
      }
      Err(e) => {
        error!(target: "scenario", %source, index = idx, id = %hint, error = %e, "Dropping invalid scenario");
      }
    }
  }

  info!(target: "scenario", %source, total, accepted = out.len(), "Scenario pool loaded");
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::sample_scenario;
  use serde_json::json;

  #[test]
  fn sample_scenario_is_valid() {
    let s = sample_scenario("s1");
    assert!(validate_scenario(&s).is_ok());
  }

  #[test]
  fn unknown_ball_zone_is_rejected() {
    let mut s = sample_scenario("s1");
    s.situation.ball_zone = "PARKING_LOT".into();
    assert!(matches!(validate_scenario(&s), Err(ValidationError::UnknownBallZone(_))));
  }

  #[test]
  fn sparse_pools_produce_warnings() {
    let s = sample_scenario("s1");
    let warnings = validate_scenario(&s).expect("valid");
    assert!(warnings.iter().any(|w| w.starts_with("1B:") && w.contains("fallback")));
    assert!(warnings.iter().any(|w| w.starts_with("LF:") && w.contains("filler")));
  }

  #[test]
  fn invalid_entries_are_dropped_from_pool() {
    let good = serde_json::to_value(sample_scenario("good")).expect("ser");
    let dup = serde_json::to_value(sample_scenario("good")).expect("ser");
    let mut no_groups = serde_json::to_value(sample_scenario("no_groups")).expect("ser");
    no_groups.as_object_mut().expect("object").remove("roleGroups");
    let mut blank = serde_json::to_value(sample_scenario("blank")).expect("ser");
    blank["roles"]["SS"]["explanation"] = json!("  ");
    let garbage = json!({"id": "x", "title": 3});

    let pool = load_pool(vec![good, no_groups, blank, garbage, dup], "test");
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].id, "good");
  }
}
