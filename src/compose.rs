//! Round composition: choose which positions and question types make up a round.
//!
//! Three modes:
//!   - weak-spot practice: replay the player's most-missed answers, padded with whole-field
//!   - focus: one or two positions, primary picked ~80% of the time
//!   - whole-field: one prompt per coverage group, an optional backup, then recency fill
//!
//! Every mode shares one rule: at most one fielder-action question per round, only for
//! a role that fields the ball, and only when a 30% gate passes.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::domain::{GameMode, Position, Prompt, QuestionType, RoleDefinition, Scenario, WeakSpot};
use crate::stats::StatsRepository;

pub const ROUND_SIZE: usize = 6;
const PRIMARY_FOCUS_PROBABILITY: f64 = 0.8;
const FIELDER_ACTION_PROBABILITY: f64 = 0.3;
const BACKUP_PROBABILITY: f64 = 0.7;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ComposeError {
  #[error("focus mode requires at least one focus position")]
  NoFocusPosition,
  #[error("no scenario defines a role for any eligible position")]
  EmptyCoverage,
}

/// Focus positions for single/dual-position practice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Focus {
  pub primary: Position,
  pub secondary: Option<Position>,
}

impl Focus {
  /// First entry is the primary focus, second (if any) the secondary.
  pub fn from_positions(list: &[Position]) -> Option<Focus> {
    let primary = *list.first()?;
    let secondary = list.get(1).copied().filter(|p| *p != primary);
    Some(Focus { primary, secondary })
  }
}

/// Closes after the first fielder-action question of a round.
#[derive(Debug, Default)]
struct FielderActionGate {
  used: bool,
}

impl FielderActionGate {
  fn is_open(&self) -> bool { !self.used }

  fn close(&mut self) { self.used = true; }

  fn question_for<R: Rng + ?Sized>(&mut self, role: &RoleDefinition, rng: &mut R) -> QuestionType {
    if self.is_open() && role.supports_fielder_action() && rng.gen_bool(FIELDER_ACTION_PROBABILITY) {
      self.close();
      QuestionType::FielderAction
    } else {
      QuestionType::PrimaryIntent
    }
  }
}

fn make_prompt<R: Rng + ?Sized>(
  scenario: &Scenario,
  pos: Position,
  gate: &mut FielderActionGate,
  rng: &mut R,
) -> Option<Prompt> {
  let role = scenario.role(pos)?;
  let qt = gate.question_for(role, rng);
  let answer = role.correct_answer(qt)?;
  Some(Prompt::unresolved(&scenario.id, pos, qt, answer))
}

/// Compose one round of `ROUND_SIZE` unresolved prompts.
#[instrument(level = "info", skip(scenarios, weak_spots, stats, rng), fields(pool = scenarios.len(), weak_spots = weak_spots.len()))]
pub fn compose_round<R: Rng + ?Sized>(
  scenarios: &[Scenario],
  mode: GameMode,
  focus: Option<Focus>,
  weak_spots: &[WeakSpot],
  stats: &dyn StatsRepository,
  rng: &mut R,
) -> Result<Vec<Prompt>, ComposeError> {
  if mode == GameMode::Focus && focus.is_none() {
    return Err(ComposeError::NoFocusPosition);
  }
  if scenarios.iter().all(|s| s.roles.is_empty()) {
    return Err(ComposeError::EmptyCoverage);
  }

  let mut gate = FielderActionGate::default();
  let prompts = match (mode, focus) {
    (GameMode::Focus, Some(focus)) => compose_focus(scenarios, focus, &mut gate, rng)?,
    (GameMode::WeakSpot, _) => compose_weak_spot(scenarios, weak_spots, stats, &mut gate, rng),
    _ => {
      let mut out = Vec::with_capacity(ROUND_SIZE);
      let mut used = HashSet::new();
      fill_whole_field(scenarios, stats, &mut out, &mut used, &mut gate, rng);
      out
    }
  };

  if prompts.len() < ROUND_SIZE {
    return Err(ComposeError::EmptyCoverage);
  }
  info!(target: "round", ?mode, fielder_action = !gate.is_open(), "Composed round");
  Ok(prompts)
}

fn compose_focus<R: Rng + ?Sized>(
  scenarios: &[Scenario],
  focus: Focus,
  gate: &mut FielderActionGate,
  rng: &mut R,
) -> Result<Vec<Prompt>, ComposeError> {
  let has_focus = |s: &Scenario| {
    s.role(focus.primary).is_some() || focus.secondary.map_or(false, |p| s.role(p).is_some())
  };
  let candidates: Vec<&Scenario> = scenarios.iter().filter(|s| has_focus(*s)).collect();
  if candidates.is_empty() {
    return Err(ComposeError::EmptyCoverage);
  }

  let mut out = Vec::with_capacity(ROUND_SIZE);
  for _ in 0..ROUND_SIZE {
    let scenario = candidates.choose(rng).copied().ok_or(ComposeError::EmptyCoverage)?;
    let wanted = if rng.gen_bool(PRIMARY_FOCUS_PROBABILITY) {
      focus.primary
    } else {
      focus.secondary.unwrap_or(focus.primary)
    };
    let pos = if scenario.role(wanted).is_some() {
      wanted
    } else if wanted == focus.primary {
      focus.secondary.unwrap_or(focus.primary)
    } else {
      focus.primary
    };
    let prompt = make_prompt(scenario, pos, gate, rng).ok_or(ComposeError::EmptyCoverage)?;
    out.push(prompt);
  }
  Ok(out)
}

fn compose_weak_spot<R: Rng + ?Sized>(
  scenarios: &[Scenario],
  weak_spots: &[WeakSpot],
  stats: &dyn StatsRepository,
  gate: &mut FielderActionGate,
  rng: &mut R,
) -> Vec<Prompt> {
  let mut out = Vec::with_capacity(ROUND_SIZE);
  let mut used = HashSet::new();

  for ws in weak_spots {
    if out.len() >= ROUND_SIZE {
      break;
    }
    if ws.question_type == QuestionType::FielderAction && !gate.is_open() {
      debug!(target: "round", role = %ws.role, "Fielder-action already used this round; skipping weak spot");
      continue;
    }
    let matches: Vec<&Scenario> = scenarios
      .iter()
      .filter(|s| s.role(ws.role).and_then(|r| r.correct_answer(ws.question_type)) == Some(ws.intent))
      .collect();
    let Some(scenario) = matches.choose(rng).copied() else {
      debug!(target: "round", role = %ws.role, intent = %ws.intent, "No scenario matches weak spot");
      continue;
    };
    if ws.question_type == QuestionType::FielderAction {
      gate.close();
    }
    out.push(Prompt::unresolved(&scenario.id, ws.role, ws.question_type, ws.intent));
    used.insert(ws.role);
  }

  if out.len() < ROUND_SIZE {
    debug!(target: "round", from_weak_spots = out.len(), "Padding weak-spot round with whole-field prompts");
    fill_whole_field(scenarios, stats, &mut out, &mut used, gate, rng);
  }
  out
}

fn eligible_in(scenario: &Scenario, group: &[Position], used: &HashSet<Position>) -> Vec<Position> {
  group
    .iter()
    .copied()
    .filter(|p| scenario.role(*p).is_some() && !used.contains(p))
    .collect()
}

fn push_prompt<R: Rng + ?Sized>(
  scenario: &Scenario,
  pos: Position,
  out: &mut Vec<Prompt>,
  used: &mut HashSet<Position>,
  gate: &mut FielderActionGate,
  rng: &mut R,
) {
  if let Some(p) = make_prompt(scenario, pos, gate, rng) {
    used.insert(pos);
    out.push(p);
  }
}

/// Unused positions with a role in `scenario`: recommended roles first, then oldest asked.
fn recency_order(scenario: &Scenario, stats: &dyn StatsRepository, used: &HashSet<Position>) -> Vec<Position> {
  let mut cands = eligible_in(scenario, &Position::ALL, used);
  cands.sort_by_key(|p| (!scenario.is_recommended(*p), stats.last_asked(*p)));
  cands
}

fn fill_by_recency<R: Rng + ?Sized>(
  scenario: &Scenario,
  stats: &dyn StatsRepository,
  out: &mut Vec<Prompt>,
  used: &mut HashSet<Position>,
  gate: &mut FielderActionGate,
  rng: &mut R,
) {
  for pos in recency_order(scenario, stats, used) {
    if out.len() >= ROUND_SIZE {
      break;
    }
    push_prompt(scenario, pos, out, used, gate, rng);
  }
}

/// Whole-field selection, appending to `out` until it holds `ROUND_SIZE` prompts.
fn fill_whole_field<R: Rng + ?Sized>(
  scenarios: &[Scenario],
  stats: &dyn StatsRepository,
  out: &mut Vec<Prompt>,
  used: &mut HashSet<Position>,
  gate: &mut FielderActionGate,
  rng: &mut R,
) {
  let playable: Vec<&Scenario> = scenarios.iter().filter(|s| !s.roles.is_empty()).collect();
  let Some(primary) = playable.choose(rng).copied() else {
    return;
  };

  let groups = &primary.role_groups;
  for (name, group) in [
    ("ballSide", &groups.ball_side),
    ("infieldCore", &groups.infield_core),
    ("coverage", &groups.coverage),
  ] {
    if out.len() >= ROUND_SIZE {
      return;
    }
    match eligible_in(primary, group, used).choose(rng).copied() {
      Some(pos) => push_prompt(primary, pos, out, used, gate, rng),
      None => warn!(target: "round", scenario = %primary.id, group = name, "Role group has no eligible unused position; skipping"),
    }
  }

  if out.len() < ROUND_SIZE && rng.gen_bool(BACKUP_PROBABILITY) {
    let mut pool = eligible_in(primary, &groups.backups, used);
    pool.shuffle(rng);
    if let Some(pos) = pool.into_iter().min_by_key(|p| stats.last_asked(*p)) {
      push_prompt(primary, pos, out, used, gate, rng);
    }
  }

  fill_by_recency(primary, stats, out, used, gate, rng);
  if out.len() >= ROUND_SIZE {
    return;
  }

  let mut others: Vec<&Scenario> = playable.iter().copied().filter(|s| s.id != primary.id).collect();
  others.shuffle(rng);
  for s in others {
    fill_by_recency(s, stats, out, used, gate, rng);
    if out.len() >= ROUND_SIZE {
      return;
    }
  }

  warn!(target: "round", scenario = %primary.id, have = out.len(), "Not enough distinct positions; repeating positions");
  while out.len() < ROUND_SIZE {
    let mut pass_used = HashSet::new();
    fill_by_recency(primary, stats, out, &mut pass_used, gate, rng);
  }
}
