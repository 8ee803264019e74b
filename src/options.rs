//! Answer synthesis: pick three distractors for a prompt, shuffle the four options,
//! then nudge the shuffle away from patterns a player could learn to exploit.
//!
//! Uniqueness of the four options is a hard guarantee. The two anti-repetition
//! guards are best-effort and give up after `MAX_GUARD_ATTEMPTS`.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::domain::{AnswerValue, FielderAction, PrimaryIntent, Prompt, QuestionType, RoleDefinition, Scenario};
use crate::round_state::{LastShown, PromptKey, RoundState};

pub const OPTION_COUNT: usize = 4;
const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;
pub const MAX_GUARD_ATTEMPTS: usize = 10;
/// Reshuffle when the correct index already appears this often in the history.
const INDEX_REPEAT_LIMIT: usize = 3;

const INTENT_FALLBACK: [PrimaryIntent; 3] = [PrimaryIntent::Cover, PrimaryIntent::Backup, PrimaryIntent::Hold];
const ACTION_FALLBACK: [FielderAction; 2] = [FielderAction::ThrowToBase, FielderAction::HoldBall];

fn global_fallback(qt: QuestionType) -> Vec<AnswerValue> {
  match qt {
    QuestionType::PrimaryIntent => INTENT_FALLBACK.iter().copied().map(AnswerValue::from).collect(),
    QuestionType::FielderAction => ACTION_FALLBACK.iter().copied().map(AnswerValue::from).collect(),
  }
}

/// How many distractors we try to take from the role's own pools.
fn pool_target(qt: QuestionType) -> usize {
  match qt {
    QuestionType::PrimaryIntent => 3,
    // The action enumeration only has three members.
    QuestionType::FielderAction => 2,
  }
}

fn push_unique(out: &mut Vec<AnswerValue>, v: AnswerValue, correct: AnswerValue) {
  if v != correct && !out.contains(&v) {
    out.push(v);
  }
}

/// Three distinct distractors, none equal to `correct`.
///
/// Order of preference: high pool, low pool (same enumeration only), global fallback
/// list, any enumeration member, then members of the other enumeration.
pub fn pick_distractors(qt: QuestionType, correct: AnswerValue, role: Option<&RoleDefinition>) -> Vec<AnswerValue> {
  let mut out = Vec::with_capacity(DISTRACTOR_COUNT);
  let target = pool_target(qt);

  if let Some(role) = role {
    for v in role.distractor_pool_high.iter().chain(role.distractor_pool_low.iter()) {
      if out.len() >= target { break; }
      if v.question_type() == qt {
        push_unique(&mut out, *v, correct);
      }
    }
  }

  for v in global_fallback(qt).into_iter().chain(qt.members()) {
    if out.len() >= DISTRACTOR_COUNT { break; }
    push_unique(&mut out, v, correct);
  }

  if out.len() < DISTRACTOR_COUNT {
    let before = out.len();
    for v in qt.other().members() {
      if out.len() >= DISTRACTOR_COUNT { break; }
      push_unique(&mut out, v, correct);
    }
    debug!(target: "round", question_type = qt.as_str(), filled = out.len() - before, "Cross-enumeration filler used for distractors");
  }

  out
}

/// Order-independent fingerprint of an option set for a prompt key.
pub fn option_signature(prompt: &Prompt, options: &[AnswerValue]) -> String {
  let mut labels: Vec<&str> = options.iter().map(|o| o.label()).collect();
  labels.sort_unstable();
  format!(
    "{}|{}|{}|{}|{}",
    prompt.question_type.as_str(),
    prompt.scenario_id,
    prompt.position,
    labels.join(","),
    prompt.correct_answer.label()
  )
}

fn index_of(options: &[AnswerValue], v: AnswerValue) -> usize {
  options.iter().position(|o| *o == v).unwrap_or(0)
}

/// Reshuffle while the correct index is over-represented in the history.
/// Returns the least repetitive arrangement seen.
fn apply_index_guard<R: Rng + ?Sized>(
  mut options: Vec<AnswerValue>,
  correct: AnswerValue,
  state: &RoundState,
  rng: &mut R,
) -> Vec<AnswerValue> {
  let mut best = options.clone();
  let mut best_count = state.index_count(index_of(&best, correct));
  let mut attempts = 0;
  while best_count >= INDEX_REPEAT_LIMIT && attempts < MAX_GUARD_ATTEMPTS {
    options.shuffle(rng);
    attempts += 1;
    let count = state.index_count(index_of(&options, correct));
    if count < best_count {
      best = options.clone();
      best_count = count;
    }
  }
  best
}

/// Swap two non-correct options so the arrangement differs from `previous`.
/// The correct answer never moves.
fn break_signature_repeat<R: Rng + ?Sized>(
  options: &mut [AnswerValue],
  correct: AnswerValue,
  previous: &[AnswerValue],
  rng: &mut R,
) {
  let others: Vec<usize> = (0..options.len()).filter(|&i| options[i] != correct).collect();
  if others.len() < 2 {
    return;
  }
  for _ in 0..MAX_GUARD_ATTEMPTS {
    let pair: Vec<usize> = others.choose_multiple(rng, 2).copied().collect();
    options.swap(pair[0], pair[1]);
    if &options[..] != previous {
      break;
    }
  }
}

/// Fill `prompt.options` and `prompt.correct_index`, updating the round state.
///
/// Must be called once per prompt, in presentation order.
#[instrument(level = "debug", skip_all, fields(scenario = %prompt.scenario_id, position = %prompt.position, question_type = prompt.question_type.as_str()))]
pub fn resolve_options<R: Rng + ?Sized>(
  prompt: &mut Prompt,
  scenario: &Scenario,
  state: &mut RoundState,
  rng: &mut R,
) {
  let correct = prompt.correct_answer;
  let role = scenario.role(prompt.position);
  if role.is_none() {
    warn!(target: "round", scenario = %scenario.id, position = %prompt.position, "No role definition for prompt; using fallback distractors only");
  }

  let mut options = Vec::with_capacity(OPTION_COUNT);
  options.push(correct);
  options.extend(pick_distractors(prompt.question_type, correct, role));
  options.shuffle(rng);

  let mut options = apply_index_guard(options, correct, state, rng);

  let key = PromptKey {
    scenario_id: prompt.scenario_id.clone(),
    position: prompt.position,
    question_type: prompt.question_type,
  };
  let signature = option_signature(prompt, &options);
  if let Some(prev) = state.last_shown(&key) {
    if prev.signature == signature {
      break_signature_repeat(&mut options, correct, &prev.order, rng);
    }
  }

  let correct_index = index_of(&options, correct);
  state.push_index(correct_index);
  state.remember(key, LastShown { signature, order: options.clone() });
  debug!(target: "round", correct_index, history = ?state.history().collect::<Vec<_>>(), "Options resolved");

  prompt.options = options;
  prompt.correct_index = correct_index;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Position;
  use crate::testutil::{role, sample_scenario};
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use std::collections::HashSet;

  fn assert_valid(p: &Prompt) {
    assert_eq!(p.options.len(), OPTION_COUNT);
    let uniq: HashSet<_> = p.options.iter().collect();
    assert_eq!(uniq.len(), OPTION_COUNT, "duplicate options: {:?}", p.options);
    assert_eq!(p.options[p.correct_index], p.correct_answer);
    assert_eq!(p.options.iter().filter(|o| **o == p.correct_answer).count(), 1);
  }

  #[test]
  fn high_pool_is_preferred_over_low_pool() {
    let r = role(
      PrimaryIntent::Field,
      None,
      &[PrimaryIntent::Cover.into(), PrimaryIntent::Backup.into(), PrimaryIntent::Cutoff.into()],
      &[PrimaryIntent::Hold.into()],
    );
    let d = pick_distractors(QuestionType::PrimaryIntent, PrimaryIntent::Field.into(), Some(&r));
    assert_eq!(d, vec![AnswerValue::Intent(PrimaryIntent::Cover), AnswerValue::Intent(PrimaryIntent::Backup), AnswerValue::Intent(PrimaryIntent::Cutoff)]);
  }

  #[test]
  fn pools_skip_correct_answer_duplicates_and_other_enumeration() {
    let r = role(
      PrimaryIntent::Cover,
      None,
      &[PrimaryIntent::Cover.into(), FielderAction::HoldBall.into(), PrimaryIntent::Backup.into()],
      &[PrimaryIntent::Backup.into()],
    );
    let d = pick_distractors(QuestionType::PrimaryIntent, PrimaryIntent::Cover.into(), Some(&r));
    assert_eq!(d.len(), 3);
    assert_eq!(d[0], AnswerValue::Intent(PrimaryIntent::Backup));
    assert!(d.iter().all(|v| v.question_type() == QuestionType::PrimaryIntent));
    assert!(!d.contains(&PrimaryIntent::Cover.into()));
  }

  #[test]
  fn fielder_action_questions_borrow_from_intent_enumeration() {
    let r = role(PrimaryIntent::Field, Some(FielderAction::ThrowToBase), &[], &[]);
    let d = pick_distractors(QuestionType::FielderAction, FielderAction::ThrowToBase.into(), Some(&r));
    assert_eq!(d.len(), 3);
    let actions = d.iter().filter(|v| v.question_type() == QuestionType::FielderAction).count();
    assert_eq!(actions, 2);
  }

  #[test]
  fn missing_role_still_yields_four_unique_options() {
    let scenario = sample_scenario("s1");
    let mut st = RoundState::new();
    let mut rng = StdRng::seed_from_u64(3);
    let mut p = Prompt::unresolved("s1", Position::RF, QuestionType::PrimaryIntent, PrimaryIntent::Backup.into());
    resolve_options(&mut p, &scenario, &mut st, &mut rng);
    assert_valid(&p);
  }

  #[test]
  fn every_resolution_is_valid() {
    let scenario = sample_scenario("s1");
    let mut st = RoundState::new();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
      for (pos, r) in &scenario.roles {
        for qt in [QuestionType::PrimaryIntent, QuestionType::FielderAction] {
          let Some(correct) = r.correct_answer(qt) else { continue };
          let mut p = Prompt::unresolved(&scenario.id, *pos, qt, correct);
          resolve_options(&mut p, &scenario, &mut st, &mut rng);
          assert_valid(&p);
        }
      }
    }
  }

  #[test]
  fn signature_guard_changes_order_on_immediate_repeat() {
    let scenario = sample_scenario("s1");
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
      let mut st = RoundState::new();
      let mut first = Prompt::unresolved("s1", Position::C, QuestionType::PrimaryIntent, PrimaryIntent::Cover.into());
      let mut second = first.clone();
      resolve_options(&mut first, &scenario, &mut st, &mut rng);
      resolve_options(&mut second, &scenario, &mut st, &mut rng);
      assert_valid(&second);
      let a: HashSet<_> = first.options.iter().collect();
      let b: HashSet<_> = second.options.iter().collect();
      assert_eq!(a, b);
      assert_ne!(first.options, second.options);
    }
  }

  #[test]
  fn index_guard_avoids_over_represented_slot() {
    let scenario = sample_scenario("s1");
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..100 {
      let mut st = RoundState::new();
      for _ in 0..3 {
        st.push_index(2);
      }
      let mut p = Prompt::unresolved("s1", Position::SS, QuestionType::PrimaryIntent, PrimaryIntent::Cutoff.into());
      resolve_options(&mut p, &scenario, &mut st, &mut rng);
      assert_ne!(p.correct_index, 2);
    }
  }

  #[test]
  fn long_session_keeps_correct_slot_spread_out() {
    let scenario = sample_scenario("s1");
    let mut st = RoundState::new();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut indices = Vec::new();
    for _ in 0..50 {
      let mut p = Prompt::unresolved("s1", Position::P, QuestionType::PrimaryIntent, PrimaryIntent::Backup.into());
      resolve_options(&mut p, &scenario, &mut st, &mut rng);
      indices.push(p.correct_index);
    }
    let violations = indices
      .windows(5)
      .filter(|w| (0..OPTION_COUNT).any(|slot| w.iter().filter(|i| **i == slot).count() > 3))
      .count();
    assert!(violations <= 1, "too many windows with a dominant slot: {violations}");
  }
}
