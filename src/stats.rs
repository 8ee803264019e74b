//! Player stats: the repository the composer reads from and the game loop writes to.
//!
//! The composer only needs `last_asked` and `weak_spots`. Everything else is the
//! stats sink fed after each answer.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{AnswerValue, Position, QuestionType, WeakSpot};

/// Read/write access to persisted player stats.
pub trait StatsRepository: Send + Sync {
  /// Millisecond timestamp of the last time `pos` was asked, 0 if never.
  fn last_asked(&self, pos: Position) -> u64;

  /// Up to `count` weak spots, most misses first.
  fn weak_spots(&self, count: usize) -> Vec<WeakSpot>;

  fn record_position(&mut self, pos: Position, correct: bool, elapsed_ms: u64, now_ms: u64);
  fn record_scenario(&mut self, scenario_id: &str, correct: bool);
  fn record_overall(&mut self, correct: bool);
  fn record_miss(&mut self, pos: Position, qt: QuestionType, answer: AnswerValue);

  fn summary(&self) -> StatsSummary;
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
  pub attempts: u32,
  pub correct: u32,
}

impl Tally {
  fn add(&mut self, correct: bool) {
    self.attempts += 1;
    if correct { self.correct += 1; }
  }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionStats {
  pub tally: Tally,
  pub total_elapsed_ms: u64,
  pub last_asked_ms: u64,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
  pub overall: Tally,
  pub streak: u32,
  pub best_streak: u32,
  pub positions: BTreeMap<Position, PositionStats>,
  pub scenarios: BTreeMap<String, Tally>,
}

/// In-memory stats store. Also the fake used by tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStats {
  overall: Tally,
  streak: u32,
  best_streak: u32,
  positions: BTreeMap<Position, PositionStats>,
  scenarios: BTreeMap<String, Tally>,
  misses: HashMap<(Position, QuestionType, AnswerValue), u32>,
}

impl MemoryStats {
  pub fn new() -> Self { Self::default() }

  /// Set a last-asked timestamp directly (seeding and tests).
  pub fn set_last_asked(&mut self, pos: Position, ts: u64) {
    self.positions.entry(pos).or_default().last_asked_ms = ts;
  }
}

impl StatsRepository for MemoryStats {
  fn last_asked(&self, pos: Position) -> u64 {
    self.positions.get(&pos).map(|p| p.last_asked_ms).unwrap_or(0)
  }

  fn weak_spots(&self, count: usize) -> Vec<WeakSpot> {
    let mut out: Vec<WeakSpot> = self
      .misses
      .iter()
      .map(|((role, qt, intent), n)| WeakSpot {
        role: *role,
        question_type: *qt,
        intent: *intent,
        miss_count: *n,
      })
      .collect();
    // Deterministic order for ties.
    out.sort_by(|a, b| {
      b.miss_count
        .cmp(&a.miss_count)
        .then(a.role.cmp(&b.role))
        .then(a.question_type.cmp(&b.question_type))
        .then(a.intent.cmp(&b.intent))
    });
    out.truncate(count);
    out
  }

  fn record_position(&mut self, pos: Position, correct: bool, elapsed_ms: u64, now_ms: u64) {
    let entry = self.positions.entry(pos).or_default();
    entry.tally.add(correct);
    entry.total_elapsed_ms = entry.total_elapsed_ms.saturating_add(elapsed_ms);
    entry.last_asked_ms = now_ms;
  }

  fn record_scenario(&mut self, scenario_id: &str, correct: bool) {
    self.scenarios.entry(scenario_id.to_string()).or_default().add(correct);
  }

  fn record_overall(&mut self, correct: bool) {
    self.overall.add(correct);
    if correct {
      self.streak += 1;
      self.best_streak = self.best_streak.max(self.streak);
    } else {
      self.streak = 0;
    }
  }

  fn record_miss(&mut self, pos: Position, qt: QuestionType, answer: AnswerValue) {
    *self.misses.entry((pos, qt, answer)).or_insert(0) += 1;
  }

  fn summary(&self) -> StatsSummary {
    StatsSummary {
      overall: self.overall.clone(),
      streak: self.streak,
      best_streak: self.best_streak,
      positions: self.positions.clone(),
      scenarios: self.scenarios.clone(),
    }
  }
}
