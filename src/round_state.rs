//! Rolling per-round state used by the answer synthesizer to avoid visible patterns.

use std::collections::{HashMap, VecDeque};

use crate::domain::{AnswerValue, Position, QuestionType};

/// How many correct-answer indices we remember.
pub const HISTORY_LEN: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PromptKey {
  pub scenario_id: String,
  pub position: Position,
  pub question_type: QuestionType,
}

/// What was last displayed for a prompt key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastShown {
  pub signature: String,
  pub order: Vec<AnswerValue>,
}

/// Owned by the game loop, one per round, resolved strictly in presentation order.
#[derive(Clone, Debug, Default)]
pub struct RoundState {
  history: VecDeque<usize>,
  last_shown: HashMap<PromptKey, LastShown>,
}

impl RoundState {
  pub fn new() -> Self { Self::default() }

  pub fn history(&self) -> impl Iterator<Item = usize> + '_ { self.history.iter().copied() }

  /// Occurrences of `index` among the remembered correct indices.
  pub fn index_count(&self, index: usize) -> usize {
    self.history.iter().filter(|i| **i == index).count()
  }

  pub fn push_index(&mut self, index: usize) {
    if self.history.len() == HISTORY_LEN {
      self.history.pop_front();
    }
    self.history.push_back(index);
  }

  pub fn last_shown(&self, key: &PromptKey) -> Option<&LastShown> { self.last_shown.get(key) }

  pub fn remember(&mut self, key: PromptKey, shown: LastShown) {
    self.last_shown.insert(key, shown);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn history_is_bounded_and_evicts_oldest() {
    let mut st = RoundState::new();
    for i in [0, 1, 2, 3, 0, 1, 2] {
      st.push_index(i);
    }
    assert_eq!(st.history().count(), HISTORY_LEN);
    assert_eq!(st.history().collect::<Vec<_>>(), vec![2, 3, 0, 1, 2]);
    assert_eq!(st.index_count(2), 2);
  }
}
