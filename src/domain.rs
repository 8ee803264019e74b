//! Domain models: positions, the two answer enumerations, scenarios and prompts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The nine fielding positions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
  P,
  C,
  #[serde(rename = "1B")] FirstBase,
  #[serde(rename = "2B")] SecondBase,
  #[serde(rename = "3B")] ThirdBase,
  SS,
  LF,
  CF,
  RF,
}

impl Position {
  pub const ALL: [Position; 9] = [
    Position::P, Position::C, Position::FirstBase, Position::SecondBase, Position::ThirdBase,
    Position::SS, Position::LF, Position::CF, Position::RF,
  ];

  pub fn code(self) -> &'static str {
    match self {
      Position::P => "P",
      Position::C => "C",
      Position::FirstBase => "1B",
      Position::SecondBase => "2B",
      Position::ThirdBase => "3B",
      Position::SS => "SS",
      Position::LF => "LF",
      Position::CF => "CF",
      Position::RF => "RF",
    }
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.code()) }
}

/// What the player is responsible for on the play.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryIntent {
  Field,
  Cover,
  Cutoff,
  Backup,
  Hold,
}

impl PrimaryIntent {
  pub const ALL: [PrimaryIntent; 5] = [
    PrimaryIntent::Field, PrimaryIntent::Cover, PrimaryIntent::Cutoff,
    PrimaryIntent::Backup, PrimaryIntent::Hold,
  ];
}

/// Throw decision of the player who fields the ball.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FielderAction {
  ThrowThroughCutoff,
  ThrowToBase,
  HoldBall,
}

impl FielderAction {
  pub const ALL: [FielderAction; 3] = [
    FielderAction::ThrowThroughCutoff, FielderAction::ThrowToBase, FielderAction::HoldBall,
  ];
}

/// Any answer option. Serialized as the bare enumeration string ("COVER", "HOLD_BALL").
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum AnswerValue {
  Intent(PrimaryIntent),
  Action(FielderAction),
}

impl AnswerValue {
  /// Which question type this value natively answers.
  pub fn question_type(self) -> QuestionType {
    match self {
      AnswerValue::Intent(_) => QuestionType::PrimaryIntent,
      AnswerValue::Action(_) => QuestionType::FielderAction,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      AnswerValue::Intent(PrimaryIntent::Field) => "FIELD",
      AnswerValue::Intent(PrimaryIntent::Cover) => "COVER",
      AnswerValue::Intent(PrimaryIntent::Cutoff) => "CUTOFF",
      AnswerValue::Intent(PrimaryIntent::Backup) => "BACKUP",
      AnswerValue::Intent(PrimaryIntent::Hold) => "HOLD",
      AnswerValue::Action(FielderAction::ThrowThroughCutoff) => "THROW_THROUGH_CUTOFF",
      AnswerValue::Action(FielderAction::ThrowToBase) => "THROW_TO_BASE",
      AnswerValue::Action(FielderAction::HoldBall) => "HOLD_BALL",
    }
  }
}

impl fmt::Display for AnswerValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl From<PrimaryIntent> for AnswerValue {
  fn from(v: PrimaryIntent) -> Self { AnswerValue::Intent(v) }
}

impl From<FielderAction> for AnswerValue {
  fn from(v: FielderAction) -> Self { AnswerValue::Action(v) }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
  PrimaryIntent,
  FielderAction,
}

impl QuestionType {
  pub fn as_str(self) -> &'static str {
    match self {
      QuestionType::PrimaryIntent => "primaryIntent",
      QuestionType::FielderAction => "fielderAction",
    }
  }

  /// Every member of the enumeration this question type is answered from.
  pub fn members(self) -> Vec<AnswerValue> {
    match self {
      QuestionType::PrimaryIntent => PrimaryIntent::ALL.iter().copied().map(AnswerValue::from).collect(),
      QuestionType::FielderAction => FielderAction::ALL.iter().copied().map(AnswerValue::from).collect(),
    }
  }

  pub fn other(self) -> QuestionType {
    match self {
      QuestionType::PrimaryIntent => QuestionType::FielderAction,
      QuestionType::FielderAction => QuestionType::PrimaryIntent,
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioCategory {
  CutRelay,
  Bunt,
  Other,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Runners {
  #[serde(default)] pub on1: bool,
  #[serde(default)] pub on2: bool,
  #[serde(default)] pub on3: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Situation {
  pub runners: Runners,
  pub ball_zone: String,
}

/// Per-position response for one scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
  pub primary_intent: PrimaryIntent,
  #[serde(default)] pub fielder_action: Option<FielderAction>,
  pub distractor_pool_high: Vec<AnswerValue>,
  pub distractor_pool_low: Vec<AnswerValue>,
  pub explanation: String,
}

impl RoleDefinition {
  /// The correct answer for a question type, if this role can be asked it.
  pub fn correct_answer(&self, qt: QuestionType) -> Option<AnswerValue> {
    match qt {
      QuestionType::PrimaryIntent => Some(self.primary_intent.into()),
      QuestionType::FielderAction => match (self.primary_intent, self.fielder_action) {
        (PrimaryIntent::Field, Some(a)) => Some(a.into()),
        _ => None,
      },
    }
  }

  pub fn supports_fielder_action(&self) -> bool {
    self.correct_answer(QuestionType::FielderAction).is_some()
  }
}

/// Named position subsets used for round coverage.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoleGroups {
  pub ball_side: Vec<Position>,
  pub infield_core: Vec<Position>,
  pub coverage: Vec<Position>,
  pub backups: Vec<Position>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptPlan {
  #[serde(default)] pub recommended_roles: Vec<Position>,
  #[serde(default)] pub difficulty: Option<String>,
}

/// Immutable batted-ball situation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
  pub id: String,
  pub title: String,
  pub category: ScenarioCategory,
  pub situation: Situation,
  pub roles: BTreeMap<Position, RoleDefinition>,
  pub role_groups: RoleGroups,
  #[serde(default)] pub prompt_plan: Option<PromptPlan>,
}

impl Scenario {
  pub fn role(&self, pos: Position) -> Option<&RoleDefinition> { self.roles.get(&pos) }

  pub fn is_recommended(&self, pos: Position) -> bool {
    self.prompt_plan
      .as_ref()
      .map(|p| p.recommended_roles.contains(&pos))
      .unwrap_or(false)
  }
}

/// One question instance. `options` stays empty until the synthesizer resolves it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
  pub scenario_id: String,
  pub position: Position,
  pub question_type: QuestionType,
  pub correct_answer: AnswerValue,
  pub options: Vec<AnswerValue>,
  pub correct_index: usize,
}

impl Prompt {
  pub fn unresolved(scenario_id: &str, position: Position, question_type: QuestionType, correct_answer: AnswerValue) -> Self {
    Self {
      scenario_id: scenario_id.to_string(),
      position,
      question_type,
      correct_answer,
      options: Vec::new(),
      correct_index: 0,
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
  WeakSpot,
  Focus,
  WholeField,
}

/// A ranked miss record from the stats store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeakSpot {
  pub role: Position,
  pub question_type: QuestionType,
  pub intent: AnswerValue,
  pub miss_count: u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn answer_values_use_bare_strings_on_the_wire() {
    let v: Vec<AnswerValue> = serde_json::from_str(r#"["COVER","THROW_TO_BASE"]"#).expect("parse");
    assert_eq!(v, vec![AnswerValue::Intent(PrimaryIntent::Cover), AnswerValue::Action(FielderAction::ThrowToBase)]);
    let s = serde_json::to_string(&AnswerValue::from(FielderAction::HoldBall)).expect("ser");
    assert_eq!(s, r#""HOLD_BALL""#);
  }

  #[test]
  fn positions_round_trip_with_base_codes() {
    let p: Position = serde_json::from_str(r#""2B""#).expect("parse");
    assert_eq!(p, Position::SecondBase);
    assert_eq!(p.to_string(), "2B");
  }

  #[test]
  fn fielder_action_requires_field_intent() {
    let role = RoleDefinition {
      primary_intent: PrimaryIntent::Cover,
      fielder_action: Some(FielderAction::ThrowToBase),
      distractor_pool_high: vec![],
      distractor_pool_low: vec![],
      explanation: "x".into(),
    };
    assert!(!role.supports_fielder_action());
    assert_eq!(role.correct_answer(QuestionType::PrimaryIntent), Some(AnswerValue::Intent(PrimaryIntent::Cover)));
  }
}
