//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use crate::domain::*;

pub fn role(intent: PrimaryIntent, action: Option<FielderAction>, high: &[AnswerValue], low: &[AnswerValue]) -> RoleDefinition {
  RoleDefinition {
    primary_intent: intent,
    fielder_action: action,
    distractor_pool_high: high.to_vec(),
    distractor_pool_low: low.to_vec(),
    explanation: format!("{:?} on this play.", intent),
  }
}

/// Single to left with a runner on first. Every position except RF has a role.
pub fn sample_scenario(id: &str) -> Scenario {
  use PrimaryIntent::*;
  let mut roles = BTreeMap::new();
  roles.insert(Position::LF, role(Field, Some(FielderAction::ThrowThroughCutoff), &[Cutoff.into(), Backup.into()], &[Hold.into()]));
  roles.insert(Position::CF, role(Backup, None, &[Field.into()], &[Cover.into()]));
  roles.insert(Position::SS, role(Cutoff, None, &[Cover.into()], &[Backup.into()]));
  roles.insert(Position::SecondBase, role(Cover, None, &[Cutoff.into()], &[]));
  roles.insert(Position::ThirdBase, role(Cover, None, &[Cutoff.into(), Backup.into()], &[]));
  roles.insert(Position::FirstBase, role(Cover, None, &[Hold.into()], &[]));
  roles.insert(Position::C, role(Cover, None, &[Backup.into(), Hold.into()], &[Field.into()]));
  roles.insert(Position::P, role(Backup, None, &[Cover.into(), Cutoff.into()], &[Hold.into()]));

  Scenario {
    id: id.to_string(),
    title: format!("Scenario {id}"),
    category: ScenarioCategory::CutRelay,
    situation: Situation { runners: Runners { on1: true, on2: false, on3: false }, ball_zone: "LCF_GAP".into() },
    roles,
    role_groups: RoleGroups {
      ball_side: vec![Position::LF, Position::CF],
      infield_core: vec![Position::SS, Position::SecondBase],
      coverage: vec![Position::ThirdBase, Position::FirstBase, Position::C],
      backups: vec![Position::P, Position::CF],
    },
    prompt_plan: None,
  }
}

/// Roles only for P, C and 1B; 1B fields and throws to base.
pub fn three_role_scenario(id: &str) -> Scenario {
  use PrimaryIntent::*;
  let mut roles = BTreeMap::new();
  let pool: [AnswerValue; 2] = [Cover.into(), Backup.into()];
  roles.insert(Position::P, role(Cover, None, &pool, &[]));
  roles.insert(Position::C, role(Backup, None, &pool, &[]));
  roles.insert(Position::FirstBase, role(Field, Some(FielderAction::ThrowToBase), &pool, &[]));

  Scenario {
    id: id.to_string(),
    title: format!("Scenario {id}"),
    category: ScenarioCategory::Bunt,
    situation: Situation { runners: Runners::default(), ball_zone: "BUNT_1B".into() },
    roles,
    role_groups: RoleGroups {
      ball_side: vec![Position::FirstBase],
      infield_core: vec![Position::P],
      coverage: vec![Position::C],
      backups: vec![],
    },
    prompt_plan: None,
  }
}
