//! Built-in scenarios so the trainer is playable without a scenario file or KV store.
//!
//! Stored as JSON in the same shape the external store serves, and loaded through
//! the normal validation path.

use serde_json::Value;
use tracing::error;

use crate::domain::Scenario;
use crate::validate::load_pool;

const SEED_SCENARIOS_JSON: &str = r#"[
  {
    "id": "single-lf-runner-1b",
    "title": "Single to left, runner on first",
    "category": "cutRelay",
    "situation": { "runners": { "on1": true, "on2": false, "on3": false }, "ballZone": "LF" },
    "roles": {
      "LF": { "primaryIntent": "FIELD", "fielderAction": "THROW_THROUGH_CUTOFF",
              "distractorPoolHigh": ["THROW_TO_BASE", "BACKUP"], "distractorPoolLow": ["HOLD_BALL", "CUTOFF"],
              "explanation": "Charge the ball and hit the shortstop cutoff to keep the runner from taking third." },
      "CF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["FIELD", "COVER"], "distractorPoolLow": ["HOLD"],
              "explanation": "Sprint behind left fielder in case the ball gets by." },
      "RF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["HOLD", "COVER"], "distractorPoolLow": ["FIELD"],
              "explanation": "Move in behind second base for an overthrow." },
      "SS": { "primaryIntent": "CUTOFF", "distractorPoolHigh": ["COVER", "BACKUP"], "distractorPoolLow": ["FIELD"],
              "explanation": "Line up between left field and third base as the cutoff." },
      "3B": { "primaryIntent": "COVER", "distractorPoolHigh": ["CUTOFF", "BACKUP"], "distractorPoolLow": ["HOLD"],
              "explanation": "Get to the bag at third; the lead runner is heading your way." },
      "2B": { "primaryIntent": "COVER", "distractorPoolHigh": ["CUTOFF", "BACKUP"], "distractorPoolLow": ["HOLD"],
              "explanation": "Cover second for the batter-runner." },
      "1B": { "primaryIntent": "COVER", "distractorPoolHigh": ["BACKUP", "HOLD"], "distractorPoolLow": ["CUTOFF"],
              "explanation": "Make sure the batter touches first, then trail to the bag." },
      "P":  { "primaryIntent": "BACKUP", "distractorPoolHigh": ["COVER", "HOLD"], "distractorPoolLow": ["CUTOFF"],
              "explanation": "Back up third base in line with the throw." },
      "C":  { "primaryIntent": "COVER", "distractorPoolHigh": ["BACKUP", "HOLD"], "distractorPoolLow": ["CUTOFF"],
              "explanation": "Stay home and protect the plate." }
    },
    "roleGroups": {
      "ballSide": ["LF", "CF"],
      "infieldCore": ["SS", "2B"],
      "coverage": ["3B", "1B", "C"],
      "backups": ["P", "RF", "CF"]
    },
    "promptPlan": { "recommendedRoles": ["SS"], "difficulty": "beginner" }
  },
  {
    "id": "bunt-1b-line-runner-1b",
    "title": "Bunt down the first-base line, runner on first",
    "category": "bunt",
    "situation": { "runners": { "on1": true, "on2": false, "on3": false }, "ballZone": "BUNT_1B" },
    "roles": {
      "1B": { "primaryIntent": "FIELD", "fielderAction": "THROW_TO_BASE",
              "distractorPoolHigh": ["THROW_THROUGH_CUTOFF", "COVER"], "distractorPoolLow": ["HOLD_BALL"],
              "explanation": "Charge the bunt and take the sure out at first." },
      "P":  { "primaryIntent": "COVER", "distractorPoolHigh": ["FIELD", "BACKUP"], "distractorPoolLow": ["HOLD"],
              "explanation": "Break toward the line, then cover first if the first baseman fields it." },
      "2B": { "primaryIntent": "COVER", "distractorPoolHigh": ["BACKUP", "FIELD"], "distractorPoolLow": ["CUTOFF"],
              "explanation": "Cover first base for the throw." },
      "SS": { "primaryIntent": "COVER", "distractorPoolHigh": ["BACKUP", "CUTOFF"], "distractorPoolLow": ["HOLD"],
              "explanation": "Cover second for the lead runner." },
      "3B": { "primaryIntent": "COVER", "distractorPoolHigh": ["FIELD", "BACKUP"], "distractorPoolLow": ["HOLD"],
              "explanation": "Retreat to third; the lead runner may try to go two bases." },
      "C":  { "primaryIntent": "HOLD", "distractorPoolHigh": ["FIELD", "COVER"], "distractorPoolLow": ["BACKUP"],
              "explanation": "Call the play and stay home." },
      "RF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["COVER", "HOLD"], "distractorPoolLow": ["FIELD"],
              "explanation": "Back up first base behind the bag." },
      "CF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["COVER", "HOLD"], "distractorPoolLow": ["FIELD"],
              "explanation": "Back up second base." },
      "LF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["COVER", "HOLD"], "distractorPoolLow": ["CUTOFF"],
              "explanation": "Back up third base." }
    },
    "roleGroups": {
      "ballSide": ["1B", "P"],
      "infieldCore": ["2B", "SS"],
      "coverage": ["3B", "C"],
      "backups": ["RF", "CF", "LF"]
    },
    "promptPlan": { "recommendedRoles": ["2B"], "difficulty": "intermediate" }
  },
  {
    "id": "grounder-ss-empty",
    "title": "Ground ball to short, nobody on",
    "category": "other",
    "situation": { "runners": { "on1": false, "on2": false, "on3": false }, "ballZone": "INF_SS" },
    "roles": {
      "SS": { "primaryIntent": "FIELD", "fielderAction": "THROW_TO_BASE",
              "distractorPoolHigh": ["HOLD_BALL", "CUTOFF"], "distractorPoolLow": ["THROW_THROUGH_CUTOFF"],
              "explanation": "Field it and make the throw to first." },
      "1B": { "primaryIntent": "COVER", "distractorPoolHigh": ["FIELD", "BACKUP"], "distractorPoolLow": ["HOLD"],
              "explanation": "Get to the bag and give the shortstop a target." },
      "2B": { "primaryIntent": "COVER", "distractorPoolHigh": ["BACKUP", "FIELD"], "distractorPoolLow": ["HOLD"],
              "explanation": "Cover second in case the batter tries for two." },
      "3B": { "primaryIntent": "HOLD", "distractorPoolHigh": ["FIELD", "COVER"], "distractorPoolLow": ["BACKUP"],
              "explanation": "Hold your base; nobody is coming to third." },
      "C":  { "primaryIntent": "BACKUP", "distractorPoolHigh": ["HOLD", "COVER"], "distractorPoolLow": ["CUTOFF"],
              "explanation": "Run down the line to back up first." },
      "P":  { "primaryIntent": "HOLD", "distractorPoolHigh": ["FIELD", "BACKUP"], "distractorPoolLow": ["COVER"],
              "explanation": "Let the shortstop take it and stay out of the throwing lane." },
      "LF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["FIELD", "HOLD"], "distractorPoolLow": ["COVER"],
              "explanation": "Back up the shortstop in case it goes through." },
      "RF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["HOLD", "COVER"], "distractorPoolLow": ["FIELD"],
              "explanation": "Back up first base on the throw." }
    },
    "roleGroups": {
      "ballSide": ["SS", "LF"],
      "infieldCore": ["2B", "3B"],
      "coverage": ["1B"],
      "backups": ["C", "RF"]
    }
  },
  {
    "id": "double-rcf-gap-empty",
    "title": "Double to the right-center gap, nobody on",
    "category": "cutRelay",
    "situation": { "runners": { "on1": false, "on2": false, "on3": false }, "ballZone": "RCF_GAP" },
    "roles": {
      "RF": { "primaryIntent": "FIELD", "fielderAction": "THROW_THROUGH_CUTOFF",
              "distractorPoolHigh": ["THROW_TO_BASE"], "distractorPoolLow": ["HOLD_BALL"],
              "explanation": "Get to the ball and hit the second baseman relay." },
      "CF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["FIELD", "CUTOFF"], "distractorPoolLow": ["COVER"],
              "explanation": "Back up the right fielder in the gap." },
      "2B": { "primaryIntent": "CUTOFF", "distractorPoolHigh": ["COVER", "BACKUP"], "distractorPoolLow": ["FIELD"],
              "explanation": "Go out as the relay toward right-center." },
      "SS": { "primaryIntent": "COVER", "distractorPoolHigh": ["CUTOFF", "BACKUP"], "distractorPoolLow": ["HOLD"],
              "explanation": "Cover second base behind the relay." },
      "1B": { "primaryIntent": "COVER", "distractorPoolHigh": ["CUTOFF", "BACKUP"], "distractorPoolLow": ["HOLD"],
              "explanation": "Trail the runner to second, then return to cover first." },
      "3B": { "primaryIntent": "COVER", "distractorPoolHigh": ["BACKUP", "HOLD"], "distractorPoolLow": ["CUTOFF"],
              "explanation": "Cover third; the runner may try for a triple." },
      "C":  { "primaryIntent": "COVER", "distractorPoolHigh": ["BACKUP", "HOLD"], "distractorPoolLow": ["CUTOFF"],
              "explanation": "Stay home." },
      "P":  { "primaryIntent": "BACKUP", "distractorPoolHigh": ["COVER", "CUTOFF"], "distractorPoolLow": ["HOLD"],
              "explanation": "Back up third base." },
      "LF": { "primaryIntent": "BACKUP", "distractorPoolHigh": ["COVER", "HOLD"], "distractorPoolLow": ["FIELD"],
              "explanation": "Drift toward third to back up a throw there." }
    },
    "roleGroups": {
      "ballSide": ["RF", "CF"],
      "infieldCore": ["2B", "SS"],
      "coverage": ["3B", "1B", "C"],
      "backups": ["P", "LF"]
    },
    "promptPlan": { "recommendedRoles": ["2B"], "difficulty": "intermediate" }
  }
]"#;

/// Built-in scenario pool. Always non-empty unless the JSON above is broken.
pub fn seed_scenarios() -> Vec<Scenario> {
  match serde_json::from_str::<Vec<Value>>(SEED_SCENARIOS_JSON) {
    Ok(raw) => load_pool(raw, "seed"),
    Err(e) => {
      error!(target: "scenario", error = %e, "Built-in scenarios failed to parse");
      Vec::new()
    }
  }
}
