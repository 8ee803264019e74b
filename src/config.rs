//! Loading service configuration (game tuning + scenario sources) from TOML.
//!
//! Example:
//!
//! ```toml
//! [game]
//! seed = 42
//! weak_spot_count = 6
//! round_ttl_secs = 1800
//! max_live_rounds = 1000
//!
//! [scenarios]
//! path = "./data/scenarios.json"
//!
//! [kv]
//! base_url = "https://kv.example.com"
//! namespace = "scenarios"
//! timeout_ms = 4000
//! ```

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub game: GameConfig,
  #[serde(default)]
  pub scenarios: ScenarioFileConfig,
  #[serde(default)]
  pub kv: Option<KvConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GameConfig {
  /// Fixed RNG seed for every round (reproducible sessions). Random when unset.
  #[serde(default)] pub seed: Option<u64>,
  /// How many weak-spot records to request for weak-spot rounds.
  #[serde(default = "default_weak_spot_count")] pub weak_spot_count: usize,
  /// Rounds untouched for this long are dropped when a new round starts.
  #[serde(default = "default_round_ttl_secs")] pub round_ttl_secs: u64,
  /// Upper bound on live rounds; the least recently touched go first.
  #[serde(default = "default_max_live_rounds")] pub max_live_rounds: usize,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      seed: None,
      weak_spot_count: default_weak_spot_count(),
      round_ttl_secs: default_round_ttl_secs(),
      max_live_rounds: default_max_live_rounds(),
    }
  }
}

fn default_weak_spot_count() -> usize { 6 }
fn default_round_ttl_secs() -> u64 { 30 * 60 }
fn default_max_live_rounds() -> usize { 1000 }

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ScenarioFileConfig {
  /// JSON file holding an array of scenarios.
  #[serde(default)] pub path: Option<String>,
}

/// Hosted key-value store serving the scenario list.
#[derive(Clone, Debug, Deserialize)]
pub struct KvConfig {
  pub base_url: String,
  #[serde(default = "default_namespace")] pub namespace: String,
  #[serde(default = "default_timeout_ms")] pub timeout_ms: u64,
  /// Bearer token, if the store requires one.
  #[serde(default)] pub token: Option<String>,
}

fn default_namespace() -> String { "scenarios".into() }
fn default_timeout_ms() -> u64 { 4000 }

/// Attempt to load `AppConfig` from FIELDCALL_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("FIELDCALL_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "fieldcall_backend", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "fieldcall_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "fieldcall_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Read a JSON scenario file as raw values. Errors are logged and yield an empty list.
pub fn read_scenario_file(path: &str) -> Vec<Value> {
  let text = match std::fs::read_to_string(path) {
    Ok(t) => t,
    Err(e) => {
      error!(target: "scenario", %path, error = %e, "Failed to read scenario file");
      return Vec::new();
    }
  };
  match serde_json::from_str::<Vec<Value>>(&text) {
    Ok(v) => v,
    Err(e) => {
      error!(target: "scenario", %path, error = %e, "Scenario file is not a JSON array");
      Vec::new()
    }
  }
}
