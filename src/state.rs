//! Application state: scenario cache, stats repository, live rounds and the KV client.
//!
//! This module owns:
//!   - the validated scenario pool (cached until `reload_scenarios`)
//!   - the injected stats repository (in-memory by default)
//!   - one `RoundSession` per live round, each behind its own mutex so a round's
//!     prompts are always resolved one at a time, in order
//!   - the optional KV client used to fetch scenarios

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, warn};

use crate::config::{load_config_from_env, read_scenario_file, AppConfig, GameConfig};
use crate::domain::{GameMode, Prompt, Scenario};
use crate::kv::KvClient;
use crate::round_state::RoundState;
use crate::seeds::seed_scenarios;
use crate::stats::{MemoryStats, StatsRepository};
use crate::validate::load_pool;

/// A round in progress. Prompts are resolved lazily, one per `next_prompt`.
pub struct RoundSession {
    pub id: String,
    pub mode: GameMode,
    pub prompts: Vec<Prompt>,
    /// Scenarios referenced by `prompts`, snapshotted at composition time.
    pub scenarios: HashMap<String, Scenario>,
    /// Index of the prompt currently shown (or next to show).
    pub cursor: usize,
    /// The prompt at `cursor` has been resolved and awaits an answer.
    pub pending: bool,
    pub score: u32,
    pub round_state: RoundState,
    pub rng: StdRng,
    /// Last start/next/answer on this round, epoch ms.
    pub last_touched_ms: u64,
}

impl RoundSession {
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.prompts.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub scenarios: Arc<RwLock<Vec<Scenario>>>,
    pub stats: Arc<RwLock<Box<dyn StatsRepository>>>,
    pub rounds: Arc<RwLock<HashMap<String, Arc<Mutex<RoundSession>>>>>,
    pub kv: Option<KvClient>,
    pub config: AppConfig,
    round_counter: Arc<AtomicU64>,
}

impl AppState {
    /// Build state from env: load config, file + seed scenarios, init KV client.
    /// KV scenarios arrive with the first `reload_scenarios` call.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::with_config(cfg, Box::new(MemoryStats::new()))
    }

    pub fn with_config(config: AppConfig, stats: Box<dyn StatsRepository>) -> Self {
        let kv = config.kv.as_ref().and_then(|k| match KvClient::new(k) {
            Ok(c) => {
                info!(target: "fieldcall_backend", base_url = %c.base_url, namespace = %c.namespace, "KV scenario store enabled.");
                Some(c)
            }
            Err(e) => {
                error!(target: "fieldcall_backend", error = %e, "Failed to build KV client; KV disabled.");
                None
            }
        });
        if kv.is_none() {
            info!(target: "fieldcall_backend", "KV scenario store disabled. Using file/seed scenarios.");
        }

        let pool = merge_pools(vec![local_file_pool(&config), seed_scenarios()]);
        info!(target: "scenario", count = pool.len(), "Startup scenario inventory");

        Self {
            scenarios: Arc::new(RwLock::new(pool)),
            stats: Arc::new(RwLock::new(stats)),
            rounds: Arc::new(RwLock::new(HashMap::new())),
            kv,
            config,
            round_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Drop the cached pool and load it again: KV first, then file, then seeds.
    /// Ids already present win over later sources.
    #[instrument(level = "info", skip(self))]
    pub async fn reload_scenarios(&self) -> usize {
        let mut sources = Vec::new();
        if let Some(kv) = &self.kv {
            match kv.fetch_scenarios().await {
                Ok(raw) => sources.push(load_pool(raw, "kv")),
                Err(e) => error!(target: "scenario", error = %e, "KV fetch failed; keeping local sources only"),
            }
        }
        sources.push(local_file_pool(&self.config));
        sources.push(seed_scenarios());

        let pool = merge_pools(sources);
        let count = pool.len();
        *self.scenarios.write().await = pool;
        info!(target: "scenario", count, "Scenario cache refreshed");
        count
    }

    /// Fresh RNG for a new round. With a configured seed, rounds are reproducible
    /// in creation order.
    pub fn round_rng(&self) -> StdRng {
        let n = self.round_counter.fetch_add(1, Ordering::Relaxed);
        match self.config.game.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_entropy(),
        }
    }

    /// Store a new round, first dropping expired rounds and, at the cap, the least
    /// recently touched ones.
    pub async fn insert_round(&self, session: RoundSession) {
        let id = session.id.clone();
        let now = session.last_touched_ms;
        let mut rounds = self.rounds.write().await;
        prune(&mut rounds, now, &self.config.game, 1);
        rounds.insert(id, Arc::new(Mutex::new(session)));
    }

    /// Drop rounds untouched past the TTL as of `now_ms`. Returns how many went.
    pub async fn prune_rounds(&self, now_ms: u64) -> usize {
        prune(&mut *self.rounds.write().await, now_ms, &self.config.game, 0)
    }

    pub async fn get_round(&self, id: &str) -> Option<Arc<Mutex<RoundSession>>> {
        self.rounds.read().await.get(id).cloned()
    }

    pub async fn remove_round(&self, id: &str) {
        if self.rounds.write().await.remove(id).is_none() {
            warn!(target: "round", %id, "Tried to remove unknown round");
        }
    }
}

/// Evict expired rounds, then the oldest until `incoming` more fit under the cap.
/// A round whose lock is held is in use and counts as freshly touched.
fn prune(rounds: &mut HashMap<String, Arc<Mutex<RoundSession>>>, now: u64, game: &GameConfig, incoming: usize) -> usize {
    let ttl_ms = game.round_ttl_secs.saturating_mul(1000);
    let mut touched: Vec<(u64, String)> = rounds
        .iter()
        .map(|(id, s)| {
            let at = s.try_lock().map(|g| g.last_touched_ms).unwrap_or(now);
            (at, id.clone())
        })
        .collect();
    touched.sort();

    let before = rounds.len();
    let mut expired = 0;
    for (at, id) in &touched {
        if now.saturating_sub(*at) > ttl_ms {
            rounds.remove(id);
            expired += 1;
        }
    }
    let cap = game.max_live_rounds.max(1);
    for (_, id) in touched.iter().skip(expired) {
        if rounds.len() + incoming <= cap {
            break;
        }
        rounds.remove(id);
    }

    let dropped = before - rounds.len();
    if dropped > 0 {
        info!(target: "round", dropped, expired, live = rounds.len(), "Pruned idle rounds");
    }
    dropped
}

fn local_file_pool(config: &AppConfig) -> Vec<Scenario> {
    match &config.scenarios.path {
        Some(path) => load_pool(read_scenario_file(path), "file"),
        None => Vec::new(),
    }
}

fn merge_pools(sources: Vec<Vec<Scenario>>) -> Vec<Scenario> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for s in sources.into_iter().flatten() {
        if seen.insert(s.id.clone()) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_scenario;

    #[test]
    fn earlier_sources_win_on_duplicate_ids() {
        let mut a = sample_scenario("same");
        a.title = "from kv".into();
        let b = sample_scenario("same");
        let c = sample_scenario("other");
        let merged = merge_pools(vec![vec![a], vec![b, c]]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "from kv");
    }

    #[test]
    fn seeded_config_gives_reproducible_round_rngs() {
        use rand::Rng;
        let mut cfg = AppConfig::default();
        cfg.game.seed = Some(10);
        let a = AppState::with_config(cfg.clone(), Box::new(MemoryStats::new()));
        let b = AppState::with_config(cfg, Box::new(MemoryStats::new()));
        let x: u64 = a.round_rng().gen();
        let y: u64 = b.round_rng().gen();
        assert_eq!(x, y);
    }

    #[tokio::test]
    async fn reload_without_kv_keeps_seed_pool() {
        let state = AppState::with_config(AppConfig::default(), Box::new(MemoryStats::new()));
        let n = state.reload_scenarios().await;
        assert_eq!(n, 4);
        assert_eq!(state.scenarios.read().await.len(), 4);
    }
}
