//! Minimal client for the hosted key-value store that serves scenarios.
//!
//! One call: `GET {base_url}/{namespace}` returning a JSON array of raw scenarios.
//! A single request timeout applies; retries are left to the caller.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::config::KvConfig;
use crate::util::trunc_for_log;

#[derive(Debug, thiserror::Error)]
pub enum KvError {
  #[error("kv request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("kv returned status {status}: {body}")]
  Status { status: u16, body: String },
  #[error("kv payload is not a JSON array")]
  NotAnArray,
}

#[derive(Clone)]
pub struct KvClient {
  http: reqwest::Client,
  pub base_url: String,
  pub namespace: String,
  token: Option<String>,
}

impl KvClient {
  pub fn new(cfg: &KvConfig) -> Result<Self, KvError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_millis(cfg.timeout_ms))
      .build()?;
    Ok(Self {
      http,
      base_url: cfg.base_url.trim_end_matches('/').to_string(),
      namespace: cfg.namespace.clone(),
      token: cfg.token.clone(),
    })
  }

  pub fn scenarios_url(&self) -> String {
    format!("{}/{}", self.base_url, self.namespace)
  }

  #[instrument(level = "info", skip(self), fields(url = %self.scenarios_url()))]
  pub async fn fetch_scenarios(&self) -> Result<Vec<Value>, KvError> {
    let started = std::time::Instant::now();
    let mut req = self
      .http
      .get(self.scenarios_url())
      .header(USER_AGENT, "fieldcall-backend/0.1");
    if let Some(t) = &self.token {
      req = req.header(AUTHORIZATION, format!("Bearer {}", t));
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      error!(target: "scenario", status = status.as_u16(), body = %trunc_for_log(&body, 300), "KV scenario fetch failed");
      return Err(KvError::Status { status: status.as_u16(), body: trunc_for_log(&body, 300) });
    }

    let payload: Value = resp.json().await?;
    let items = match payload {
      Value::Array(items) => items,
      _ => return Err(KvError::NotAnArray),
    };
    info!(target: "scenario", count = items.len(), elapsed_ms = started.elapsed().as_millis() as u64, "Fetched scenarios from KV");
    Ok(items)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_joins_base_and_namespace() {
    let cfg = KvConfig {
      base_url: "http://kv.local/".into(),
      namespace: "scenarios".into(),
      timeout_ms: 100,
      token: None,
    };
    let client = KvClient::new(&cfg).expect("client");
    assert_eq!(client.scenarios_url(), "http://kv.local/scenarios");
  }
}
