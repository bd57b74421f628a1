// src/ingest/providers/github_events.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::types::{Level, LogEntry, SourceProvider};

pub const GITHUB_EVENTS_URL: &str = "https://api.github.com/events";

#[derive(Debug, Deserialize)]
pub struct RawEvent {
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: Repo,
    pub actor: Actor,
}

#[derive(Debug, Deserialize)]
pub struct Repo {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// Public GitHub events firehose. Entries group by event type (PushEvent,
/// IssuesEvent, ...) with the originating repository and actor in the message.
pub struct GitHubEventsProvider {
    client: reqwest::Client,
    max_entries: usize,
}

impl GitHubEventsProvider {
    pub fn new(client: reqwest::Client, max_entries: usize) -> Self {
        Self {
            client,
            max_entries,
        }
    }

    /// Map the most recent `max_entries` events; always info-level.
    pub fn normalize(&self, raw: Value) -> Result<Vec<LogEntry>> {
        let events: Vec<RawEvent> =
            serde_json::from_value(raw).context("github events: unexpected response shape")?;

        let out = events
            .into_iter()
            .take(self.max_entries)
            .map(|ev| LogEntry {
                timestamp: ev.created_at.format("%H:%M:%S").to_string(),
                service: ev.kind,
                level: Level::Info,
                message: format!("[{}] {}", ev.repo.name, ev.actor.login),
                cause: None,
            })
            .collect();

        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for GitHubEventsProvider {
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        let resp = self
            .client
            .get(GITHUB_EVENTS_URL)
            .send()
            .await
            .context("github events: request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!(
                "GitHub API error: HTTP {}",
                resp.status().as_u16()
            ));
        }
        let raw: Value = resp
            .json()
            .await
            .context("github events: response was not JSON")?;

        let t0 = std::time::Instant::now();
        let out = self.normalize(raw)?;
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_events_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "github"
    }

    fn label(&self) -> String {
        "GitHub Public API".to_string()
    }
}
