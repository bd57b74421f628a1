// src/ingest/providers/synthetic.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::types::{Level, LogEntry, SourceProvider};
use crate::ingest::{classify_level, NORMAL_OPERATION};

pub const DEMO_FEED_URL: &str = "https://fakeprod.vercel.app/logs.json";

/// One raw event as the demo production feed emits it. In the object-keyed
/// payload form `service` is absent and injected from the enclosing key.
#[derive(Debug, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    pub event: String,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

/// Synthetic production log feed. Accepts either an object keyed by service
/// name (values = arrays of raw events) or a flat array of events.
pub struct SyntheticProvider {
    client: reqwest::Client,
    url: String,
}

impl SyntheticProvider {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Flatten the payload to a uniform event list and map every event to a
    /// `LogEntry`. Explicit levels pass through; anything else goes through
    /// the keyword heuristic.
    pub fn normalize(&self, raw: Value) -> Result<Vec<LogEntry>> {
        let mut flat: Vec<RawEvent> = Vec::new();

        match raw {
            Value::Object(map) => {
                for (service, events) in map {
                    let mut events: Vec<RawEvent> = serde_json::from_value(events)
                        .with_context(|| {
                            format!("demo feed: events for service {service:?} have an unexpected shape")
                        })?;
                    for ev in &mut events {
                        // The enclosing key wins over anything inline.
                        ev.service = Some(service.clone());
                    }
                    flat.append(&mut events);
                }
            }
            raw @ Value::Array(_) => {
                flat = serde_json::from_value(raw)
                    .context("demo feed: event array has an unexpected shape")?;
            }
            other => {
                return Err(anyhow!(
                    "demo feed: expected an object keyed by service or an event array, got {other}"
                ))
            }
        }

        let out = flat
            .into_iter()
            .map(|ev| {
                let service = ev.service.unwrap_or_else(|| "Unknown".to_string());
                let level = ev
                    .level
                    .as_deref()
                    .and_then(Level::parse)
                    .unwrap_or_else(|| classify_level(&ev.event, ev.cause.as_deref()));
                let cause = ev.cause.filter(|c| c != NORMAL_OPERATION);

                let mut message = format!("[{service}] {}", ev.event);
                if let Some(c) = &cause {
                    message.push_str(" - ");
                    message.push_str(c);
                }

                LogEntry {
                    timestamp: ev.time.or(ev.timestamp).unwrap_or_default(),
                    service,
                    level,
                    message,
                    cause,
                }
            })
            .collect();

        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for SyntheticProvider {
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("demo feed: request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("demo feed error: HTTP {}", resp.status().as_u16()));
        }
        let raw: Value = resp.json().await.context("demo feed: response was not JSON")?;

        let t0 = std::time::Instant::now();
        let out = self.normalize(raw)?;
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_events_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn label(&self) -> String {
        "Demo System".to_string()
    }
}
