// src/ingest/providers/reddit_rss.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::types::{Level, LogEntry, SourceProvider};
use crate::ingest::{clock_slice, truncate_chars};

/// Public RSS-to-JSON bridge. Reddit's own API blocks browser-style clients,
/// so the feed goes through rss2json like the dashboard always has.
pub const BRIDGE_URL: &str = "https://api.rss2json.com/v1/api.json";

const TITLE_MAX_CHARS: usize = 60;

#[derive(Debug, Deserialize)]
pub struct BridgeResponse {
    pub status: String,
    #[serde(default)]
    pub items: Option<Vec<BridgeItem>>,
}

#[derive(Debug, Deserialize)]
pub struct BridgeItem {
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
}

/// Subreddit discussion feed via the rss2json bridge.
pub struct RedditRssProvider {
    client: reqwest::Client,
    subreddit: String,
    max_entries: usize,
}

impl RedditRssProvider {
    pub fn new(client: reqwest::Client, subreddit: impl Into<String>, max_entries: usize) -> Self {
        Self {
            client,
            subreddit: subreddit.into(),
            max_entries,
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Derive `service` from the first word of the item title, sanitized to
    /// alphanumerics, falling back to the subreddit name.
    pub fn normalize(&self, raw: Value) -> Result<Vec<LogEntry>> {
        let parsed: BridgeResponse =
            serde_json::from_value(raw).context("rss bridge: unexpected response shape")?;

        let items = match (parsed.status.as_str(), parsed.items) {
            ("ok", Some(items)) => items,
            _ => return Err(anyhow!("rss bridge returned an invalid response")),
        };

        let out = items
            .into_iter()
            .take(self.max_entries)
            .map(|item| {
                let title = html_escape::decode_html_entities(&item.title).to_string();
                let service: String = title
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect();
                let service = if service.is_empty() {
                    format!("r/{}", self.subreddit)
                } else {
                    service
                };

                LogEntry {
                    timestamp: clock_slice(&item.pub_date),
                    service,
                    level: Level::Info,
                    message: format!(
                        "[{}] {}...",
                        item.author,
                        truncate_chars(&title, TITLE_MAX_CHARS)
                    ),
                    cause: None,
                }
            })
            .collect();

        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RedditRssProvider {
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        let rss_url = format!("https://www.reddit.com/r/{}/.rss", self.subreddit);
        let resp = self
            .client
            .get(BRIDGE_URL)
            .query(&[("rss_url", rss_url.as_str())])
            .send()
            .await
            .context("rss bridge: request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!(
                "RSS bridge error: HTTP {}",
                resp.status().as_u16()
            ));
        }
        let raw: Value = resp
            .json()
            .await
            .context("rss bridge: response was not JSON")?;

        let t0 = std::time::Instant::now();
        let out = self.normalize(raw)?;
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_events_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "reddit"
    }

    fn label(&self) -> String {
        format!("Reddit (r/{})", self.subreddit)
    }
}
