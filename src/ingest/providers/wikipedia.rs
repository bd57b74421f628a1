// src/ingest/providers/wikipedia.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::ingest::types::{Level, LogEntry, SourceProvider};
use crate::ingest::truncate_chars;

pub const WIKI_API_URL: &str = "https://en.wikipedia.org/w/api.php";

const DEFAULT_TITLE: &str = "Main_Page";
const COMMENT_MAX_CHARS: usize = 80;

/// Page title segment of a wiki URL, e.g. `en.wikipedia.org/wiki/India` -> `India`.
pub fn page_title(url: &str) -> Option<&str> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"wiki/([^#?/]+)").expect("wiki title regex"));
    re.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}

#[derive(Debug, Deserialize)]
pub struct WikiResponse {
    #[serde(default)]
    pub query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
pub struct WikiQuery {
    #[serde(default)]
    pub pages: Option<HashMap<String, WikiPage>>,
}

#[derive(Debug, Deserialize)]
pub struct WikiPage {
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
pub struct Revision {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub comment: String,
}

/// Revision history of a Wikipedia page, read as an edit log.
pub struct WikipediaProvider {
    client: reqwest::Client,
    title: String,
    max_entries: usize,
}

impl WikipediaProvider {
    /// Extract the page title from the connect URL; a URL without a
    /// `/wiki/<title>` segment falls back to the main page.
    pub fn from_url(client: reqwest::Client, url: &str, max_entries: usize) -> Self {
        let title = page_title(url).unwrap_or(DEFAULT_TITLE).to_string();
        Self {
            client,
            title,
            max_entries,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn normalize(&self, raw: Value) -> Result<Vec<LogEntry>> {
        let parsed: WikiResponse =
            serde_json::from_value(raw).context("wiki api: unexpected response shape")?;
        let pages = parsed
            .query
            .and_then(|q| q.pages)
            .ok_or_else(|| anyhow!("wiki api: response missing query.pages"))?;

        // The API answers a missing page with the sentinel page id "-1".
        if pages.contains_key("-1") {
            return Err(anyhow!("wiki page {:?} not found", self.title));
        }
        let page = pages
            .into_values()
            .next()
            .ok_or_else(|| anyhow!("wiki api: empty page set"))?;

        let out = page
            .revisions
            .into_iter()
            .take(self.max_entries)
            .map(|rev| {
                let comment = if rev.comment.is_empty() {
                    "Minor edit".to_string()
                } else {
                    truncate_chars(&rev.comment, COMMENT_MAX_CHARS)
                };
                LogEntry {
                    timestamp: rev.timestamp.format("%H:%M:%S").to_string(),
                    service: "Wikipedia Edit".to_string(),
                    level: Level::Info,
                    message: format!("[User: {}] {}", rev.user, comment),
                    cause: None,
                }
            })
            .collect();

        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for WikipediaProvider {
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        let limit = self.max_entries.to_string();
        let resp = self
            .client
            .get(WIKI_API_URL)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "revisions"),
                ("titles", self.title.as_str()),
                ("rvprop", "timestamp|user|comment"),
                ("rvlimit", limit.as_str()),
                ("origin", "*"),
            ])
            .send()
            .await
            .context("wiki api: request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("Wiki API error: HTTP {}", resp.status().as_u16()));
        }
        let raw: Value = resp.json().await.context("wiki api: response was not JSON")?;

        let t0 = std::time::Instant::now();
        let out = self.normalize(raw)?;
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_events_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn label(&self) -> String {
        format!("Wiki: {}", self.title)
    }
}
