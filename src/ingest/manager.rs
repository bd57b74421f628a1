// src/ingest/manager.rs
//! Maps free-form user input (a pasted URL) to one concrete source provider
//! and forwards fetches to whichever provider is currently connected.

use anyhow::Result;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Arc;

use crate::config::FetchConfig;
use crate::ingest::providers::{
    github_events::GitHubEventsProvider, reddit_rss::RedditRssProvider,
    synthetic::SyntheticProvider, wikipedia::WikipediaProvider,
};
use crate::ingest::types::{LogEntry, SourceProvider};

const DEFAULT_SUBREDDIT: &str = "technology";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Reddit,
    Wikipedia,
    GitHub,
    Synthetic,
}

type Predicate = fn(&str) -> bool;

/// Routing table, first match wins. The order is the dispatch priority:
/// discussion feed, then wiki, then forge events, then the demo feed (which
/// also answers the empty string).
static ROUTES: [(Predicate, SourceKind); 4] = [
    (|input| input.contains("reddit.com"), SourceKind::Reddit),
    (|input| input.contains("wikipedia.org"), SourceKind::Wikipedia),
    (|input| input.contains("github.com"), SourceKind::GitHub),
    (
        |input| input.contains("fakeprod") || input.is_empty(),
        SourceKind::Synthetic,
    ),
];

impl SourceKind {
    /// `None` means "unrecognized source"; the caller must branch explicitly,
    /// there is no silent fallback.
    pub fn detect(input: &str) -> Option<SourceKind> {
        ROUTES
            .iter()
            .find(|(matches, _)| matches(input))
            .map(|&(_, kind)| kind)
    }
}

fn subreddit_of(input: &str) -> &str {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"r/([^/]+)").expect("subreddit regex"));
    re.captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(DEFAULT_SUBREDDIT)
}

/// Owns the currently connected provider. A successful `connect` replaces the
/// provider and its label together; a failed one leaves both untouched.
pub struct SourceManager {
    client: reqwest::Client,
    fetch_cfg: FetchConfig,
    provider: Arc<dyn SourceProvider>,
}

impl SourceManager {
    /// Starts connected to the demo feed, like the dashboard does.
    pub fn new(client: reqwest::Client, fetch_cfg: FetchConfig) -> Self {
        let provider = Arc::new(SyntheticProvider::new(
            client.clone(),
            fetch_cfg.demo_feed_url.clone(),
        ));
        Self {
            client,
            fetch_cfg,
            provider,
        }
    }

    /// Route `input` to a provider. Returns the confirmation message on a
    /// recognized source and `None` otherwise, in which case the previously
    /// active provider stays connected.
    pub fn connect(&mut self, input: &str) -> Option<String> {
        let kind = SourceKind::detect(input)?;
        let (provider, ack): (Arc<dyn SourceProvider>, String) = match kind {
            SourceKind::Reddit => {
                let sub = subreddit_of(input);
                let provider =
                    RedditRssProvider::new(self.client.clone(), sub, self.fetch_cfg.max_entries);
                let ack = format!("Connected to r/{sub}.");
                (Arc::new(provider), ack)
            }
            SourceKind::Wikipedia => {
                let provider = WikipediaProvider::from_url(
                    self.client.clone(),
                    input,
                    self.fetch_cfg.max_entries,
                );
                let ack = format!("Connected to Wikipedia: {}", provider.title());
                (Arc::new(provider), ack)
            }
            SourceKind::GitHub => {
                let provider =
                    GitHubEventsProvider::new(self.client.clone(), self.fetch_cfg.max_entries);
                (Arc::new(provider), "Connected to GitHub public events.".to_string())
            }
            SourceKind::Synthetic => {
                let provider = SyntheticProvider::new(
                    self.client.clone(),
                    self.fetch_cfg.demo_feed_url.clone(),
                );
                (Arc::new(provider), "Connected to Demo System.".to_string())
            }
        };

        tracing::info!(source = provider.name(), label = %provider.label(), "source connected");
        self.provider = provider;
        Some(ack)
    }

    /// Handle to the active provider; cheap to clone so fetches can run
    /// without holding any lock on the manager.
    pub fn active(&self) -> Arc<dyn SourceProvider> {
        self.provider.clone()
    }

    pub fn current_source(&self) -> String {
        self.provider.label()
    }

    /// Forward a fetch to the currently connected provider.
    pub async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        self.provider.fetch_logs().await
    }
}
