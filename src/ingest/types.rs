// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a normalized log entry. Every entry carries exactly one of
/// these three; adapters coerce unknown or missing levels through
/// `crate::ingest::classify_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    Info,
}

impl Level {
    /// Case-insensitive parse of a source-supplied level string.
    /// Returns `None` for anything outside the three known values so the
    /// caller can fall back to the keyword heuristic.
    pub fn parse(s: &str) -> Option<Level> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Level::Error),
            "warn" | "warning" => Some(Level::Warn),
            "info" => Some(Level::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "ERROR"),
            Level::Warn => write!(f, "WARN"),
            Level::Info => write!(f, "INFO"),
        }
    }
}

/// Common normalized unit produced by every source adapter.
///
/// `timestamp` is clock time only (`HH:MM` or `HH:MM:SS`), source-local,
/// never a true instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub service: String,
    pub level: Level,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl LogEntry {
    /// Case-insensitive substring match across every field, used by the
    /// `/logs?filter=` surface.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        let hay = serde_json::to_string(self).unwrap_or_default();
        hay.to_lowercase().contains(&needle)
    }
}

/// One external data source: fetch raw payload from its endpoint, then pipe
/// it through the source-specific `normalize` step. Implementations reject on
/// non-2xx responses and on payloads that don't match the expected shape; no
/// retry happens at this layer.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>>;

    /// Stable identifier of the provider kind.
    fn name(&self) -> &'static str;

    /// Human-readable label of the connected source, e.g. "Reddit (r/rust)".
    fn label(&self) -> String;
}
