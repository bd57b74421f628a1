// src/analyze/mod.rs
//! # Analysis Engine
//! Pure, testable logic that maps a batch of normalized log entries to
//! per-service statistics, first-failure attribution, and an error timeline.
//! No I/O; recomputed from scratch on every call, never patched incrementally.

pub mod report;

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::ingest::types::{Level, LogEntry};

/// Tunables the engine inherited as magic numbers from the dashboard; kept
/// configurable because their original values were chosen for demo realism,
/// not measured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Error ratio above which a service is Critical rather than Degraded.
    pub critical_ratio: f64,
    /// Leading characters of the timestamp that form one timeline bucket
    /// (5 keeps `HH:MM`, i.e. one bucket per minute).
    pub bucket_prefix: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            critical_ratio: 0.1,
            bucket_prefix: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "Healthy"),
            HealthStatus::Degraded => write!(f, "Degraded"),
            HealthStatus::Critical => write!(f, "Critical"),
        }
    }
}

/// Per-service accumulator, recomputed fresh on every analysis run. `info`
/// counts info-level entries only; warns contribute to `total` alone.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub name: String,
    pub total: u64,
    pub errors: u64,
    pub info: u64,
    pub causes: BTreeSet<String>,
    pub status: HealthStatus,
}

impl ServiceStats {
    fn new(name: String) -> Self {
        Self {
            name,
            total: 0,
            errors: 0,
            info: 0,
            causes: BTreeSet::new(),
            status: HealthStatus::Healthy,
        }
    }

    pub fn error_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.errors as f64 / self.total as f64
        }
    }
}

/// Snapshot of the earliest error-level entry in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstFailure {
    pub service: String,
    pub time: String,
    /// The entry's composed message; the closest thing to a root-cause line
    /// the sources give us.
    pub cause: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Worst-affected services first: descending error count, with discovery
    /// order breaking ties. The ordering is a presentation contract.
    pub stats: Vec<ServiceStats>,
    pub first_failure: Option<FirstFailure>,
    /// Minute bucket -> error count, for the incident chart.
    pub timeline: BTreeMap<String, u64>,
}

/// Single pass over the entries. Services are discovered from the data
/// itself; there is no fixed registry. Degrades to an empty report on empty
/// input rather than failing.
pub fn analyze(logs: &[LogEntry], cfg: &AnalysisConfig) -> AnalysisReport {
    let mut discovery: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<ServiceStats> = Vec::new();
    let mut timeline: BTreeMap<String, u64> = BTreeMap::new();
    let mut first_failure: Option<FirstFailure> = None;

    for entry in logs {
        let idx = match discovery.get(entry.service.as_str()) {
            Some(&idx) => idx,
            None => {
                stats.push(ServiceStats::new(entry.service.clone()));
                discovery.insert(entry.service.as_str(), stats.len() - 1);
                stats.len() - 1
            }
        };
        let per_service = &mut stats[idx];
        per_service.total += 1;

        match entry.level {
            Level::Error => {
                per_service.errors += 1;
                if let Some(cause) = &entry.cause {
                    per_service.causes.insert(cause.clone());
                }

                let bucket: String = entry.timestamp.chars().take(cfg.bucket_prefix).collect();
                *timeline.entry(bucket).or_insert(0) += 1;

                if first_failure.is_none() {
                    first_failure = Some(FirstFailure {
                        service: entry.service.clone(),
                        time: entry.timestamp.clone(),
                        cause: entry.message.clone(),
                    });
                }
            }
            Level::Info => per_service.info += 1,
            Level::Warn => {}
        }
    }

    for per_service in &mut stats {
        per_service.status = if per_service.errors == 0 {
            HealthStatus::Healthy
        } else if per_service.error_ratio() > cfg.critical_ratio {
            HealthStatus::Critical
        } else {
            HealthStatus::Degraded
        };
    }

    // Stable sort: ties keep discovery order.
    stats.sort_by(|a, b| b.errors.cmp(&a.errors));

    counter!("analysis_runs_total").increment(1);

    AnalysisReport {
        stats,
        first_failure,
        timeline,
    }
}
