// src/analyze/report.rs
//! Incident-report wording derived from an analysis run: the headline and
//! root-cause lines the dashboard shows, plus a short timeline of the first
//! error entries.

use serde::Serialize;

use crate::analyze::AnalysisReport;
use crate::ingest::types::{Level, LogEntry};

/// How many error entries make it into the incident timeline.
pub const MAX_TIMELINE_EVENTS: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    pub time: String,
    pub title: String,
    pub level: Level,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidentSummary {
    pub headline: String,
    pub root_cause: String,
    pub timeline: Vec<TimelineEvent>,
}

/// Attribute the outage to the first failing service when there is one,
/// fall back to generic wording when the batch carries no errors.
pub fn summarize(report: &AnalysisReport, logs: &[LogEntry]) -> IncidentSummary {
    let headline = match &report.first_failure {
        Some(first) => format!(
            "System outage triggered by {}. High error rates detected across multiple services.",
            first.service
        ),
        None => "Intermittent stability issues detected in system logs.".to_string(),
    };

    let root_cause = report
        .first_failure
        .as_ref()
        .map(|first| first.cause.clone())
        .unwrap_or_else(|| "Unknown / distributed tracing incomplete".to_string());

    let timeline = logs
        .iter()
        .filter(|entry| entry.level == Level::Error)
        .take(MAX_TIMELINE_EVENTS)
        .map(|entry| TimelineEvent {
            time: entry.timestamp.clone(),
            title: entry.message.clone(),
            level: entry.level,
        })
        .collect();

    IncidentSummary {
        headline,
        root_cause,
        timeline,
    }
}
