// src/ingest/mod.rs
pub mod manager;
pub mod providers;
pub mod types;

use crate::ingest::types::Level;
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// Cause string the demo feed uses for uneventful entries; it is noise, not a
/// root-cause hint, and normalizes to `None`.
pub const NORMAL_OPERATION: &str = "Normal operation";

/// Event keywords that mark an entry as an error when the source supplies no
/// explicit level.
const ERROR_MARKERS: [&str; 4] = ["fail", "error", "timeout", "502"];

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Total entries normalized from providers.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/shape errors."
        );
        describe_counter!(
            "analysis_runs_total",
            "Times the analysis engine ran over a log batch."
        );
        describe_counter!(
            "stale_commits_dropped_total",
            "Fetch results discarded because a newer fetch already landed."
        );
        describe_histogram!("ingest_parse_ms", "Provider normalize time in milliseconds.");
    });
}

/// Heuristic severity for raw events without an explicit level.
///
/// An entry is an error iff its event text contains a failure keyword
/// (`fail`, `error`, `timeout`, `502`, case-insensitive) or it carries a
/// cause other than "Normal operation"; everything else is info.
pub fn classify_level(event_text: &str, cause: Option<&str>) -> Level {
    let text = event_text.to_lowercase();
    let keyword_hit = ERROR_MARKERS.iter().any(|kw| text.contains(kw));
    let real_cause = cause.is_some_and(|c| c != NORMAL_OPERATION);
    if keyword_hit || real_cause {
        Level::Error
    } else {
        Level::Info
    }
}

/// Truncate to at most `max` characters, counting chars rather than bytes so
/// multi-byte feed titles can't split mid-codepoint.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Clock-time slice of an ISO-like timestamp string: characters 11..19, i.e.
/// the `HH:MM:SS` part of `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SSZ`.
pub fn clock_slice(ts: &str) -> String {
    ts.chars().skip(11).take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_classifies_errors() {
        for text in [
            "Upload fail on retry",
            "Internal ERROR in worker",
            "Query timeout",
            "502 Bad Gateway",
        ] {
            assert_eq!(classify_level(text, None), Level::Error, "text: {text}");
        }
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(classify_level("TIMEOUT upstream", None), Level::Error);
        assert_eq!(classify_level("Request Failed", None), Level::Error);
    }

    #[test]
    fn real_cause_forces_error_even_without_keywords() {
        assert_eq!(
            classify_level("High latency detected", Some("Connection pool exhausted")),
            Level::Error
        );
    }

    #[test]
    fn normal_operation_cause_is_not_a_root_cause_hint() {
        assert_eq!(
            classify_level("Analytics engine running", Some(NORMAL_OPERATION)),
            Level::Info
        );
        assert_eq!(classify_level("Background cleanup started", None), Level::Info);
    }

    #[test]
    fn clock_slice_takes_hhmmss() {
        assert_eq!(clock_slice("2024-06-01 12:34:56"), "12:34:56");
        assert_eq!(clock_slice("2024-06-01T12:34:56Z"), "12:34:56");
        assert_eq!(clock_slice("short"), "");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
