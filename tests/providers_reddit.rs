// tests/providers_reddit.rs

use serde_json::{json, Value};

use whylayer::ingest::providers::reddit_rss::RedditRssProvider;
use whylayer::ingest::types::Level;

fn provider(sub: &str) -> RedditRssProvider {
    RedditRssProvider::new(reqwest::Client::new(), sub, 30)
}

fn fixture() -> Value {
    let raw = std::fs::read_to_string("tests/fixtures/reddit_bridge.json")
        .expect("missing tests/fixtures/reddit_bridge.json");
    serde_json::from_str(&raw).expect("fixture is valid JSON")
}

#[test]
fn items_map_to_info_entries_with_clock_timestamps() {
    let logs = provider("rust").normalize(fixture()).expect("normalize ok");

    assert_eq!(logs.len(), 2);
    for entry in &logs {
        assert_eq!(entry.level, Level::Info);
        assert_eq!(entry.cause, None);
    }
    assert_eq!(logs[0].timestamp, "10:20:30");
    assert_eq!(logs[1].timestamp, "10:18:05");
}

#[test]
fn service_is_first_title_word_sanitized_to_alphanumerics() {
    let logs = provider("rust").normalize(fixture()).expect("normalize ok");

    assert_eq!(logs[0].service, "Announcing");
    // "?!?" sanitizes to nothing, so the subreddit fallback kicks in.
    assert_eq!(logs[1].service, "r/rust");
}

#[test]
fn message_embeds_author_and_truncated_decoded_title() {
    let logs = provider("rust").normalize(fixture()).expect("normalize ok");

    assert!(logs[0].message.starts_with("[/u/steve] "));
    // "&amp;" decoded before truncation, and the tail is elided.
    assert!(logs[0].message.contains("Rust 1.90 &"));
    assert!(logs[0].message.ends_with("..."));
}

#[test]
fn bridge_error_status_is_rejected() {
    let err = provider("rust")
        .normalize(json!({"status": "error", "message": "rss_url is invalid"}))
        .expect_err("bridge error status must reject");
    assert!(err.to_string().contains("invalid response"), "got: {err:#}");
}

#[test]
fn missing_items_are_rejected() {
    let err = provider("rust")
        .normalize(json!({"status": "ok"}))
        .expect_err("missing items must reject");
    assert!(err.to_string().contains("invalid response"), "got: {err:#}");
}
