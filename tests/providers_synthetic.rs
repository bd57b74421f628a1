// tests/providers_synthetic.rs
//
// Normalization of the demo production feed, driven by fixtures so no
// network is involved.

use serde_json::Value;

use whylayer::ingest::providers::synthetic::{SyntheticProvider, DEMO_FEED_URL};
use whylayer::ingest::types::Level;

fn provider() -> SyntheticProvider {
    SyntheticProvider::new(reqwest::Client::new(), DEMO_FEED_URL)
}

fn fixture(name: &str) -> Value {
    let raw = std::fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|_| panic!("missing tests/fixtures/{name}"));
    serde_json::from_str(&raw).expect("fixture is valid JSON")
}

#[test]
fn object_form_injects_service_from_key_for_every_entry() {
    let logs = provider()
        .normalize(fixture("demo_feed_by_service.json"))
        .expect("normalize ok");

    assert_eq!(logs.len(), 9);
    for entry in &logs {
        assert!(
            ["Database", "API Gateway", "Cards"].contains(&entry.service.as_str()),
            "unexpected service {:?}",
            entry.service
        );
    }
    assert_eq!(logs.iter().filter(|e| e.service == "Database").count(), 5);
    assert_eq!(logs.iter().filter(|e| e.service == "API Gateway").count(), 3);
}

#[test]
fn explicit_levels_pass_through() {
    let logs = provider()
        .normalize(fixture("demo_feed_by_service.json"))
        .expect("normalize ok");

    let latency = logs
        .iter()
        .find(|e| e.message.contains("High latency detected"))
        .expect("entry present");
    assert_eq!(latency.level, Level::Error);

    let scan = logs
        .iter()
        .find(|e| e.message.contains("Slow index scan"))
        .expect("entry present");
    assert_eq!(scan.level, Level::Warn);
}

#[test]
fn missing_level_falls_back_to_keyword_heuristic() {
    let logs = provider()
        .normalize(fixture("demo_feed_by_service.json"))
        .expect("normalize ok");

    // "Query timeout" has no level; "timeout" keyword marks it an error.
    let timeout = logs
        .iter()
        .find(|e| e.message.contains("Query timeout"))
        .expect("entry present");
    assert_eq!(timeout.level, Level::Error);

    // "502 Bad Gateway" trips the 502 marker.
    let gateway = logs
        .iter()
        .find(|e| e.message.contains("502 Bad Gateway"))
        .expect("entry present");
    assert_eq!(gateway.level, Level::Error);

    // "Background cleanup started" has no keywords and only the
    // "Normal operation" pseudo-cause: info.
    let cleanup = logs
        .iter()
        .find(|e| e.message.contains("Background cleanup started"))
        .expect("entry present");
    assert_eq!(cleanup.level, Level::Info);
    assert_eq!(cleanup.cause, None);
}

#[test]
fn message_embeds_service_event_and_real_cause() {
    let logs = provider()
        .normalize(fixture("demo_feed_by_service.json"))
        .expect("normalize ok");

    let latency = logs
        .iter()
        .find(|e| e.message.contains("High latency detected"))
        .expect("entry present");
    assert_eq!(
        latency.message,
        "[Database] High latency detected - Connection pool exhausted"
    );
    assert_eq!(latency.cause.as_deref(), Some("Connection pool exhausted"));

    // Null cause: no suffix.
    let idle = logs
        .iter()
        .find(|e| e.service == "Cards")
        .expect("entry present");
    assert_eq!(idle.message, "[Cards] Card service idle");
}

#[test]
fn flat_array_form_uses_inline_service() {
    let logs = provider()
        .normalize(fixture("demo_feed_flat.json"))
        .expect("normalize ok");

    assert_eq!(logs.len(), 5);
    assert_eq!(logs[0].service, "Database");
    assert_eq!(logs[0].level, Level::Error);
    assert_eq!(logs[1].service, "Storage");
    assert_eq!(logs[1].level, Level::Warn);

    // No level, real cause -> error by heuristic.
    assert_eq!(logs[2].service, "Analytics");
    assert_eq!(logs[2].level, Level::Error);

    // "Normal operation" cause normalizes away.
    assert_eq!(logs[3].level, Level::Info);
    assert_eq!(logs[3].cause, None);

    // Entry without a service gets the placeholder.
    assert_eq!(logs[4].service, "Unknown");
    assert_eq!(logs[4].level, Level::Info);
}

#[test]
fn scalar_payload_is_a_shape_error() {
    let err = provider()
        .normalize(Value::String("not a feed".into()))
        .expect_err("scalar payload must be rejected");
    assert!(err.to_string().contains("demo feed"), "got: {err:#}");
}
