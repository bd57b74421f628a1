// src/store.rs
//! # Log Store
//! Shared "last fetched logs" slot. Fetches are replace-not-merge: whatever
//! commits last wins, except that a late response from an *older* fetch must
//! never clobber data a newer fetch already landed. Writers take a monotonic
//! ticket before starting their request and present it at commit time.

use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::ingest::types::LogEntry;

/// Read-side view of the slot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub source: String,
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Default)]
struct Slot {
    applied: u64,
    source: String,
    logs: Vec<LogEntry>,
}

#[derive(Debug, Default)]
pub struct LogStore {
    next_ticket: AtomicU64,
    inner: RwLock<Slot>,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a place in the fetch order. Tickets are handed out before the
    /// request is sent, so resolution order can differ from issue order.
    pub fn begin_fetch(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a fetch result. Returns `false` (and drops the batch) when a
    /// commit with a newer ticket already happened.
    pub fn commit(&self, ticket: u64, source: String, logs: Vec<LogEntry>) -> bool {
        let mut slot = self.inner.write().expect("log store lock poisoned");
        if ticket <= slot.applied {
            counter!("stale_commits_dropped_total").increment(1);
            tracing::warn!(
                ticket,
                applied = slot.applied,
                "stale fetch result dropped"
            );
            return false;
        }
        slot.applied = ticket;
        slot.source = source;
        slot.logs = logs;
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        let slot = self.inner.read().expect("log store lock poisoned");
        Snapshot {
            source: slot.source.clone(),
            logs: slot.logs.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .expect("log store lock poisoned")
            .logs
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Level;

    fn batch(tag: &str) -> Vec<LogEntry> {
        vec![LogEntry {
            timestamp: "12:00".to_string(),
            service: tag.to_string(),
            level: Level::Info,
            message: format!("[{tag}] ok"),
            cause: None,
        }]
    }

    #[test]
    fn commits_in_order_replace_state() {
        let store = LogStore::new();
        let t1 = store.begin_fetch();
        let t2 = store.begin_fetch();
        assert!(store.commit(t1, "first".into(), batch("first")));
        assert!(store.commit(t2, "second".into(), batch("second")));
        assert_eq!(store.snapshot().source, "second");
    }

    #[test]
    fn out_of_order_resolution_cannot_clobber_newer_data() {
        let store = LogStore::new();
        let older = store.begin_fetch();
        let newer = store.begin_fetch();

        // The newer request resolves first.
        assert!(store.commit(newer, "newer".into(), batch("newer")));
        // The older one limps in afterwards and must be dropped.
        assert!(!store.commit(older, "older".into(), batch("older")));

        let snap = store.snapshot();
        assert_eq!(snap.source, "newer");
        assert_eq!(snap.logs[0].service, "newer");
    }

    #[test]
    fn empty_until_first_commit() {
        let store = LogStore::new();
        assert!(store.is_empty());
        let t = store.begin_fetch();
        store.commit(t, "demo".into(), batch("demo"));
        assert!(!store.is_empty());
    }
}
