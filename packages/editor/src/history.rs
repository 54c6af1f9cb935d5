//! # Snapshot History
//!
//! A bounded, persisted log of full-document snapshots.
//!
//! ## Design
//!
//! - Entries are appended oldest-first and stored as one JSON array
//! - Once the log exceeds its capacity the oldest entries are dropped
//! - The cap is global, not per template
//! - Restore hands the stored html back; loading it is up to the caller
//! - Auto-snapshots fire on a fixed period whether or not anything changed

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::storage::KeyValueStore;

/// One stored snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Milliseconds since the Unix epoch
    #[serde(rename = "t")]
    pub timestamp: i64,

    #[serde(rename = "name")]
    pub label: String,

    /// Outer html of the document element, without a doctype
    pub html: String,
}

/// Bounded snapshot log over a key-value store
#[derive(Debug)]
pub struct HistoryManager<S: KeyValueStore> {
    store: S,
    key: String,
    auto_key: String,
    capacity: usize,
}

impl<S: KeyValueStore> HistoryManager<S> {
    pub fn new(store: S, config: &EditorConfig) -> Self {
        Self {
            store,
            key: config.history_key.clone(),
            auto_key: config.history_auto_key.clone(),
            capacity: config.history_capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All entries, oldest first. Unreadable storage lists as empty.
    pub fn list(&self) -> Vec<HistoryEntry> {
        match self.store.get(&self.key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "History storage corrupt");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "History storage unreadable");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the newest entry
    pub fn latest_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Append a snapshot stamped with the current time
    pub fn snapshot(&self, label: &str, html: &str) -> usize {
        self.snapshot_at(chrono::Utc::now().timestamp_millis(), label, html)
    }

    /// Append a snapshot with an explicit timestamp. Returns the index of the
    /// new entry after eviction.
    pub fn snapshot_at(&self, timestamp: i64, label: &str, html: &str) -> usize {
        let mut entries = self.list();
        entries.push(HistoryEntry {
            timestamp,
            label: label.to_string(),
            html: html.to_string(),
        });
        if entries.len() > self.capacity {
            let overflow = entries.len() - self.capacity;
            entries.drain(..overflow);
            debug!(dropped = overflow, "Evicted oldest snapshots");
        }
        self.persist(&entries);
        info!(label = %label, count = entries.len(), "Took snapshot");
        entries.len() - 1
    }

    /// Stored html at `index`
    pub fn restore(&self, index: usize) -> Result<String, EditorError> {
        let entries = self.list();
        let len = entries.len();
        entries
            .into_iter()
            .nth(index)
            .map(|entry| entry.html)
            .ok_or(EditorError::OutOfRange { index, len })
    }

    /// Remove a single entry, keeping the order of the rest
    pub fn delete(&self, index: usize) -> Result<HistoryEntry, EditorError> {
        let mut entries = self.list();
        if index >= entries.len() {
            return Err(EditorError::OutOfRange {
                index,
                len: entries.len(),
            });
        }
        let removed = entries.remove(index);
        self.persist(&entries);
        info!(index, label = %removed.label, "Deleted snapshot");
        Ok(removed)
    }

    /// Persisted auto-snapshot preference
    pub fn auto_enabled(&self) -> bool {
        matches!(self.store.get(&self.auto_key), Ok(Some(v)) if v == "1")
    }

    pub fn set_auto_enabled(&self, enabled: bool) {
        let value = if enabled { "1" } else { "0" };
        if let Err(e) = self.store.set(&self.auto_key, value) {
            warn!(error = %e, "Failed to store auto-snapshot preference");
        }
    }

    fn persist(&self, entries: &[HistoryEntry]) {
        let encoded = match serde_json::to_string(entries) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Failed to encode history");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &encoded) {
            warn!(error = %e, "Failed to persist history");
        }
    }
}

/// A snapshot to record: `(label, html)`
pub type Capture = (String, String);

/// Periodic snapshot scheduler
#[derive(Debug, Clone)]
pub struct AutoSnapshot {
    period: Duration,
    last: Option<Instant>,
}

impl AutoSnapshot {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.auto_snapshot_period())
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// True once a full period has passed since the last snapshot
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.period,
            None => true,
        }
    }

    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Take a snapshot every period while the preference is enabled, until
    /// `shutdown` resolves. `capture` returns `None` when there is nothing
    /// to record (no document mounted).
    pub async fn run<S, F, Sd>(&mut self, history: &HistoryManager<S>, mut capture: F, shutdown: Sd)
    where
        S: KeyValueStore,
        F: FnMut() -> Option<Capture>,
        Sd: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                tick = interval.tick() => {
                    if !history.auto_enabled() || !self.is_due(tick) {
                        continue;
                    }
                    if let Some((label, html)) = capture() {
                        history.snapshot(&label, &html);
                        self.mark(tick);
                    }
                }
            }
        }
        debug!("Auto-snapshot stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn history() -> HistoryManager<MemoryStore> {
        HistoryManager::new(MemoryStore::new(), &EditorConfig::default())
    }

    #[test]
    fn test_capacity_keeps_most_recent() {
        let history = history();
        for i in 0..35 {
            history.snapshot_at(i, "doc", &format!("<p>{i}</p>"));
        }

        let entries = history.list();
        assert_eq!(entries.len(), 30);
        assert_eq!(entries[0].html, "<p>5</p>");
        assert_eq!(entries[29].html, "<p>34</p>");
        assert_eq!(history.latest_index(), Some(29));
    }

    #[test]
    fn test_restore_and_delete_out_of_range() {
        let history = history();
        history.snapshot_at(1, "a", "<p>a</p>");

        assert!(matches!(
            history.restore(1),
            Err(EditorError::OutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(history.delete(5), Err(EditorError::OutOfRange { .. })));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_delete_preserves_order() {
        let history = history();
        for label in ["a", "b", "c"] {
            history.snapshot_at(0, label, label);
        }

        let removed = history.delete(1).unwrap();
        assert_eq!(removed.label, "b");
        let labels: Vec<String> = history.list().into_iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["a", "c"]);
    }

    #[test]
    fn test_persisted_layout() {
        let backend = MemoryStore::new();
        let history = HistoryManager::new(&backend, &EditorConfig::default());
        history.snapshot_at(1_700_000_000_000, "Shoes", "<html></html>");

        let raw = backend.get("visual-editor-history").unwrap().unwrap();
        assert_eq!(raw, r#"[{"t":1700000000000,"name":"Shoes","html":"<html></html>"}]"#);
    }

    #[test]
    fn test_auto_preference() {
        let history = history();
        assert!(!history.auto_enabled());
        history.set_auto_enabled(true);
        assert!(history.auto_enabled());
        history.set_auto_enabled(false);
        assert!(!history.auto_enabled());
    }

    #[test]
    fn test_is_due() {
        let start = Instant::now();
        let mut auto = AutoSnapshot::new(Duration::from_secs(60));
        assert!(auto.is_due(start));

        auto.mark(start);
        assert!(!auto.is_due(start + Duration::from_secs(59)));
        assert!(auto.is_due(start + Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_snapshots_every_period() {
        let history = history();
        history.set_auto_enabled(true);
        let mut auto = AutoSnapshot::new(Duration::from_secs(60));

        let shutdown = tokio::time::sleep(Duration::from_secs(185));
        auto.run(
            &history,
            || Some(("doc".to_string(), "<p>same</p>".to_string())),
            shutdown,
        )
        .await;

        // Ticks at 60, 120 and 180 seconds, duplicates included
        assert_eq!(history.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_respects_preference() {
        let history = history();
        let mut auto = AutoSnapshot::new(Duration::from_secs(60));

        let shutdown = tokio::time::sleep(Duration::from_secs(130));
        auto.run(&history, || Some(("doc".to_string(), "<p/>".to_string())), shutdown)
            .await;

        assert!(history.is_empty());
    }
}
