//! Bounded in-memory history of metric snapshots.

use crate::snapshot::Snapshot;

/// How long snapshots are retained, in milliseconds (30 minutes).
pub const RETENTION_WINDOW_MS: i64 = 30 * 60 * 1_000;

/// Append-only sequence of snapshots, ordered by timestamp ascending,
/// evicted by age only. Owned explicitly by the application and passed by
/// reference; `append`, `prune`, and `reset` are its only mutators.
#[derive(Debug, Default)]
pub struct HistoryStore {
    snapshots: Vec<Snapshot>,
}

impl HistoryStore {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot at the tail, then evict everything older than the
    /// retention window relative to the appended snapshot's timestamp.
    ///
    /// The collection clock is monotonic across cycles, so appending at the
    /// tail keeps the sequence timestamp-sorted.
    pub fn append(&mut self, snapshot: Snapshot) {
        let now = snapshot.timestamp;
        self.snapshots.push(snapshot);
        self.prune(now);
    }

    /// Remove every snapshot strictly older than `now − retention window`.
    /// A snapshot exactly at the cutoff stays. Relative order is preserved.
    pub fn prune(&mut self, now_ms: i64) {
        let cutoff = now_ms - RETENTION_WINDOW_MS;
        self.snapshots.retain(|s| s.timestamp >= cutoff);
    }

    /// Empty the history. Called when the configured metrics endpoint
    /// changes: a different source must not mix with prior data.
    pub fn reset(&mut self) {
        self.snapshots.clear();
    }

    /// All retained snapshots, oldest first.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// The most recently appended snapshot, if any.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Extract the time series for one flattened key, skipping snapshots
    /// that don't carry it.
    pub fn series(&self, key: &str) -> Vec<(i64, f64)> {
        self.snapshots
            .iter()
            .filter_map(|s| s.get(key).map(|v| (s.timestamp, v)))
            .collect()
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp: i64, key: &str, value: f64) -> Snapshot {
        let mut s = Snapshot::new(timestamp);
        s.insert(key.to_string(), value);
        s
    }

    #[test]
    fn test_first_append_initializes_history() {
        let mut history = HistoryStore::new();
        assert!(history.is_empty());

        history.append(snapshot(1_000, "v2ray_up", 1.0));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().timestamp, 1_000);
    }

    #[test]
    fn test_prune_removes_exactly_the_stale_snapshots() {
        let mut history = HistoryStore::new();
        let now = 10 * RETENTION_WINDOW_MS;

        history.append(snapshot(now - RETENTION_WINDOW_MS - 1, "m", 1.0));
        history.append(snapshot(now - RETENTION_WINDOW_MS, "m", 2.0)); // exactly at cutoff
        history.append(snapshot(now - 1_000, "m", 3.0));
        history.append(snapshot(now, "m", 4.0));

        // The append at `now` prunes with `now` as reference: the first
        // snapshot is older than the window, the one at the cutoff stays.
        let values: Vec<f64> = history.series("m").iter().map(|&(_, v)| v).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);

        // Order is untouched.
        let timestamps: Vec<i64> = history.snapshots().iter().map(|s| s.timestamp).collect();
        let mut sorted = timestamps.clone();
        sorted.sort();
        assert_eq!(timestamps, sorted);
    }

    #[test]
    fn test_no_pair_spans_more_than_the_window() {
        let mut history = HistoryStore::new();
        for i in 0..100 {
            history.append(snapshot(i * 60_000, "m", i as f64));
        }

        let newest = history.latest().unwrap().timestamp;
        for s in history.snapshots() {
            assert!(newest - s.timestamp <= RETENTION_WINDOW_MS);
        }
    }

    #[test]
    fn test_reset_empties_history() {
        let mut history = HistoryStore::new();
        history.append(snapshot(1_000, "m", 1.0));
        history.append(snapshot(2_000, "m", 2.0));

        history.reset();
        assert!(history.is_empty());
        assert!(history.latest().is_none());

        // Appending after a reset starts a fresh sequence.
        history.append(snapshot(3_000, "m", 3.0));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_series_skips_snapshots_without_the_key() {
        let mut history = HistoryStore::new();
        history.append(snapshot(1_000, "a", 1.0));
        history.append(snapshot(2_000, "b", 2.0));
        history.append(snapshot(3_000, "a", 3.0));

        assert_eq!(history.series("a"), vec![(1_000, 1.0), (3_000, 3.0)]);
        assert_eq!(history.series("b"), vec![(2_000, 2.0)]);
        assert!(history.series("c").is_empty());
    }
}
