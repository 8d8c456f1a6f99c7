//! Point-in-time snapshot of parsed metrics.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// One poll cycle's worth of metrics: flattened key → value, stamped with
/// the collection time. Immutable once built; history eviction is the only
/// way a snapshot goes away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unix epoch milliseconds when the metrics were collected.
    pub timestamp: i64,

    /// Flattened metric key → parsed value.
    pub values: HashMap<String, f64>,
}

impl Snapshot {
    /// Create an empty snapshot stamped with the given collection time.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            values: HashMap::new(),
        }
    }

    /// Look up a metric by its flattened key.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Insert a metric value. A colliding key within one poll is
    /// last-write-wins.
    pub fn insert(&mut self, key: String, value: f64) {
        self.values.insert(key, value);
    }

    /// Number of metric keys (the timestamp is not a key).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot holds no metrics.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
///
/// Returns 0 if system time is before Unix epoch (should never happen in
/// practice).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_last_write_wins() {
        let mut snapshot = Snapshot::new(1_000);
        snapshot.insert("v2ray_up".to_string(), 0.0);
        snapshot.insert("v2ray_up".to_string(), 1.0);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("v2ray_up"), Some(1.0));
    }

    #[test]
    fn test_snapshot_missing_key() {
        let snapshot = Snapshot::new(1_000);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.get("nope"), None);
    }
}
