//! Metrics collection from the V2Ray API.
//!
//! One poll cycle fetches `{base_url}/scrape` (service counters) and
//! `{base_url}/metrics` (Go runtime counters), parses both bodies into a
//! single flattened [`Snapshot`], and stamps it with the collection time.
//! Either fetch failing fails the whole cycle; a bad line only loses that
//! line.

use std::time::{Duration, Instant};

use tracing::debug;

use v2scope_common::exposition::{parse_line, parse_traffic_line};
use v2scope_common::{Snapshot, current_timestamp_millis};

/// Per-request timeout. The upstream dashboard had none and could hang on
/// a stalled endpoint.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a fetched snapshot is served from cache.
pub const CACHE_TTL: Duration = Duration::from_secs(1);

/// Error type for collection cycles. Any of these means the cycle yields
/// no snapshot; the poller carries on with the next cycle.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Fetches and parses one snapshot per call.
pub struct MetricsCollector {
    client: reqwest::Client,
}

impl MetricsCollector {
    /// Build a collector with a timeout-bounded HTTP client.
    pub fn new() -> Result<Self, CollectError> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Run one collection cycle against the configured base URL.
    ///
    /// Both endpoints must answer 200; otherwise no snapshot is produced
    /// for this cycle (never a partial one).
    pub async fn collect(&self, base_url: &str) -> Result<Snapshot, CollectError> {
        let scrape = self.fetch_text(&format!("{}/scrape", base_url)).await?;
        let runtime = self.fetch_text(&format!("{}/metrics", base_url)).await?;

        Ok(parse_bodies(&scrape, &runtime, current_timestamp_millis()))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, CollectError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(CollectError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.text().await?)
    }
}

/// Parse the two endpoint bodies into a flattened snapshot.
///
/// Scrape lines whose metric name contains "traffic" take the positional
/// traffic path; everything else (both bodies) takes the generic
/// labeled/plain path with all label values joined into the key. Lines
/// that fail to parse are skipped, the rest of the body is unaffected.
pub fn parse_bodies(scrape: &str, runtime: &str, timestamp: i64) -> Snapshot {
    let mut snapshot = Snapshot::new(timestamp);

    for line in metric_lines(scrape) {
        if metric_name(line).contains("traffic") {
            match parse_traffic_line(line) {
                Ok(sample) => snapshot.insert(sample.flattened_key(), sample.value),
                Err(e) => debug!(error = %e, line, "Skipping traffic line"),
            }
        } else {
            match parse_line(line) {
                Ok(sample) => snapshot.insert(sample.flattened_key(), sample.value),
                Err(e) => debug!(error = %e, line, "Skipping scrape line"),
            }
        }
    }

    for line in metric_lines(runtime) {
        match parse_line(line) {
            Ok(sample) => snapshot.insert(sample.flattened_key(), sample.value),
            Err(e) => debug!(error = %e, line, "Skipping runtime line"),
        }
    }

    snapshot
}

/// Non-comment, non-blank lines of an exposition body.
fn metric_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
}

/// The metric name: everything before the label set or the first space.
fn metric_name(line: &str) -> &str {
    let end = line
        .find(|c: char| c == '{' || c.is_whitespace())
        .unwrap_or(line.len());
    &line[..end]
}

/// Single-entry snapshot cache keyed by endpoint.
///
/// Several renders within the same tick reuse one fetched snapshot instead
/// of re-polling the service.
pub struct SnapshotCache {
    entry: Option<CacheEntry>,
    ttl: Duration,
}

struct CacheEntry {
    endpoint: String,
    fetched_at: Instant,
    snapshot: Snapshot,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    /// A cached snapshot for this endpoint, if one is still fresh.
    pub fn get(&self, endpoint: &str, now: Instant) -> Option<Snapshot> {
        self.entry
            .as_ref()
            .filter(|e| e.endpoint == endpoint && now.duration_since(e.fetched_at) < self.ttl)
            .map(|e| e.snapshot.clone())
    }

    pub fn put(&mut self, endpoint: &str, snapshot: Snapshot, now: Instant) {
        self.entry = Some(CacheEntry {
            endpoint: endpoint.to_string(),
            fetched_at: now,
            snapshot,
        });
    }
}

/// [`MetricsCollector`] fronted by the 1-second cache.
///
/// The keyed subscription runs one poller whose cycles are at least the
/// refresh interval (>= 1 s) apart, so under that wiring the cache never
/// hits. It guards the collector against a second caller in the same
/// tick, e.g. an on-demand refresh alongside the poller.
pub struct CachedCollector {
    collector: MetricsCollector,
    cache: SnapshotCache,
}

impl CachedCollector {
    pub fn new() -> Result<Self, CollectError> {
        Ok(Self {
            collector: MetricsCollector::new()?,
            cache: SnapshotCache::new(CACHE_TTL),
        })
    }

    /// Collect a snapshot, served from cache when the same endpoint was
    /// fetched within the TTL.
    pub async fn collect(&mut self, base_url: &str) -> Result<Snapshot, CollectError> {
        if let Some(snapshot) = self.cache.get(base_url, Instant::now()) {
            debug!(endpoint = base_url, "Serving cached snapshot");
            return Ok(snapshot);
        }

        let snapshot = self.collector.collect(base_url).await?;
        self.cache
            .put(base_url, snapshot.clone(), Instant::now());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRAPE_BODY: &str = "\
# HELP v2ray_up Whether the V2Ray server is up.
v2ray_up 1
v2ray_uptime_seconds 3600
v2ray_broken{oops 1
v2ray_traffic_uplink_bytes_total{dimension=\"inbound\",target=\"api\"} 12345
";

    const RUNTIME_BODY: &str = "\
# TYPE go_goroutines gauge
go_goroutines 25

go_threads 14
";

    #[test]
    fn test_parse_bodies_end_to_end() {
        let snapshot = parse_bodies(SCRAPE_BODY, RUNTIME_BODY, 42_000);

        // 3 valid scrape lines + 2 runtime lines; the malformed line
        // contributes nothing.
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.timestamp, 42_000);
        assert_eq!(snapshot.get("v2ray_up"), Some(1.0));
        assert_eq!(snapshot.get("v2ray_uptime_seconds"), Some(3600.0));
        assert_eq!(
            snapshot.get("v2ray_traffic_uplink_bytes_total_inbound_api"),
            Some(12345.0)
        );
        assert_eq!(snapshot.get("go_goroutines"), Some(25.0));
        assert_eq!(snapshot.get("go_threads"), Some(14.0));
    }

    #[test]
    fn test_malformed_line_does_not_abort_later_lines() {
        // The malformed line sits before a valid one in SCRAPE_BODY; the
        // traffic line after it still parses.
        let snapshot = parse_bodies(SCRAPE_BODY, "", 0);
        assert!(
            snapshot
                .get("v2ray_traffic_uplink_bytes_total_inbound_api")
                .is_some()
        );
        assert!(snapshot.get("v2ray_broken{oops").is_none());
    }

    #[test]
    fn test_runtime_labeled_lines_join_all_label_values() {
        let runtime = "go_gc_duration_seconds{quantile=\"0.25\"} 0.001\n";
        let snapshot = parse_bodies("", runtime, 0);
        assert_eq!(snapshot.get("go_gc_duration_seconds_0.25"), Some(0.001));
    }

    #[test]
    fn test_traffic_routing_is_by_metric_name() {
        // "traffic" inside a label value must not trigger the traffic path.
        let scrape = "v2ray_up{note=\"traffic\"} 1\n";
        let snapshot = parse_bodies(scrape, "", 0);
        assert_eq!(snapshot.get("v2ray_up_traffic"), Some(1.0));
    }

    #[test]
    fn test_cache_hit_within_ttl() {
        let mut cache = SnapshotCache::new(Duration::from_secs(1));
        let now = Instant::now();

        cache.put("http://a:9550", Snapshot::new(1), now);
        assert!(cache.get("http://a:9550", now).is_some());
        assert!(
            cache
                .get("http://a:9550", now + Duration::from_millis(500))
                .is_some()
        );
    }

    #[test]
    fn test_cache_expires_after_ttl() {
        let mut cache = SnapshotCache::new(Duration::from_secs(1));
        let now = Instant::now();

        cache.put("http://a:9550", Snapshot::new(1), now);
        assert!(cache.get("http://a:9550", now + Duration::from_secs(2)).is_none());
    }

    #[test]
    fn test_cache_keyed_by_endpoint() {
        let mut cache = SnapshotCache::new(Duration::from_secs(1));
        let now = Instant::now();

        cache.put("http://a:9550", Snapshot::new(1), now);
        assert!(cache.get("http://b:9550", now).is_none());
    }
}
