use std::time::Duration;

use iced::Subscription;

use crate::collector::CachedCollector;
use crate::message::Message;

/// What the polling subscription is keyed on. Changing any field (an
/// endpoint edit, a new interval) tears the poller down and starts a
/// fresh one, so there is never more than one cycle in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollSettings {
    /// Base URL of the metrics API.
    pub endpoint: String,
    /// Seconds between cycles.
    pub interval_secs: u64,
    /// When false, run exactly one cycle and stop.
    pub auto_refresh: bool,
}

/// Create a subscription that polls the metrics endpoints.
///
/// Each cycle yields either a snapshot or a failure message; failures
/// never end the loop. The sleep between cycles is the only suspension
/// point besides the fetches themselves.
pub fn poll_subscription(settings: PollSettings) -> Subscription<Message> {
    Subscription::run_with(settings, move |settings| {
        let settings = settings.clone();
        async_stream::stream! {
            let mut collector = match CachedCollector::new() {
                Ok(collector) => collector,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build HTTP client");
                    yield Message::CollectFailed(e.to_string());
                    return;
                }
            };

            loop {
                match collector.collect(&settings.endpoint).await {
                    Ok(snapshot) => {
                        tracing::debug!(
                            endpoint = %settings.endpoint,
                            metrics = snapshot.len(),
                            "Collected snapshot"
                        );
                        yield Message::SnapshotCollected(snapshot);
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            endpoint = %settings.endpoint,
                            "Collection failed"
                        );
                        yield Message::CollectFailed(e.to_string());
                    }
                }

                if !settings.auto_refresh {
                    return;
                }

                tokio::time::sleep(Duration::from_secs(settings.interval_secs)).await;
            }
        }
    })
}

/// Create a tick subscription for periodic UI updates.
pub fn tick_subscription() -> Subscription<Message> {
    iced::time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}
