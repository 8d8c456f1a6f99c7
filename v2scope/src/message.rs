use v2scope_common::Snapshot;

/// Messages for the V2Scope application.
#[derive(Debug, Clone)]
pub enum Message {
    /// A poll cycle produced a snapshot.
    SnapshotCollected(Snapshot),

    /// A poll cycle failed (endpoint down, non-200, timeout).
    CollectFailed(String),

    /// Tick for periodic UI updates (chart time advancement).
    Tick,

    // Settings messages
    /// User edited the endpoint text input.
    EndpointInputChanged(String),

    /// User pressed the Apply button for the staged endpoint.
    ApplyEndpoint,

    /// User toggled auto-refresh.
    AutoRefreshToggled(bool),

    /// User moved the refresh-interval slider.
    RefreshIntervalChanged(f64),

    /// Persist the configuration (slider release).
    SaveConfig,
}
