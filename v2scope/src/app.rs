//! V2Scope Iced application.

use std::path::PathBuf;

use iced::{Element, Subscription, Task, Theme};

use v2scope_common::{DashboardConfig, HistoryStore, Snapshot, default_config_path};

use crate::message::Message;
use crate::subscription::{PollSettings, poll_subscription, tick_subscription};
use crate::view::chart::Series;
use crate::view::dashboard::{
    DashboardState, KEY_HEAP_ALLOC, KEY_HEAP_SYS, KEY_TRAFFIC_DOWNLINK, KEY_TRAFFIC_UPLINK,
    dashboard_view,
};

const SERIES_BLUE: iced::Color = iced::Color::from_rgb(0.2, 0.6, 1.0);
const SERIES_RED: iced::Color = iced::Color::from_rgb(0.95, 0.35, 0.3);

/// The main V2Scope application.
pub struct V2Scope {
    /// Active configuration.
    config: DashboardConfig,
    /// Where the configuration is persisted.
    config_path: PathBuf,
    /// Retained snapshots (30-minute window).
    history: HistoryStore,
    /// Dashboard view state.
    dashboard: DashboardState,
}

impl V2Scope {
    /// Boot the application (called by iced::application).
    pub fn boot() -> (Self, Task<Message>) {
        let config_path = default_config_path();
        let config = DashboardConfig::load_or_default(&config_path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            DashboardConfig::default()
        });

        tracing::info!(endpoint = %config.endpoint, "Watching metrics endpoint");

        let dashboard = DashboardState::new(&config);

        let app = Self {
            config,
            config_path,
            history: HistoryStore::new(),
            dashboard,
        };

        (app, Task::none())
    }

    /// Get the window title.
    pub fn title(&self) -> String {
        format!("V2Scope - {}", self.config.endpoint)
    }

    /// Handle incoming messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SnapshotCollected(snapshot) => {
                self.handle_snapshot(snapshot);
            }

            Message::CollectFailed(error) => {
                self.dashboard.available = false;
                self.dashboard.last_error = Some(error);
            }

            Message::Tick => {
                self.dashboard.memory_chart.update_time();
                self.dashboard.traffic_chart.update_time();
            }

            Message::EndpointInputChanged(input) => {
                self.dashboard.settings.set_endpoint_input(input);
            }

            Message::ApplyEndpoint => {
                self.apply_endpoint();
            }

            Message::AutoRefreshToggled(enabled) => {
                self.config.auto_refresh = enabled;
                self.dashboard.settings.auto_refresh = enabled;
                self.save_config();
            }

            Message::RefreshIntervalChanged(secs) => {
                self.dashboard.settings.set_refresh_interval(secs);
                self.config.refresh_interval_secs = self.dashboard.settings.refresh_interval_secs;
            }

            Message::SaveConfig => {
                self.save_config();
            }
        }

        Task::none()
    }

    /// Create the polling and tick subscriptions.
    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            poll_subscription(PollSettings {
                endpoint: self.config.endpoint.clone(),
                interval_secs: self.config.clamped_interval_secs(),
                auto_refresh: self.config.auto_refresh,
            }),
            tick_subscription(),
        ])
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        dashboard_view(&self.dashboard)
    }

    /// Get the application theme.
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Ingest a collected snapshot: retain it, refresh tiles and charts.
    fn handle_snapshot(&mut self, snapshot: Snapshot) {
        self.dashboard.available = true;
        self.dashboard.last_error = None;

        self.history.append(snapshot.clone());
        self.dashboard.latest = Some(snapshot);
        self.rebuild_charts();
    }

    /// Rebuild both chart series from the retained history.
    fn rebuild_charts(&mut self) {
        self.dashboard.memory_chart.set_series(vec![
            Series::new(
                "heap alloc",
                SERIES_BLUE,
                self.history.series(KEY_HEAP_ALLOC),
            ),
            Series::new("heap sys", SERIES_RED, self.history.series(KEY_HEAP_SYS)),
        ]);

        self.dashboard.traffic_chart.set_series(vec![
            Series::new(
                "uplink",
                SERIES_BLUE,
                self.history.series(KEY_TRAFFIC_UPLINK),
            ),
            Series::new(
                "downlink",
                SERIES_RED,
                self.history.series(KEY_TRAFFIC_DOWNLINK),
            ),
        ]);
    }

    /// Validate and apply a new endpoint. A genuinely different source
    /// clears the history so its data never mixes with the old one.
    fn apply_endpoint(&mut self) {
        match self.dashboard.settings.validate_endpoint() {
            Ok(endpoint) => {
                if endpoint != self.config.endpoint {
                    tracing::info!(endpoint = %endpoint, "Endpoint changed, clearing history");
                    self.config.endpoint = endpoint;
                    self.history.reset();
                    self.dashboard.latest = None;
                    self.dashboard.available = false;
                    self.dashboard.last_error = None;
                    self.dashboard.memory_chart.clear();
                    self.dashboard.traffic_chart.clear();
                }
                self.save_config();
            }
            Err(error) => {
                self.dashboard.settings.error = Some(error);
            }
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::warn!(error = %e, path = %self.config_path.display(), "Failed to save config");
        }
    }
}
