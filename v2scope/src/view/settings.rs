//! Settings panel: endpoint, auto-refresh, refresh interval.

use iced::widget::{Column, button, checkbox, column, slider, text, text_input};
use iced::{Element, Theme};

use v2scope_common::config::{MAX_REFRESH_INTERVAL_SECS, MIN_REFRESH_INTERVAL_SECS};
use v2scope_common::{DashboardConfig, Snapshot};

use crate::message::Message;

/// Settings panel state. The endpoint input is staged until applied so a
/// half-typed URL never restarts the poller.
#[derive(Debug, Clone)]
pub struct SettingsState {
    /// Endpoint text input (staged, not yet applied).
    pub endpoint_input: String,
    /// Auto-refresh toggle.
    pub auto_refresh: bool,
    /// Refresh interval in seconds.
    pub refresh_interval_secs: u64,
    /// Validation error, if any.
    pub error: Option<String>,
}

impl SettingsState {
    /// Create settings from the loaded configuration.
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            endpoint_input: config.endpoint.clone(),
            auto_refresh: config.auto_refresh,
            refresh_interval_secs: config.clamped_interval_secs(),
            error: None,
        }
    }

    /// Update the staged endpoint input.
    pub fn set_endpoint_input(&mut self, input: String) {
        self.endpoint_input = input;
        self.error = None;
    }

    /// Validate the staged endpoint and return it normalized (trimmed,
    /// without a trailing slash).
    pub fn validate_endpoint(&self) -> Result<String, String> {
        let endpoint = self.endpoint_input.trim().trim_end_matches('/');

        if endpoint.is_empty() {
            return Err("Endpoint must not be empty".to_string());
        }

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(format!(
                "Endpoint must start with http:// or https://: {}",
                endpoint
            ));
        }

        Ok(endpoint.to_string())
    }

    /// Clamp and store a slider value.
    pub fn set_refresh_interval(&mut self, secs: f64) {
        self.refresh_interval_secs =
            (secs as u64).clamp(MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS);
    }
}

/// Render the settings panel.
pub fn settings_panel<'a>(
    state: &'a SettingsState,
    latest: Option<&'a Snapshot>,
) -> Element<'a, Message> {
    let title = text("Configuration").size(18);

    let endpoint_label = text("API endpoint").size(12);
    let endpoint_input = text_input("http://localhost:9550", &state.endpoint_input)
        .on_input(Message::EndpointInputChanged)
        .size(13);

    let apply_button = button(text("Apply").size(13))
        .on_press(Message::ApplyEndpoint)
        .style(iced::widget::button::primary);

    let auto_refresh = checkbox(state.auto_refresh)
        .label("Auto refresh")
        .on_toggle(Message::AutoRefreshToggled)
        .size(16)
        .text_size(13);

    let interval_label = text(format!(
        "Refresh interval: {}s",
        state.refresh_interval_secs
    ))
    .size(12);

    let interval_slider = slider(
        MIN_REFRESH_INTERVAL_SECS as f64..=MAX_REFRESH_INTERVAL_SECS as f64,
        state.refresh_interval_secs as f64,
        Message::RefreshIntervalChanged,
    )
    .on_release(Message::SaveConfig)
    .step(1.0);

    let mut panel = Column::new()
        .push(title)
        .push(endpoint_label)
        .push(endpoint_input)
        .push(apply_button)
        .push(auto_refresh)
        .push(interval_label)
        .push(interval_slider)
        .spacing(10);

    if let Some(ref error) = state.error {
        let error_text = text(error.clone())
            .size(12)
            .style(|_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(0.8, 0.2, 0.2)),
            });
        panel = panel.push(error_text);
    }

    if let Some(snapshot) = latest {
        let updated = text(format!("{} metrics in last snapshot", snapshot.len()))
            .size(11)
            .style(|_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(0.5, 0.5, 0.5)),
            });
        panel = panel.push(updated);
    }

    column![panel].width(240).padding(10).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_endpoint(endpoint: &str) -> SettingsState {
        let mut state = SettingsState::from_config(&DashboardConfig::default());
        state.set_endpoint_input(endpoint.to_string());
        state
    }

    #[test]
    fn test_validate_accepts_http_url() {
        let state = state_with_endpoint("http://10.0.0.2:9550");
        assert_eq!(
            state.validate_endpoint().unwrap(),
            "http://10.0.0.2:9550"
        );
    }

    #[test]
    fn test_validate_strips_trailing_slash() {
        let state = state_with_endpoint("http://localhost:9550/");
        assert_eq!(
            state.validate_endpoint().unwrap(),
            "http://localhost:9550"
        );
    }

    #[test]
    fn test_validate_rejects_empty_and_schemeless() {
        assert!(state_with_endpoint("  ").validate_endpoint().is_err());
        assert!(
            state_with_endpoint("localhost:9550")
                .validate_endpoint()
                .is_err()
        );
    }

    #[test]
    fn test_panel_builds_with_and_without_snapshot() {
        let state = SettingsState::from_config(&DashboardConfig::default());

        let _ = settings_panel(&state, None);

        let snapshot = Snapshot::new(1_000);
        let _ = settings_panel(&state, Some(&snapshot));
    }

    #[test]
    fn test_interval_is_clamped() {
        let mut state = SettingsState::from_config(&DashboardConfig::default());

        state.set_refresh_interval(0.0);
        assert_eq!(state.refresh_interval_secs, 1);

        state.set_refresh_interval(500.0);
        assert_eq!(state.refresh_interval_secs, 60);

        state.set_refresh_interval(15.0);
        assert_eq!(state.refresh_interval_secs, 15);
    }
}
