//! Status LED for the service up/down indicator.

use iced::widget::{container, row, text};
use iced::{Alignment, Element, Length, Theme};

/// State of a status LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLedState {
    /// Service reported up - green.
    Up,
    /// Service reported down, or the collector cannot reach it - red.
    Down,
    /// No data yet - gray.
    Unknown,
}

impl StatusLedState {
    /// Derive the state from the `v2ray_up` metric (1 = up).
    pub fn from_metric(up: Option<f64>) -> Self {
        match up {
            Some(v) if v == 1.0 => StatusLedState::Up,
            Some(_) => StatusLedState::Down,
            None => StatusLedState::Unknown,
        }
    }

    /// Get the color for this state.
    fn color(&self) -> iced::Color {
        match self {
            StatusLedState::Up => iced::Color::from_rgb(0.2, 0.8, 0.3),
            StatusLedState::Down => iced::Color::from_rgb(0.9, 0.2, 0.2),
            StatusLedState::Unknown => iced::Color::from_rgb(0.5, 0.5, 0.5),
        }
    }

    /// Get a text description for this state.
    pub fn label(&self) -> &'static str {
        match self {
            StatusLedState::Up => "UP",
            StatusLedState::Down => "DOWN",
            StatusLedState::Unknown => "???",
        }
    }
}

/// A status LED indicator widget.
pub struct StatusLed {
    /// Current state.
    state: StatusLedState,
    /// Optional label text.
    label: Option<String>,
    /// Size of the LED (diameter).
    size: f32,
}

impl StatusLed {
    /// Create a new status LED.
    pub fn new(state: StatusLedState) -> Self {
        Self {
            state,
            label: None,
            size: 12.0,
        }
    }

    /// Add a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Render the status LED as an Iced element.
    pub fn view<'a, Message: 'a>(self) -> Element<'a, Message> {
        let color = self.state.color();

        let led = container(text(""))
            .width(Length::Fixed(self.size))
            .height(Length::Fixed(self.size))
            .style(move |_theme: &Theme| container::Style {
                background: Some(iced::Background::Color(color)),
                border: iced::Border {
                    color: iced::Color::from_rgb(0.3, 0.3, 0.3),
                    width: 1.0,
                    radius: (self.size / 2.0).into(),
                },
                ..Default::default()
            });

        let mut content = row![led].spacing(8).align_y(Alignment::Center);

        if let Some(label) = self.label {
            content = content.push(text(label).size(12));
        }

        content.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_metric() {
        assert_eq!(StatusLedState::from_metric(Some(1.0)), StatusLedState::Up);
        assert_eq!(StatusLedState::from_metric(Some(0.0)), StatusLedState::Down);
        assert_eq!(StatusLedState::from_metric(Some(2.0)), StatusLedState::Down);
        assert_eq!(StatusLedState::from_metric(None), StatusLedState::Unknown);
    }
}
