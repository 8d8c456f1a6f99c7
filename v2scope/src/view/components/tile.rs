//! Summary tile widget for the dashboard's top row.

use iced::widget::{Column, container, text};
use iced::{Element, Length, Theme};

/// A metric tile: label on top, large primary value, optional delta line
/// underneath (e.g. "Threads: 14").
pub struct MetricTile {
    /// What the tile shows.
    label: String,
    /// Primary value, preformatted.
    value: String,
    /// Secondary line, preformatted.
    delta: Option<String>,
    /// Color of the primary value.
    accent: Option<iced::Color>,
}

impl MetricTile {
    /// Create a new tile.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            delta: None,
            accent: None,
        }
    }

    /// Add the secondary line.
    pub fn with_delta(mut self, delta: impl Into<String>) -> Self {
        self.delta = Some(delta.into());
        self
    }

    /// Color the primary value.
    pub fn with_accent(mut self, color: iced::Color) -> Self {
        self.accent = Some(color);
        self
    }

    /// Render the tile as an Iced element.
    pub fn view<'a, Message: 'a>(self) -> Element<'a, Message> {
        let label = text(self.label)
            .size(12)
            .style(|_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(0.6, 0.6, 0.6)),
            });

        let accent = self.accent;
        let value = text(self.value)
            .size(24)
            .style(move |_theme: &Theme| text::Style { color: accent });

        let mut content = Column::new().push(label).push(value).spacing(4);

        if let Some(delta) = self.delta {
            let delta_text = text(delta).size(12).style(|_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(0.5, 0.7, 0.5)),
            });
            content = content.push(delta_text);
        }

        container(content)
            .padding(12)
            .width(Length::Fill)
            .style(|_theme: &Theme| container::Style {
                background: Some(iced::Background::Color(iced::Color::from_rgb(
                    0.12, 0.12, 0.15,
                ))),
                border: iced::Border {
                    color: iced::Color::from_rgb(0.25, 0.25, 0.3),
                    width: 1.0,
                    radius: 6.0.into(),
                },
                ..Default::default()
            })
            .into()
    }
}
