//! Multi-series time-series chart using Iced canvas.
//!
//! Both dashboard charts plot two traces over the retained history, so
//! the chart holds named, colored series rather than a single line.

use iced::mouse;
use iced::widget::canvas::{self, Cache, Canvas, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Size, Theme};

use v2scope_common::RETENTION_WINDOW_MS;

use super::formatting::format_time_offset;

/// A data point for the chart.
#[derive(Debug, Clone)]
pub struct DataPoint {
    /// Timestamp in milliseconds.
    pub timestamp: i64,
    /// Value.
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One named trace on the chart.
#[derive(Debug, Clone)]
pub struct Series {
    /// Legend label.
    pub name: String,
    /// Line color.
    pub color: Color,
    /// Points, timestamp ascending.
    pub points: Vec<DataPoint>,
}

impl Series {
    /// Build a series from (timestamp, value) pairs as produced by
    /// `HistoryStore::series`.
    pub fn new(name: impl Into<String>, color: Color, points: Vec<(i64, f64)>) -> Self {
        Self {
            name: name.into(),
            color,
            points: points
                .into_iter()
                .map(|(t, v)| DataPoint::new(t, v))
                .collect(),
        }
    }
}

/// State for a time-series chart windowed to the retention period.
#[derive(Debug)]
pub struct ChartState {
    /// Chart title.
    title: String,
    /// The traces to display.
    series: Vec<Series>,
    /// Visible window in milliseconds (the history retention window).
    window_ms: i64,
    /// Axis label formatter for values.
    label_format: fn(f64) -> String,
    /// Cache for the chart geometry.
    cache: Cache,
    /// Minimum visible value.
    min_value: f64,
    /// Maximum visible value.
    max_value: f64,
    /// Current timestamp (for calculating the visible range).
    current_time: i64,
}

impl ChartState {
    /// Create a new chart state.
    pub fn new(title: impl Into<String>, label_format: fn(f64) -> String) -> Self {
        Self {
            title: title.into(),
            series: Vec::new(),
            window_ms: RETENTION_WINDOW_MS,
            label_format,
            cache: Cache::new(),
            min_value: 0.0,
            max_value: 1.0,
            current_time: v2scope_common::current_timestamp_millis(),
        }
    }

    /// Replace all series (called after each appended snapshot).
    pub fn set_series(&mut self, series: Vec<Series>) {
        self.series = series;
        self.recalculate_bounds();
        self.cache.clear();
    }

    /// Drop all series (endpoint change).
    pub fn clear(&mut self) {
        self.series.clear();
        self.recalculate_bounds();
        self.cache.clear();
    }

    /// Update the current time (call on tick).
    pub fn update_time(&mut self) {
        let new_time = v2scope_common::current_timestamp_millis();
        if new_time != self.current_time {
            self.current_time = new_time;
            self.cache.clear();
        }
    }

    /// Points of one series within the visible window.
    fn visible_points<'a>(&'a self, series: &'a Series) -> impl Iterator<Item = &'a DataPoint> {
        let cutoff = self.current_time - self.window_ms;
        series.points.iter().filter(move |p| p.timestamp >= cutoff)
    }

    /// Recalculate min/max bounds across every visible point.
    fn recalculate_bounds(&mut self) {
        let cutoff = self.current_time - self.window_ms;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for series in &self.series {
            for point in series.points.iter().filter(|p| p.timestamp >= cutoff) {
                min = min.min(point.value);
                max = max.max(point.value);
            }
        }

        if !min.is_finite() || !max.is_finite() {
            self.min_value = 0.0;
            self.max_value = 1.0;
            return;
        }

        let range = max - min;
        if range < 0.001 {
            self.min_value = min - 0.5;
            self.max_value = max + 0.5;
        } else {
            let padding = range * 0.1;
            self.min_value = min - padding;
            self.max_value = max + padding;
        }
    }

    /// Whether any series has a visible point.
    fn has_data(&self) -> bool {
        self.series
            .iter()
            .any(|s| self.visible_points(s).next().is_some())
    }
}

/// Chart widget that renders the time-series data.
pub struct Chart<'a> {
    state: &'a ChartState,
}

impl<'a> Chart<'a> {
    pub fn new(state: &'a ChartState) -> Self {
        Self { state }
    }
}

impl<'a> canvas::Program<crate::message::Message> for Chart<'a> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.state.cache.draw(renderer, bounds.size(), |frame| {
            self.draw_chart(frame, bounds.size());
        });

        vec![geometry]
    }
}

impl<'a> Chart<'a> {
    /// Draw the chart onto the frame.
    fn draw_chart(&self, frame: &mut Frame, size: Size) {
        let padding = 50.0;
        let chart_width = size.width - padding * 2.0;
        let chart_height = size.height - padding * 2.0;

        if chart_width <= 0.0 || chart_height <= 0.0 {
            return;
        }

        // Background
        let background = Path::rectangle(Point::ORIGIN, size);
        frame.fill(&background, Color::from_rgb(0.1, 0.1, 0.12));

        let chart_bg = Path::rectangle(
            Point::new(padding, padding),
            Size::new(chart_width, chart_height),
        );
        frame.fill(&chart_bg, Color::from_rgb(0.08, 0.08, 0.1));

        // Title
        let title = Text {
            content: self.state.title.clone(),
            position: Point::new(padding, 10.0),
            color: Color::WHITE,
            size: 14.0.into(),
            ..Text::default()
        };
        frame.fill_text(title);

        if !self.state.has_data() {
            let no_data = Text {
                content: "No data".to_string(),
                position: Point::new(size.width / 2.0 - 30.0, size.height / 2.0),
                color: Color::from_rgb(0.5, 0.5, 0.5),
                size: 16.0.into(),
                ..Text::default()
            };
            frame.fill_text(no_data);
            return;
        }

        let time_end = self.state.current_time;
        let time_start = time_end - self.state.window_ms;
        let time_range = (time_end - time_start) as f64;

        let value_min = self.state.min_value;
        let value_range = self.state.max_value - value_min;

        self.draw_grid(frame, padding, chart_width, chart_height);

        let to_point = |p: &DataPoint| {
            let x = padding + ((p.timestamp - time_start) as f64 / time_range) as f32 * chart_width;
            let y = padding + chart_height
                - ((p.value - value_min) / value_range) as f32 * chart_height;
            Point::new(x, y)
        };

        for series in &self.state.series {
            let visible: Vec<_> = self.state.visible_points(series).collect();

            if visible.len() >= 2 {
                let mut builder = canvas::path::Builder::new();
                for (i, point) in visible.iter().enumerate() {
                    let position = to_point(point);
                    if i == 0 {
                        builder.move_to(position);
                    } else {
                        builder.line_to(position);
                    }
                }
                frame.stroke(
                    &builder.build(),
                    Stroke::default().with_color(series.color).with_width(2.0),
                );
            }

            // Mark the latest value of each trace.
            if let Some(last) = visible.last() {
                let dot = Path::circle(to_point(last), 3.0);
                frame.fill(&dot, series.color);
            }
        }

        self.draw_legend(frame, size, padding);
    }

    /// Draw grid lines and axis labels.
    fn draw_grid(&self, frame: &mut Frame, padding: f32, chart_width: f32, chart_height: f32) {
        let grid_color = Color::from_rgb(0.2, 0.2, 0.25);
        let label_color = Color::from_rgb(0.5, 0.5, 0.5);

        // Horizontal grid lines (value axis)
        let num_h_lines = 5;
        let value_range = self.state.max_value - self.state.min_value;

        for i in 0..=num_h_lines {
            let y = padding + (i as f32 / num_h_lines as f32) * chart_height;
            let value = self.state.max_value - (i as f64 / num_h_lines as f64) * value_range;

            let line = Path::line(Point::new(padding, y), Point::new(padding + chart_width, y));
            frame.stroke(
                &line,
                Stroke::default().with_color(grid_color).with_width(1.0),
            );

            let label = Text {
                content: (self.state.label_format)(value),
                position: Point::new(5.0, y - 6.0),
                color: label_color,
                size: 10.0.into(),
                ..Text::default()
            };
            frame.fill_text(label);
        }

        // Vertical grid lines (time axis)
        let num_v_lines = 4;

        for i in 0..=num_v_lines {
            let x = padding + (i as f32 / num_v_lines as f32) * chart_width;

            let line = Path::line(
                Point::new(x, padding),
                Point::new(x, padding + chart_height),
            );
            frame.stroke(
                &line,
                Stroke::default().with_color(grid_color).with_width(1.0),
            );

            let time_offset =
                self.state.window_ms as f64 * (1.0 - i as f64 / num_v_lines as f64);

            let label = Text {
                content: format_time_offset(time_offset as i64),
                position: Point::new(x - 15.0, padding + chart_height + 15.0),
                color: label_color,
                size: 10.0.into(),
                ..Text::default()
            };
            frame.fill_text(label);
        }
    }

    /// Draw the per-series legend with the latest values.
    fn draw_legend(&self, frame: &mut Frame, size: Size, padding: f32) {
        let line_height = 14.0;
        let legend_x = size.width - padding - 150.0;

        for (i, series) in self.state.series.iter().enumerate() {
            let y = padding + 10.0 + i as f32 * line_height;

            let swatch = Path::rectangle(Point::new(legend_x, y + 2.0), Size::new(8.0, 8.0));
            frame.fill(&swatch, series.color);

            let current = self
                .state
                .visible_points(series)
                .last()
                .map(|p| (self.state.label_format)(p.value))
                .unwrap_or_else(|| "-".to_string());

            let label = Text {
                content: format!("{}: {}", series.name, current),
                position: Point::new(legend_x + 14.0, y),
                color: Color::from_rgb(0.7, 0.7, 0.7),
                size: 11.0.into(),
                ..Text::default()
            };
            frame.fill_text(label);
        }
    }
}

/// Create a chart element.
pub fn chart_view(state: &ChartState) -> Element<'_, crate::message::Message> {
    Canvas::new(Chart::new(state))
        .width(Length::Fill)
        .height(Length::Fixed(220.0))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::formatting::format_value;

    #[test]
    fn test_series_from_history_pairs() {
        let series = Series::new("heap", Color::WHITE, vec![(1_000, 10.0), (2_000, 20.0)]);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[1].timestamp, 2_000);
        assert_eq!(series.points[1].value, 20.0);
    }

    #[test]
    fn test_bounds_span_all_series() {
        let mut chart = ChartState::new("test", format_value);
        chart.current_time = 100_000;

        chart.set_series(vec![
            Series::new("a", Color::WHITE, vec![(90_000, 10.0), (95_000, 30.0)]),
            Series::new("b", Color::BLACK, vec![(91_000, -5.0), (96_000, 12.0)]),
        ]);

        // 10% padding around [-5, 30].
        assert!(chart.min_value < -5.0);
        assert!(chart.max_value > 30.0);
    }

    #[test]
    fn test_points_outside_window_are_invisible() {
        let mut chart = ChartState::new("test", format_value);
        chart.current_time = 10 * RETENTION_WINDOW_MS;

        let stale = chart.current_time - RETENTION_WINDOW_MS - 1;
        chart.set_series(vec![Series::new(
            "a",
            Color::WHITE,
            vec![(stale, 1.0)],
        )]);

        assert!(!chart.has_data());
    }

    #[test]
    fn test_empty_chart_has_default_bounds() {
        let mut chart = ChartState::new("test", format_value);
        chart.set_series(Vec::new());
        assert_eq!(chart.min_value, 0.0);
        assert_eq!(chart.max_value, 1.0);
        assert!(!chart.has_data());
    }
}
