//! Dashboard view: header, summary tiles, charts, and the detail panel.

use iced::widget::{Column, column, container, row, rule, scrollable, text};
use iced::{Alignment, Element, Length, Theme};

use v2scope_common::{DashboardConfig, Snapshot};

use crate::message::Message;
use crate::view::chart::{ChartState, chart_view};
use crate::view::components::{MetricTile, StatusLed, StatusLedState};
use crate::view::formatting::{
    format_bytes, format_clock_time, format_count, format_memory, format_percent,
    format_uptime_hours,
};
use crate::view::settings::{SettingsState, settings_panel};

// Flattened keys the dashboard reads. The traffic keys bake in the
// exporter's dimension/target label values.
pub const KEY_UP: &str = "v2ray_up";
pub const KEY_UPTIME: &str = "v2ray_uptime_seconds";
pub const KEY_ALLOC: &str = "v2ray_memstats_alloc_bytes";
pub const KEY_SYS: &str = "v2ray_memstats_sys_bytes";
pub const KEY_GOROUTINES: &str = "go_goroutines";
pub const KEY_THREADS: &str = "go_threads";
pub const KEY_CPU_SECONDS: &str = "process_cpu_seconds_total";
pub const KEY_GC_CPU_FRACTION: &str = "go_memstats_gc_cpu_fraction";
pub const KEY_HEAP_ALLOC: &str = "go_memstats_heap_alloc_bytes";
pub const KEY_HEAP_SYS: &str = "go_memstats_heap_sys_bytes";
pub const KEY_TRAFFIC_UPLINK: &str = "v2ray_traffic_uplink_bytes_total_inbound_api";
pub const KEY_TRAFFIC_DOWNLINK: &str = "v2ray_traffic_downlink_bytes_total_inbound_api";
pub const KEY_HEAP_OBJECTS: &str = "go_memstats_heap_objects";
pub const KEY_NEXT_GC: &str = "go_memstats_next_gc_bytes";
pub const KEY_STACK_INUSE: &str = "go_memstats_stack_inuse_bytes";
pub const KEY_GC_PAUSE_SUM: &str = "go_gc_duration_seconds_sum";
pub const KEY_GC_COUNT: &str = "go_gc_duration_seconds_count";
pub const KEY_LAST_GC: &str = "go_memstats_last_gc_time_seconds";
pub const KEY_RESIDENT_MEMORY: &str = "process_resident_memory_bytes";
pub const KEY_OPEN_FDS: &str = "process_open_fds";
pub const KEY_MAX_FDS: &str = "process_max_fds";

/// Dashboard view state, owned by the application.
#[derive(Debug)]
pub struct DashboardState {
    /// The most recent snapshot; kept on screen even while the source is
    /// unavailable.
    pub latest: Option<Snapshot>,
    /// Whether the last poll cycle succeeded.
    pub available: bool,
    /// Last collection error, if any.
    pub last_error: Option<String>,
    /// Settings panel state.
    pub settings: SettingsState,
    /// Heap allocated vs heap system bytes.
    pub memory_chart: ChartState,
    /// Uplink vs downlink traffic bytes.
    pub traffic_chart: ChartState,
}

impl DashboardState {
    /// Create the dashboard state from the loaded configuration.
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            latest: None,
            available: false,
            last_error: None,
            settings: SettingsState::from_config(config),
            memory_chart: ChartState::new("Memory usage", format_bytes),
            traffic_chart: ChartState::new("Traffic", format_bytes),
        }
    }
}

/// Render the dashboard view.
pub fn dashboard_view(state: &DashboardState) -> Element<'_, Message> {
    let sidebar = settings_panel(&state.settings, state.latest.as_ref());

    let main = column![
        render_header(state),
        render_tiles(state),
        rule::horizontal(1),
        render_charts(state),
        rule::horizontal(1),
        render_details(state),
    ]
    .spacing(12)
    .padding(16);

    let content = row![
        sidebar,
        rule::vertical(1),
        scrollable(main).width(Length::Fill).height(Length::Fill)
    ]
    .spacing(4);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Render the header with the availability indicator.
fn render_header(state: &DashboardState) -> Element<'_, Message> {
    let title = text("V2Scope").size(24);

    let led_state = if state.available {
        StatusLedState::from_metric(metric(state, KEY_UP))
    } else if state.latest.is_some() {
        StatusLedState::Down
    } else {
        StatusLedState::Unknown
    };

    let led = StatusLed::new(led_state).with_label(led_state.label());

    let header_row = row![title, led.view()]
        .spacing(20)
        .align_y(Alignment::Center);

    let mut header = Column::new().push(header_row).spacing(5);

    if !state.available {
        let message = match &state.last_error {
            Some(error) => format!("Metrics source unavailable: {}", error),
            None => "Waiting for the first snapshot...".to_string(),
        };
        let banner = text(message).size(12).style(|_theme: &Theme| text::Style {
            color: Some(iced::Color::from_rgb(0.8, 0.2, 0.2)),
        });
        header = header.push(banner);
    }

    header.into()
}

/// Render the four summary tiles.
fn render_tiles(state: &DashboardState) -> Element<'_, Message> {
    let up = metric(state, KEY_UP);

    let (status_value, accent) = match StatusLedState::from_metric(up) {
        StatusLedState::Up => ("Running", iced::Color::from_rgb(0.2, 0.8, 0.3)),
        StatusLedState::Down => ("Down", iced::Color::from_rgb(0.9, 0.2, 0.2)),
        StatusLedState::Unknown => ("Waiting", iced::Color::from_rgb(0.5, 0.5, 0.5)),
    };

    let status_tile = MetricTile::new("Service", status_value)
        .with_accent(accent)
        .with_delta(format!(
            "Uptime: {}",
            display(state, KEY_UPTIME, format_uptime_hours)
        ));

    let memory_tile = MetricTile::new("Memory allocated", display(state, KEY_ALLOC, format_memory))
        .with_delta(format!(
            "System: {}",
            display(state, KEY_SYS, format_memory)
        ));

    let goroutines_tile =
        MetricTile::new("Goroutines", display(state, KEY_GOROUTINES, format_count)).with_delta(
            format!("Threads: {}", display(state, KEY_THREADS, format_count)),
        );

    let cpu_tile = MetricTile::new(
        "CPU time",
        display(state, KEY_CPU_SECONDS, |v| format!("{:.2}s", v)),
    )
    .with_delta(format!(
        "GC CPU: {}",
        display(state, KEY_GC_CPU_FRACTION, format_percent)
    ));

    row![
        status_tile.view(),
        memory_tile.view(),
        goroutines_tile.view(),
        cpu_tile.view()
    ]
    .spacing(10)
    .into()
}

/// Render the two time-series charts.
fn render_charts(state: &DashboardState) -> Element<'_, Message> {
    row![
        chart_view(&state.memory_chart),
        chart_view(&state.traffic_chart)
    ]
    .spacing(10)
    .into()
}

/// Render the three-column detail panel.
fn render_details(state: &DashboardState) -> Element<'_, Message> {
    let memory = detail_section(
        "Memory",
        vec![
            ("Heap objects", display(state, KEY_HEAP_OBJECTS, format_count)),
            ("Next GC at", display(state, KEY_NEXT_GC, format_memory)),
            (
                "Stack in use",
                display(state, KEY_STACK_INUSE, format_memory),
            ),
        ],
    );

    let gc = detail_section(
        "Garbage collector",
        vec![
            (
                "Pause total",
                display(state, KEY_GC_PAUSE_SUM, |v| format!("{:.3}s", v)),
            ),
            ("Collections", display(state, KEY_GC_COUNT, format_count)),
            (
                "Last run",
                metric(state, KEY_LAST_GC)
                    .and_then(format_clock_time)
                    .unwrap_or_else(|| "never".to_string()),
            ),
        ],
    );

    let process = detail_section(
        "Process",
        vec![
            (
                "Resident memory",
                display(state, KEY_RESIDENT_MEMORY, format_memory),
            ),
            ("Open fds", display(state, KEY_OPEN_FDS, format_count)),
            ("Max fds", display(state, KEY_MAX_FDS, format_count)),
        ],
    );

    column![
        text("System details").size(16),
        row![memory, gc, process].spacing(10)
    ]
    .spacing(8)
    .into()
}

/// Render one detail column.
fn detail_section<'a>(
    title: &'a str,
    lines: Vec<(&'a str, String)>,
) -> Element<'a, Message> {
    let mut section = Column::new().push(text(title).size(14)).spacing(4);

    for (label, value) in lines {
        section = section.push(
            text(format!("{}: {}", label, value))
                .size(12)
                .style(|_theme: &Theme| text::Style {
                    color: Some(iced::Color::from_rgb(0.7, 0.7, 0.7)),
                }),
        );
    }

    container(section)
        .padding(10)
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

/// Look up a metric in the latest snapshot.
fn metric(state: &DashboardState, key: &str) -> Option<f64> {
    state.latest.as_ref().and_then(|s| s.get(key))
}

/// Format a metric, or "-" when it is absent.
fn display(state: &DashboardState, key: &str, format: impl Fn(f64) -> String) -> String {
    metric(state, key)
        .map(format)
        .unwrap_or_else(|| "-".to_string())
}
