//! Reusable UI components for the dashboard.

pub mod status_led;
pub mod tile;

pub use status_led::{StatusLed, StatusLedState};
pub use tile::MetricTile;
