//! V2Scope - live dashboard for V2Ray metrics.
//!
//! This library exposes the core components for testing.

pub mod app;
pub mod collector;
pub mod message;
pub mod subscription;
pub mod view;

// Re-export commonly used types
pub use app::V2Scope;
pub use collector::{CollectError, MetricsCollector, parse_bodies};
pub use message::Message;
