//! V2Scope - live dashboard for V2Ray metrics.
//!
//! Polls the configured V2Ray API (`/scrape` and `/metrics`) and shows
//! summary tiles, memory and traffic charts, and runtime details.

use iced::application;

use v2scope_common::DashboardConfig;

mod app;
mod collector;
mod message;
mod subscription;
mod view;

use app::V2Scope;

fn main() -> anyhow::Result<()> {
    // Logging config lives in the same file the app loads at boot.
    let config_path = v2scope_common::default_config_path();
    let config = DashboardConfig::load_or_default(&config_path).unwrap_or_default();

    v2scope_common::init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    tracing::info!(config = %config_path.display(), "Starting V2Scope");

    // Run the Iced application
    application(V2Scope::boot, V2Scope::update, V2Scope::view)
        .title(V2Scope::title)
        .subscription(V2Scope::subscription)
        .theme(V2Scope::theme)
        .run()
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
