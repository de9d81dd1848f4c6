// Main entry point - Dependency injection and session startup
mod application;
mod domain;
mod errors;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use anyhow::Context;

use crate::application::monitor_service::MonitorService;
use crate::application::telemetry_api::{SessionContext, TelemetryApi};
use crate::errors::TelemetryError;
use crate::infrastructure::config::load_monitor_config;
use crate::infrastructure::http_api::HttpTelemetryApi;
use crate::infrastructure::mqtt_channel::MqttLiveChannel;
use crate::presentation::console::render_events;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_monitor_config()?;

    // Create adapters (infrastructure layer)
    let api = Arc::new(HttpTelemetryApi::new(&config.api.base_url));
    let live = Arc::new(MqttLiveChannel::new(&config.live.host, config.live.port));

    // Authenticate; the device id doubles as the username
    let token = match api
        .login(&config.device.username, &config.device.password)
        .await
    {
        Ok(token) => token,
        Err(TelemetryError::Auth(reason)) => {
            anyhow::bail!("login rejected: {}", reason);
        }
        Err(err) => {
            return Err(err).context("login request failed");
        }
    };
    let session = SessionContext::new(token, config.device.username.clone());

    // Create service (application layer) and run the session to completion
    let service = MonitorService::new(api, live);

    println!(
        "Starting excavator-telemetry monitor for device {}",
        session.device
    );

    let events = service.start(session);
    render_events(events).await;

    Ok(())
}
