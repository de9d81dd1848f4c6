// Application layer - use cases and ports

pub mod live_channel;
pub mod monitor_service;
pub mod reading_ingester;
pub mod telemetry_api;
pub mod telemetry_store;
