// Telemetry API port - login and one-time bulk fetch

use async_trait::async_trait;

use crate::domain::telemetry::Reading;
use crate::domain::usage::DeviceStatsRecord;
use crate::errors::TelemetryError;

/// Credentials established by a successful login, carried through the
/// monitoring session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
    pub device: String,
}

impl SessionContext {
    pub fn new(token: String, device: String) -> Self {
        SessionContext { token, device }
    }
}

/// Everything the bulk endpoint returns for one device: historical series
/// for each channel plus the per-report byte counters.
#[derive(Debug, Clone, Default)]
pub struct BulkData {
    pub device_stats: Vec<DeviceStatsRecord>,
    pub temperature: Vec<Reading>,
    pub load: Vec<Reading>,
    pub fuel: Vec<Reading>,
}

#[async_trait]
pub trait TelemetryApi: Send + Sync {
    /// Exchange device credentials for a session token.
    async fn login(&self, username: &str, password: &str) -> Result<String, TelemetryError>;

    /// Fetch the accumulated history and device stats in one request.
    async fn fetch_bulk(&self, token: &str) -> Result<BulkData, TelemetryError>;
}
