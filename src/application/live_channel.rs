// Live channel port - subscription feed for continuously pushed readings

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::domain::telemetry::{Channel, Reading};
use crate::errors::TelemetryError;

/// Lifecycle of the live link, reported alongside the data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Closed,
    Connecting,
    Open,
}

/// One message from an open live feed.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// A reading pushed on one of the device's channels.
    Reading(Channel, Reading),
    /// The link failed and will deliver nothing further.
    Lost(String),
}

/// An open subscription: the event stream plus a handle that tears the
/// link down when closed or dropped.
pub struct LiveFeed {
    pub events: mpsc::Receiver<LiveEvent>,
    pub handle: LiveHandle,
}

/// Owns the shutdown signal for the background connection task. Dropping
/// the handle closes the link.
pub struct LiveHandle {
    shutdown: Option<oneshot::Sender<()>>,
}

impl LiveHandle {
    pub fn new(shutdown: oneshot::Sender<()>) -> Self {
        LiveHandle {
            shutdown: Some(shutdown),
        }
    }

    pub fn close(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[async_trait]
pub trait LiveChannel: Send + Sync {
    /// Open the link and subscribe to all channels of the given device.
    /// Resolves only once the subscription is ready to deliver readings.
    async fn open(&self, device: &str) -> Result<LiveFeed, TelemetryError>;
}
