// Monitor service - drives one monitoring session: bulk load, then live push

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::live_channel::{LinkState, LiveChannel, LiveEvent};
use crate::application::reading_ingester::{AppendOutcome, ReadingIngester};
use crate::application::telemetry_api::{BulkData, SessionContext, TelemetryApi};
use crate::domain::stats::{self, ChannelSnapshot};
use crate::domain::telemetry::Channel;
use crate::domain::usage::{self, UsageStats};
use crate::errors::TelemetryError;

const EVENT_BUFFER: usize = 100;

pub const MSG_UNAUTHORIZED: &str = "Unauthorized access!";
pub const MSG_UNREACHABLE: &str = "Server unreachable!";
pub const MSG_LIVE_FAILED: &str = "Live data request failed!";

/// User-facing failure notice. Raised once per failure; the session ends
/// after an unrecoverable one.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNotice {
    pub message: String,
    pub active: bool,
}

impl ErrorNotice {
    pub fn raise(message: &str) -> Self {
        ErrorNotice {
            message: message.to_string(),
            active: true,
        }
    }
}

/// Everything a monitoring session emits, in the order it happens.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    Usage(UsageStats),
    Snapshot(ChannelSnapshot),
    Link(LinkState),
    Notice(ErrorNotice),
}

/// Use case for monitoring one excavator: seeds the in-memory series from
/// the bulk endpoint, then keeps the statistics current from the live feed.
#[derive(Clone)]
pub struct MonitorService {
    api: Arc<dyn TelemetryApi>,
    live: Arc<dyn LiveChannel>,
}

impl MonitorService {
    pub fn new(api: Arc<dyn TelemetryApi>, live: Arc<dyn LiveChannel>) -> Self {
        MonitorService { api, live }
    }

    /// Start a session for the given device. Events arrive on the returned
    /// receiver until the session ends; the live link is only opened after
    /// the bulk load has settled.
    pub fn start(&self, session: SessionContext) -> mpsc::Receiver<TelemetryEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let api = self.api.clone();
        let live = self.live.clone();

        tokio::spawn(async move {
            run_session(api, live, session, tx).await;
        });

        rx
    }
}

async fn run_session(
    api: Arc<dyn TelemetryApi>,
    live: Arc<dyn LiveChannel>,
    session: SessionContext,
    tx: mpsc::Sender<TelemetryEvent>,
) {
    let bulk = match api.fetch_bulk(&session.token).await {
        Ok(bulk) => bulk,
        Err(err) => {
            tracing::error!(device = %session.device, error = %err, "bulk data load failed");
            let _ = tx.send(TelemetryEvent::Notice(notice_for(&err))).await;
            return;
        }
    };

    let BulkData {
        device_stats,
        temperature,
        load,
        fuel,
    } = bulk;

    if let Some(usage) = usage::aggregate(&device_stats) {
        if tx.send(TelemetryEvent::Usage(usage)).await.is_err() {
            return;
        }
    }

    let mut ingester = ReadingIngester::new();
    for (channel, readings) in [
        (Channel::Temperature, temperature),
        (Channel::Load, load),
        (Channel::Fuel, fuel),
    ] {
        ingester.seed(channel, readings);
        if let Some(snapshot) = stats::compute(channel, ingester.series(channel)) {
            if tx.send(TelemetryEvent::Snapshot(snapshot)).await.is_err() {
                return;
            }
        }
    }

    if tx.send(TelemetryEvent::Link(LinkState::Connecting)).await.is_err() {
        return;
    }

    let mut feed = match live.open(&session.device).await {
        Ok(feed) => feed,
        Err(err) => {
            tracing::error!(device = %session.device, error = %err, "live channel failed to open");
            let _ = tx
                .send(TelemetryEvent::Notice(ErrorNotice::raise(MSG_LIVE_FAILED)))
                .await;
            let _ = tx.send(TelemetryEvent::Link(LinkState::Closed)).await;
            return;
        }
    };

    if tx.send(TelemetryEvent::Link(LinkState::Open)).await.is_err() {
        return;
    }

    while let Some(event) = feed.events.recv().await {
        match event {
            LiveEvent::Reading(channel, reading) => {
                if ingester.append(channel, reading) != AppendOutcome::Appended {
                    continue;
                }
                if let Some(snapshot) = stats::compute(channel, ingester.series(channel)) {
                    // Dropping the feed here tears the live link down.
                    if tx.send(TelemetryEvent::Snapshot(snapshot)).await.is_err() {
                        return;
                    }
                }
            }
            LiveEvent::Lost(reason) => {
                tracing::error!(device = %session.device, reason = %reason, "live channel lost");
                let _ = tx
                    .send(TelemetryEvent::Notice(ErrorNotice::raise(MSG_LIVE_FAILED)))
                    .await;
                let _ = tx.send(TelemetryEvent::Link(LinkState::Closed)).await;
                return;
            }
        }
    }

    tracing::debug!(
        device = %session.device,
        dropped_out_of_order = ingester.dropped_out_of_order(),
        "live feed ended"
    );
    feed.handle.close();
    let _ = tx.send(TelemetryEvent::Link(LinkState::Closed)).await;
}

fn notice_for(err: &TelemetryError) -> ErrorNotice {
    match err {
        TelemetryError::Auth(_) => ErrorNotice::raise(MSG_UNAUTHORIZED),
        TelemetryError::LiveChannel(_) => ErrorNotice::raise(MSG_LIVE_FAILED),
        _ => ErrorNotice::raise(MSG_UNREACHABLE),
    }
}
