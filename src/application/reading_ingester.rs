// Reading ingester - seeding plus the append/dedup rules for live readings

use crate::application::telemetry_store::TelemetryStore;
use crate::domain::telemetry::{self, Channel, Reading};

/// Outcome of offering one live reading to the ingester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Admitted and pushed to the end of the series.
    Appended,
    /// Timestamp equals the channel's last-seen marker; dropped.
    Duplicate,
    /// Timestamp sorts before the last-seen marker; dropped. Strict-append
    /// policy: the marker never moves backwards and the series is never
    /// reordered after seeding.
    OutOfOrder,
}

/// Applies the ordering and dedup rules for all three channels; the actual
/// storage is delegated to [`TelemetryStore`].
#[derive(Debug, Default)]
pub struct ReadingIngester {
    store: TelemetryStore,
    dropped_out_of_order: u64,
}

impl ReadingIngester {
    pub fn new() -> Self {
        ReadingIngester {
            store: TelemetryStore::new(),
            dropped_out_of_order: 0,
        }
    }

    /// Replace a channel's series with the bulk payload, stably sorted
    /// ascending by timestamp, and reset the last-seen marker to the final
    /// sorted entry. An empty payload is a no-op so the channel stays in
    /// the "unknown" state.
    pub fn seed(&mut self, channel: Channel, mut readings: Vec<Reading>) {
        if readings.is_empty() {
            return;
        }
        telemetry::sort_by_time(&mut readings);
        let last_seen = readings[readings.len() - 1].time.clone();
        self.store.replace(channel, readings, last_seen);
        tracing::debug!(
            channel = channel.label(),
            count = self.store.series(channel).len(),
            version = self.store.version(channel),
            "series seeded from bulk data"
        );
    }

    /// Offer one live reading. At most one reading is admitted per distinct
    /// timestamp: anything equal to the last-seen marker is a duplicate,
    /// anything older is out of order. The first observation on a channel
    /// that has never seen data is always admitted.
    pub fn append(&mut self, channel: Channel, reading: Reading) -> AppendOutcome {
        if let Some(last) = self.store.last_seen(channel) {
            if reading.time == last {
                tracing::debug!(
                    channel = channel.label(),
                    time = %reading.time,
                    "duplicate live reading dropped"
                );
                return AppendOutcome::Duplicate;
            }
            if reading.time.as_str() < last {
                self.dropped_out_of_order += 1;
                tracing::warn!(
                    channel = channel.label(),
                    time = %reading.time,
                    last_seen = last,
                    dropped_total = self.dropped_out_of_order,
                    "out-of-order live reading dropped"
                );
                return AppendOutcome::OutOfOrder;
            }
        }

        self.store.push(channel, reading);
        tracing::debug!(
            channel = channel.label(),
            count = self.store.series(channel).len(),
            version = self.store.version(channel),
            "live reading appended"
        );
        AppendOutcome::Appended
    }

    /// Read-only view of a channel's current series.
    pub fn series(&self, channel: Channel) -> &[Reading] {
        self.store.series(channel)
    }

    /// Live readings rejected by the strict-append policy this session.
    pub fn dropped_out_of_order(&self) -> u64 {
        self.dropped_out_of_order
    }
}
