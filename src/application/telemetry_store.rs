// Telemetry store - owned per-channel series and last-seen markers

use crate::domain::telemetry::{Channel, Reading};

#[derive(Debug, Default)]
struct ChannelSeries {
    readings: Vec<Reading>,
    last_seen: Option<String>,
    version: u64,
}

/// Sole owner of the reading series for one session.
///
/// All mutation happens through the ingester on the single session task, so
/// no locking is needed; consumers only ever see read-only views here or
/// owned copies inside snapshots. Series only grow, never compact, within a
/// session.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    temperature: ChannelSeries,
    load: ChannelSeries,
    fuel: ChannelSeries,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of a channel's ordered series.
    pub fn series(&self, channel: Channel) -> &[Reading] {
        &self.slot(channel).readings
    }

    /// Timestamp of the newest admitted reading, `None` before the channel
    /// has ever been seeded or appended to.
    pub fn last_seen(&self, channel: Channel) -> Option<&str> {
        self.slot(channel).last_seen.as_deref()
    }

    /// Store generation for a channel; bumped on every mutation.
    pub fn version(&self, channel: Channel) -> u64 {
        self.slot(channel).version
    }

    pub fn replace(&mut self, channel: Channel, readings: Vec<Reading>, last_seen: String) {
        let slot = self.slot_mut(channel);
        slot.readings = readings;
        slot.last_seen = Some(last_seen);
        slot.version += 1;
    }

    pub fn push(&mut self, channel: Channel, reading: Reading) {
        let slot = self.slot_mut(channel);
        slot.last_seen = Some(reading.time.clone());
        slot.readings.push(reading);
        slot.version += 1;
    }

    fn slot(&self, channel: Channel) -> &ChannelSeries {
        match channel {
            Channel::Temperature => &self.temperature,
            Channel::Load => &self.load,
            Channel::Fuel => &self.fuel,
        }
    }

    fn slot_mut(&mut self, channel: Channel) -> &mut ChannelSeries {
        match channel {
            Channel::Temperature => &mut self.temperature,
            Channel::Load => &mut self.load,
            Channel::Fuel => &mut self.fuel,
        }
    }
}
