// Channel statistics - pure functions over one ordered reading series

use crate::domain::telemetry::{Channel, Reading};

/// Engine temperature statistics derived from the full series.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureStats {
    pub series: Vec<Reading>,
    pub current: f64,
    pub current_ratio_pct: f64,
    pub average: f64,
    pub max: f64,
    pub max_time: String,
    pub max_ratio_pct: f64,
}

/// Arm load statistics. No maximum is tracked for this channel.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadStats {
    pub series: Vec<Reading>,
    pub current: f64,
    pub current_ratio_pct: f64,
    pub average: f64,
    pub sum: f64,
    pub sum_ratio_pct: f64,
}

/// Fuel level statistics. Readings on this channel are the critical-level
/// reports forwarded by the device, so "current" is the last critical level.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelStats {
    pub series: Vec<Reading>,
    pub last_critical: f64,
    pub last_critical_time: String,
    pub min: f64,
    pub min_time: String,
    pub empty_count: usize,
}

/// A statistics snapshot for one channel at a point in time. Snapshots are
/// always rebuilt from the whole series, never patched incrementally.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelSnapshot {
    Temperature(TemperatureStats),
    Load(LoadStats),
    Fuel(FuelStats),
}

/// Recompute the snapshot for one channel over its full series.
///
/// Returns `None` for an empty series; the consumer renders that as the
/// "unknown" state.
pub fn compute(channel: Channel, series: &[Reading]) -> Option<ChannelSnapshot> {
    match channel {
        Channel::Temperature => temperature_stats(series).map(ChannelSnapshot::Temperature),
        Channel::Load => load_stats(series).map(ChannelSnapshot::Load),
        Channel::Fuel => fuel_stats(series).map(ChannelSnapshot::Fuel),
    }
}

pub fn temperature_stats(series: &[Reading]) -> Option<TemperatureStats> {
    let last = series.last()?;
    let average = mean(series);

    let mut max = f64::NEG_INFINITY;
    let mut max_time = "";
    for reading in series {
        // strict `>` keeps the first chronological occurrence of the maximum
        if reading.value > max {
            max = reading.value;
            max_time = &reading.time;
        }
    }

    Some(TemperatureStats {
        series: series.to_vec(),
        current: last.value,
        current_ratio_pct: ratio_pct(last.value, average),
        average,
        max,
        max_time: max_time.to_string(),
        max_ratio_pct: ratio_pct(max, average),
    })
}

pub fn load_stats(series: &[Reading]) -> Option<LoadStats> {
    let last = series.last()?;
    let average = mean(series);
    let sum: f64 = series.iter().map(|r| r.value).sum();

    Some(LoadStats {
        series: series.to_vec(),
        current: last.value,
        current_ratio_pct: ratio_pct(last.value, average),
        average,
        sum,
        sum_ratio_pct: ratio_pct(sum, average),
    })
}

pub fn fuel_stats(series: &[Reading]) -> Option<FuelStats> {
    let last = series.last()?;

    let mut min = f64::INFINITY;
    let mut min_time = "";
    for reading in series {
        // `<=` keeps the last chronological occurrence of the minimum,
        // the opposite tie-break of the temperature maximum
        if reading.value <= min {
            min = reading.value;
            min_time = &reading.time;
        }
    }

    // exact equality, matching how the readings were compared upstream
    let duplicates = series.iter().filter(|r| r.value == min).count();
    let empty_count = if min == 0.0 { duplicates } else { 0 };

    Some(FuelStats {
        series: series.to_vec(),
        last_critical: last.value,
        last_critical_time: last.time.clone(),
        min,
        min_time: min_time.to_string(),
        empty_count,
    })
}

/// Deviation from the series average, as a rounded percentage.
///
/// A zero average makes this non-finite; the value is carried into the
/// snapshot as-is rather than clamped, and the presentation layer decides
/// how to render it.
fn ratio_pct(value: f64, average: f64) -> f64 {
    ((value / average - 1.0) * 100.0).round()
}

fn mean(series: &[Reading]) -> f64 {
    series.iter().map(|r| r.value).sum::<f64>() / series.len() as f64
}
