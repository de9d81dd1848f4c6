// Console presentation - renders session events as terminal output

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::application::live_channel::LinkState;
use crate::application::monitor_service::{ErrorNotice, TelemetryEvent};
use crate::domain::stats::{ChannelSnapshot, FuelStats, LoadStats, TemperatureStats};
use crate::domain::usage::{ChannelUsage, UsageStats};

/// Drain a session's event stream, printing each update as it arrives.
/// Returns once the session ends and the stream closes.
pub async fn render_events(events: mpsc::Receiver<TelemetryEvent>) {
    let mut stream = ReceiverStream::new(events);
    while let Some(event) = stream.next().await {
        match event {
            TelemetryEvent::Usage(usage) => print_usage(&usage),
            TelemetryEvent::Snapshot(snapshot) => print_snapshot(&snapshot),
            TelemetryEvent::Link(state) => print_link(state),
            TelemetryEvent::Notice(notice) => print_notice(&notice),
        }
    }
}

fn stamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Percentage deltas can be non-finite when the series average is zero.
fn ratio(pct: f64) -> String {
    if pct.is_finite() {
        format!("{:+.0}%", pct)
    } else {
        "n/a".to_string()
    }
}

fn print_snapshot(snapshot: &ChannelSnapshot) {
    match snapshot {
        ChannelSnapshot::Temperature(stats) => print_temperature(stats),
        ChannelSnapshot::Load(stats) => print_load(stats),
        ChannelSnapshot::Fuel(stats) => print_fuel(stats),
    }
}

fn print_temperature(stats: &TemperatureStats) {
    println!(
        "[{}] engine temperature: {:.1} °C ({} vs avg), avg {:.1} °C, max {:.1} °C at {} ({} vs avg), {} readings",
        stamp(),
        stats.current,
        ratio(stats.current_ratio_pct),
        stats.average,
        stats.max,
        stats.max_time,
        ratio(stats.max_ratio_pct),
        stats.series.len(),
    );
}

fn print_load(stats: &LoadStats) {
    println!(
        "[{}] arm load: {:.1} kg ({} vs avg), avg {:.1} kg, total {:.1} kg ({} vs avg), {} readings",
        stamp(),
        stats.current,
        ratio(stats.current_ratio_pct),
        stats.average,
        stats.sum,
        ratio(stats.sum_ratio_pct),
        stats.series.len(),
    );
}

fn print_fuel(stats: &FuelStats) {
    println!(
        "[{}] fuel level: last critical {:.1} l at {}, min {:.1} l at {}, ran empty {} time(s), {} readings",
        stamp(),
        stats.last_critical,
        stats.last_critical_time,
        stats.min,
        stats.min_time,
        stats.empty_count,
        stats.series.len(),
    );
}

fn print_usage(usage: &UsageStats) {
    println!("[{}] data usage since activation", stamp());
    print_channel_usage("temperature", &usage.temperature);
    print_channel_usage("load", &usage.load);
    print_channel_usage("fuel", &usage.fuel);
}

fn print_channel_usage(label: &str, usage: &ChannelUsage) {
    println!(
        "  {:<12} collected {} B, used {} B, reduction ratio {:.2}",
        label, usage.collected, usage.used, usage.reduction_ratio
    );
}

fn print_link(state: LinkState) {
    let text = match state {
        LinkState::Closed => "closed",
        LinkState::Connecting => "connecting",
        LinkState::Open => "open",
    };
    println!("[{}] live link {}", stamp(), text);
}

fn print_notice(notice: &ErrorNotice) {
    if notice.active {
        eprintln!("[{}] !! {}", stamp(), notice.message);
    }
}
