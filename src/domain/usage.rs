// Usage statistics - byte-volume reduction computed once from device reports

use serde::Deserialize;

/// One device report of captured vs. forwarded byte counters, as served in
/// the bulk payload. Unknown extra fields (request counts, reporting window
/// bounds) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatsRecord {
    #[serde(default)]
    pub temp_data_bytes: u64,
    #[serde(default)]
    pub temp_data_bytes_forwarded: u64,
    #[serde(default)]
    pub load_data_bytes: u64,
    #[serde(default)]
    pub load_data_bytes_forwarded: u64,
    #[serde(default)]
    pub fuel_data_bytes: u64,
    #[serde(default)]
    pub fuel_data_bytes_forwarded: u64,
}

/// Byte-volume usage for one channel.
///
/// `used` is what the device forwarded, `collected` the captured share it
/// filtered out, `reduction_ratio` forwarded over captured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelUsage {
    pub collected: u64,
    pub used: u64,
    pub reduction_ratio: f64,
}

/// Usage snapshot for all three channels, computed once per session from
/// the bulk payload and immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageStats {
    pub temperature: ChannelUsage,
    pub load: ChannelUsage,
    pub fuel: ChannelUsage,
}

/// Aggregate the device reports into per-channel usage stats.
///
/// Returns `None` when there are no reports at all. The zero-divisor guard
/// (`reduction_ratio = 0` when nothing was captured) applies to every
/// channel uniformly.
pub fn aggregate(records: &[DeviceStatsRecord]) -> Option<UsageStats> {
    if records.is_empty() {
        return None;
    }

    Some(UsageStats {
        temperature: channel_usage(records, |r| (r.temp_data_bytes, r.temp_data_bytes_forwarded)),
        load: channel_usage(records, |r| (r.load_data_bytes, r.load_data_bytes_forwarded)),
        fuel: channel_usage(records, |r| (r.fuel_data_bytes, r.fuel_data_bytes_forwarded)),
    })
}

fn channel_usage(
    records: &[DeviceStatsRecord],
    counters: impl Fn(&DeviceStatsRecord) -> (u64, u64),
) -> ChannelUsage {
    let mut captured: u64 = 0;
    let mut used: u64 = 0;
    for record in records {
        let (c, f) = counters(record);
        captured += c;
        used += f;
    }

    let reduction_ratio = if captured == 0 {
        0.0
    } else {
        used as f64 / captured as f64
    };

    ChannelUsage {
        collected: captured.saturating_sub(used),
        used,
        reduction_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_ratio() {
        let records = vec![DeviceStatsRecord {
            temp_data_bytes: 100,
            temp_data_bytes_forwarded: 25,
            ..Default::default()
        }];
        let stats = aggregate(&records).unwrap();
        assert_eq!(stats.temperature.reduction_ratio, 0.25);
        assert_eq!(stats.temperature.used, 25);
        assert_eq!(stats.temperature.collected, 75);
    }

    #[test]
    fn test_zero_captured_guards_every_channel() {
        let records = vec![DeviceStatsRecord::default()];
        let stats = aggregate(&records).unwrap();
        assert_eq!(stats.temperature.reduction_ratio, 0.0);
        assert_eq!(stats.load.reduction_ratio, 0.0);
        assert_eq!(stats.fuel.reduction_ratio, 0.0);
    }

    #[test]
    fn test_counters_sum_across_reports() {
        let records = vec![
            DeviceStatsRecord {
                load_data_bytes: 40,
                load_data_bytes_forwarded: 10,
                fuel_data_bytes: 8,
                fuel_data_bytes_forwarded: 8,
                ..Default::default()
            },
            DeviceStatsRecord {
                load_data_bytes: 60,
                load_data_bytes_forwarded: 15,
                ..Default::default()
            },
        ];
        let stats = aggregate(&records).unwrap();
        assert_eq!(stats.load.used, 25);
        assert_eq!(stats.load.collected, 75);
        assert_eq!(stats.load.reduction_ratio, 0.25);
        assert_eq!(stats.fuel.collected, 0);
        assert_eq!(stats.fuel.reduction_ratio, 1.0);
    }

    #[test]
    fn test_no_reports_means_no_stats() {
        assert!(aggregate(&[]).is_none());
    }
}
