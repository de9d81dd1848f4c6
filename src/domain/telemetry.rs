// Telemetry domain models - channels and readings

/// The three independent telemetry streams of the excavator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Temperature,
    Load,
    Fuel,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Temperature, Channel::Load, Channel::Fuel];

    /// Topic suffix used by the live pub/sub channel for this stream.
    pub fn topic_suffix(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Load => "load",
            Channel::Fuel => "fuel_level",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Load => "load",
            Channel::Fuel => "fuel",
        }
    }
}

/// A single timestamped observation.
///
/// `time` is a fixed-width date-time string. Series ordering and the
/// last-seen dedup marker compare these strings lexicographically; that the
/// wire format sorts correctly is a precondition of the protocol, not
/// something the client validates.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub time: String,
    pub value: f64,
}

impl Reading {
    pub fn new(time: String, value: f64) -> Self {
        Self { time, value }
    }
}

/// Ascending sort by timestamp, the order every series is kept in.
/// `sort_by` is stable, so readings with equal timestamps keep arrival order.
pub fn sort_by_time(readings: &mut [Reading]) {
    readings.sort_by(|a, b| a.time.cmp(&b.time));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_time_is_stable() {
        let mut readings = vec![
            Reading::new("10:01".to_string(), 3.0),
            Reading::new("10:00".to_string(), 1.0),
            Reading::new("10:01".to_string(), 4.0),
        ];
        sort_by_time(&mut readings);

        let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 3.0, 4.0]);
    }
}
