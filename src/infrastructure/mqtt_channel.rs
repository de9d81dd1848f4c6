// MQTT live channel - subscribes to a device's telemetry topics on the broker

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};

use crate::application::live_channel::{LiveChannel, LiveEvent, LiveFeed, LiveHandle};
use crate::domain::telemetry::{Channel, Reading};
use crate::errors::TelemetryError;

const EVENT_BUFFER: usize = 64;
const KEEP_ALIVE: Duration = Duration::from_secs(30);

pub struct MqttLiveChannel {
    host: String,
    port: u16,
}

impl MqttLiveChannel {
    pub fn new(host: &str, port: u16) -> Self {
        MqttLiveChannel {
            host: host.to_string(),
            port,
        }
    }
}

fn device_topic(device: &str, channel: Channel) -> String {
    format!("devices/{}/{}", device, channel.topic_suffix())
}

fn channel_for_topic(device: &str, topic: &str) -> Option<Channel> {
    Channel::ALL
        .into_iter()
        .find(|channel| device_topic(device, *channel) == topic)
}

/// Live payloads carry the same reading shape as the bulk endpoint.
#[derive(Debug, Deserialize)]
struct WirePayload {
    time: String,
    value: f64,
}

fn decode_reading(payload: &[u8]) -> Result<Reading, TelemetryError> {
    let wire: WirePayload = serde_json::from_slice(payload)?;
    Ok(Reading::new(wire.time, wire.value))
}

#[async_trait]
impl LiveChannel for MqttLiveChannel {
    async fn open(&self, device: &str) -> Result<LiveFeed, TelemetryError> {
        let mut options = MqttOptions::new(format!("{}-monitor", device), self.host.clone(), self.port);
        options.set_keep_alive(KEEP_ALIVE);

        let (client, eventloop) = AsyncClient::new(options, EVENT_BUFFER);
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let pump_client = client.clone();
        let pump_device = device.to_string();
        tokio::spawn(async move {
            pump(eventloop, pump_client, pump_device, events_tx, ready_tx, shutdown_rx).await;
        });

        // Resolve only once the broker has acknowledged the connection, so
        // callers observe an open link that can actually deliver readings.
        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                return Err(TelemetryError::LiveChannel(
                    "connection task ended before the broker handshake".to_string(),
                ));
            }
        }

        for channel in Channel::ALL {
            client
                .subscribe(device_topic(device, channel), QoS::AtLeastOnce)
                .await
                .map_err(|err| TelemetryError::LiveChannel(err.to_string()))?;
        }

        Ok(LiveFeed {
            events: events_rx,
            handle: LiveHandle::new(shutdown_tx),
        })
    }
}

async fn pump(
    mut eventloop: EventLoop,
    client: AsyncClient,
    device: String,
    events: mpsc::Sender<LiveEvent>,
    ready: oneshot::Sender<Result<(), TelemetryError>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ready = Some(ready);

    loop {
        tokio::select! {
            polled = eventloop.poll() => match polled {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::debug!(device = %device, "broker acknowledged the connection");
                    if let Some(tx) = ready.take() {
                        let _ = tx.send(Ok(()));
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let Some(channel) = channel_for_topic(&device, &publish.topic) else {
                        tracing::warn!(topic = %publish.topic, "publish on unexpected topic ignored");
                        continue;
                    };
                    match decode_reading(&publish.payload) {
                        Ok(reading) => {
                            if events.send(LiveEvent::Reading(channel, reading)).await.is_err() {
                                let _ = client.disconnect().await;
                                return;
                            }
                        }
                        Err(err) => {
                            tracing::warn!(
                                topic = %publish.topic,
                                error = %err,
                                "malformed live payload dropped"
                            );
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(device = %device, error = %err, "mqtt connection failed");
                    match ready.take() {
                        Some(tx) => {
                            let _ = tx.send(Err(TelemetryError::LiveChannel(err.to_string())));
                        }
                        None => {
                            let _ = events.send(LiveEvent::Lost(err.to_string())).await;
                        }
                    }
                    return;
                }
            },
            _ = &mut shutdown => {
                tracing::debug!(device = %device, "closing live channel");
                let _ = client.disconnect().await;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_topics_cover_all_channels() {
        assert_eq!(
            device_topic("excavator-1", Channel::Temperature),
            "devices/excavator-1/temperature"
        );
        assert_eq!(device_topic("excavator-1", Channel::Load), "devices/excavator-1/load");
        assert_eq!(
            device_topic("excavator-1", Channel::Fuel),
            "devices/excavator-1/fuel_level"
        );
    }

    #[test]
    fn test_channel_for_topic_resolves_own_device_only() {
        assert_eq!(
            channel_for_topic("excavator-1", "devices/excavator-1/fuel_level"),
            Some(Channel::Fuel)
        );
        assert_eq!(channel_for_topic("excavator-1", "devices/excavator-2/load"), None);
        assert_eq!(channel_for_topic("excavator-1", "fleet/announcements"), None);
    }

    #[test]
    fn test_decode_reading_accepts_platform_payload() {
        let reading = decode_reading(br#"{"time":"2021-05-01T10:00:00","value":78.5,"unit":"CELSIUS"}"#)
            .unwrap();
        assert_eq!(reading.time, "2021-05-01T10:00:00");
        assert_eq!(reading.value, 78.5);
    }

    #[test]
    fn test_decode_reading_rejects_malformed_payload() {
        assert!(decode_reading(b"not json").is_err());
        assert!(decode_reading(br#"{"time":"2021-05-01T10:00:00"}"#).is_err());
    }
}
