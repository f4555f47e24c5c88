use crate::network_config::{MqttConfig, StatusTopics, Topic};
use crate::publish::publish_number;
use crate::transport::{Credentials, Transport};
use core::time::Duration;
use embedded_hal::blocking::delay::DelayMs;

/// Connect attempts that wait [`SHORT_BACKOFF`] before the next try.
pub const SHORT_RETRIES: u32 = 5;
pub const SHORT_BACKOFF: Duration = Duration::from_secs(5);
pub const LONG_BACKOFF: Duration = Duration::from_secs(30);

/// Wait after the `retry`-th consecutive failed attempt (0-based).
pub fn backoff_delay(retry: u32) -> Duration {
    if retry < SHORT_RETRIES {
        SHORT_BACKOFF
    } else {
        LONG_BACKOFF
    }
}

/// Keeps the broker link up, blocking until it is.
pub struct ConnectionManager<T, D> {
    transport: T,
    delay: D,
    client_id: heapless::String<32>,
    username: Option<heapless::String<32>>,
    password: Option<heapless::String<64>>,
    reconnect_topic: Topic,
    reconnects: u32,
}

impl<T, D> ConnectionManager<T, D>
where
    T: Transport,
    D: DelayMs<u32>,
{
    pub fn new(transport: T, delay: D, mqtt: &MqttConfig, topics: &StatusTopics) -> Self {
        Self {
            transport,
            delay,
            client_id: mqtt.client_id.clone(),
            username: mqtt.username.clone(),
            password: mqtt.password.clone(),
            reconnect_topic: topics.reconnect_count.clone(),
            reconnects: 0,
        }
    }

    /// Successful connects since boot, the first one included.
    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn service_events(&mut self) {
        self.transport.service_events();
    }

    /// Return once connected, retrying with backoff for as long as it takes.
    ///
    /// Returns the number of failed attempts made on the way.
    pub fn ensure_connected(&mut self) -> u32 {
        let mut retry = 0u32;

        while !self.transport.is_connected() {
            let credentials = self.username.as_ref().map(|username| Credentials {
                username: username.as_str(),
                password: self.password.as_ref().map(|p| p.as_str()).unwrap_or(""),
            });

            match self.transport.connect(self.client_id.as_str(), credentials) {
                Ok(()) => {
                    self.reconnects += 1;
                    log::info!(
                        "MQTT: Connected as '{}' after {} failed attempts (connect #{})",
                        self.client_id,
                        retry,
                        self.reconnects
                    );
                    publish_number(&mut self.transport, &self.reconnect_topic, self.reconnects);
                    break;
                }
                Err(e) => {
                    let wait = backoff_delay(retry);
                    log::warn!(
                        "MQTT: Connect attempt #{} failed, retry in {}s: {:?}",
                        retry + 1,
                        wait.as_secs(),
                        e
                    );
                    self.delay.delay_ms(wait.as_millis() as u32);
                    retry += 1;
                }
            }
        }

        retry
    }
}
