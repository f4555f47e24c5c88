//! ESP32 DSMR P1 Smart Meter Reader Library
//!
//! This library reads P1 telegrams from a Dutch/Belgian smart meter and
//! republishes every decoded field, plus cycle telemetry, over MQTT.
//! Device drivers are only built for ESP-IDF targets; everything else runs
//! and is tested on the host.

pub mod connection;
pub mod cycle;
pub mod dsmr;
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
mod link;
pub mod network_config;
pub mod publish;
pub mod transport;

#[cfg(target_os = "espidf")]
pub mod board;
#[cfg(target_os = "espidf")]
pub mod mqtt;
#[cfg(target_os = "espidf")]
pub mod wifi;

#[cfg(test)]
mod testing;

pub use connection::{backoff_delay, ConnectionManager};
pub use cycle::{CycleCounters, CycleOutcome, Indicator, StatusLed, SystemMonitor, TelegramCycle};
pub use dsmr::{DecodeError, FixedValue, P1Reader, Record, SerialPort, TelegramSource, Value};
pub use network_config::{
    AppConfig, MqttConfig, P1Config, PublishConfig, StatusTopics, TimestampTopics, TopicStyle,
    WifiConfig,
};
pub use publish::{format_value, FieldPublisher};
pub use transport::{Credentials, MessageSink, Transport};

#[cfg(target_os = "espidf")]
pub use board::{EspSystem, UartSerial};
#[cfg(target_os = "espidf")]
pub use mqtt::EspMqttTransport;
#[cfg(target_os = "espidf")]
pub use wifi::WifiManager;
