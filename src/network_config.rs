use core::fmt::Write;
use serde::{Deserialize, Serialize};

pub const TOPIC_CAPACITY: usize = 128;

pub type Topic = heapless::String<TOPIC_CAPACITY>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub broker_url: heapless::String<128>,
    pub client_id: heapless::String<32>,
    pub username: Option<heapless::String<32>>,
    pub password: Option<heapless::String<64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct P1Config {
    pub baud_rate: u32,
    /// P1 ports drive an inverted (open collector) data line.
    pub invert_rx: bool,
    /// DSMR 2.x meters send no CRC after `!`.
    pub require_crc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicStyle {
    /// `{prefix}/{name}`
    Name,
    /// `{prefix}/{name}_{unit}`, bare name for unitless fields
    NameWithUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampTopics {
    /// Publish only the value of timestamped readings.
    Drop,
    /// Also publish the meter timestamp to `{topic}_timestamp`.
    Separate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    pub topic_prefix: heapless::String<64>,
    pub topic_style: TopicStyle,
    pub timestamp_topics: TimestampTopics,
    /// Publish the time since the previous telegram cycle.
    pub interval_telemetry: bool,
}

/// Cycle and link telemetry topics, all under the publish prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTopics {
    pub decode_success: Topic,
    pub decode_failure: Topic,
    pub free_heap_before: Topic,
    pub free_heap_after: Topic,
    pub parse_time: Topic,
    pub error: Topic,
    pub reconnect_count: Topic,
    pub time_after_prev_msg: Topic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub wifi: WifiConfig,
    pub mqtt: MqttConfig,
    pub p1: P1Config,
    pub publish: PublishConfig,
}

fn bounded<const N: usize>(value: &str) -> heapless::String<N> {
    let mut s = heapless::String::new();
    if s.push_str(value).is_err() {
        log::warn!("Config: '{}' longer than {} bytes, truncated", value, N);
        for ch in value.chars() {
            if s.push(ch).is_err() {
                break;
            }
        }
    }
    s
}

/// `{prefix}/{suffix}`, or `None` when it does not fit a [`Topic`].
pub fn join_topic(prefix: &str, suffix: &str) -> Option<Topic> {
    let mut topic = Topic::new();
    write!(topic, "{}/{}", prefix, suffix).ok()?;
    Some(topic)
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: bounded(option_env!("DSMR_WIFI_SSID").unwrap_or("YOUR_SSID")),
            password: bounded(option_env!("DSMR_WIFI_PASSWORD").unwrap_or("YOUR_PASSWORD")),
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_url: bounded(option_env!("DSMR_MQTT_URL").unwrap_or("mqtt://192.168.2.8:1883")),
            client_id: bounded(option_env!("DSMR_MQTT_CLIENT_ID").unwrap_or("dsmr-esp")),
            username: option_env!("DSMR_MQTT_USERNAME").map(bounded),
            password: option_env!("DSMR_MQTT_PASSWORD").map(bounded),
        }
    }
}

impl Default for P1Config {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            invert_rx: true,
            require_crc: true,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            topic_prefix: bounded("sensor/dsmr/dsmr-esp/status"),
            topic_style: TopicStyle::NameWithUnit,
            timestamp_topics: TimestampTopics::Drop,
            interval_telemetry: true,
        }
    }
}

impl StatusTopics {
    pub fn new(prefix: &str) -> Self {
        let topic = |suffix: &str| {
            join_topic(prefix, suffix).unwrap_or_else(|| {
                log::warn!("Config: topic prefix '{}' too long for '{}'", prefix, suffix);
                bounded(suffix)
            })
        };

        Self {
            decode_success: topic("decode_success"),
            decode_failure: topic("decode_failure"),
            free_heap_before: topic("free_heap_before"),
            free_heap_after: topic("free_heap_after"),
            parse_time: topic("parse_time"),
            error: topic("error"),
            reconnect_count: topic("reconnect_count"),
            time_after_prev_msg: topic("time_after_prev_msg"),
        }
    }
}

impl Default for StatusTopics {
    fn default() -> Self {
        Self::new(PublishConfig::default().topic_prefix.as_str())
    }
}

impl AppConfig {
    pub fn status_topics(&self) -> StatusTopics {
        StatusTopics::new(self.publish.topic_prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_topics_live_under_the_prefix() {
        let topics = StatusTopics::default();
        assert_eq!(topics.decode_success.as_str(), "sensor/dsmr/dsmr-esp/status/decode_success");
        assert_eq!(topics.decode_failure.as_str(), "sensor/dsmr/dsmr-esp/status/decode_failure");
        assert_eq!(
            topics.free_heap_before.as_str(),
            "sensor/dsmr/dsmr-esp/status/free_heap_before"
        );
        assert_eq!(topics.free_heap_after.as_str(), "sensor/dsmr/dsmr-esp/status/free_heap_after");
        assert_eq!(topics.parse_time.as_str(), "sensor/dsmr/dsmr-esp/status/parse_time");
        assert_eq!(topics.error.as_str(), "sensor/dsmr/dsmr-esp/status/error");
        assert_eq!(topics.reconnect_count.as_str(), "sensor/dsmr/dsmr-esp/status/reconnect_count");
        assert_eq!(
            topics.time_after_prev_msg.as_str(),
            "sensor/dsmr/dsmr-esp/status/time_after_prev_msg"
        );
    }

    #[test]
    fn join_topic_rejects_overlong_topics() {
        let long = "x".repeat(TOPIC_CAPACITY);
        assert!(join_topic(&long, "a").is_none());
        assert_eq!(join_topic("a/b", "c").unwrap().as_str(), "a/b/c");
    }

    #[test]
    fn bounded_truncates() {
        let s: heapless::String<4> = bounded("abcdef");
        assert_eq!(s.as_str(), "abcd");
    }

    #[test]
    fn defaults_match_the_reference_installation() {
        let config = AppConfig::default();
        assert_eq!(config.p1.baud_rate, 115_200);
        assert!(config.p1.invert_rx);
        assert_eq!(config.publish.topic_style, TopicStyle::NameWithUnit);
        assert_eq!(config.publish.timestamp_topics, TimestampTopics::Drop);
    }
}
