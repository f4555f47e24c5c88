use super::format::format_value;
use super::telemetry::publish_text;
use crate::dsmr::{FieldSpec, Record};
use crate::network_config::{PublishConfig, TimestampTopics, Topic, TopicStyle};
use crate::transport::MessageSink;
use core::fmt::Write;

/// Turns every present field of a record into one MQTT message.
#[derive(Debug, Clone)]
pub struct FieldPublisher {
    prefix: heapless::String<64>,
    style: TopicStyle,
    timestamps: TimestampTopics,
}

impl FieldPublisher {
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            prefix: config.topic_prefix.clone(),
            style: config.topic_style,
            timestamps: config.timestamp_topics,
        }
    }

    /// Topic a field publishes to; depends only on the field's static identity.
    pub fn topic_for(&self, spec: &FieldSpec) -> Option<Topic> {
        let mut topic = Topic::new();
        let written = match self.style {
            TopicStyle::NameWithUnit if !spec.unit.is_empty() => {
                write!(topic, "{}/{}_{}", self.prefix, spec.name, spec.unit)
            }
            _ => write!(topic, "{}/{}", self.prefix, spec.name),
        };
        written.ok().map(|_| topic)
    }

    /// Publish all present fields in declaration order, returning how many were sent.
    pub fn publish<S: MessageSink>(&self, record: &Record, sink: &mut S) -> usize {
        let mut published = 0;

        for field in record.fields() {
            let Some(value) = field.value else {
                continue;
            };
            let Some(topic) = self.topic_for(field.spec) else {
                log::warn!("Publish: topic for '{}' does not fit, skipped", field.spec.name);
                continue;
            };

            publish_text(sink, &topic, &format_value(value));
            published += 1;

            if let (TimestampTopics::Separate, Some(timestamp)) =
                (self.timestamps, value.timestamp())
            {
                let mut ts_topic = topic.clone();
                if ts_topic.push_str("_timestamp").is_ok() {
                    publish_text(sink, &ts_topic, timestamp);
                }
            }
        }

        log::debug!("Publish: {} fields sent", published);
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsmr::fields::index_of_name;
    use crate::dsmr::{FixedValue, Value, FIELDS};
    use crate::testing::{record_with, RecordingTransport};

    fn publisher(style: TopicStyle, timestamps: TimestampTopics) -> FieldPublisher {
        FieldPublisher::new(&PublishConfig {
            topic_style: style,
            timestamp_topics: timestamps,
            ..PublishConfig::default()
        })
    }

    fn spec(name: &str) -> &'static FieldSpec {
        &FIELDS[index_of_name(name).unwrap()]
    }

    #[test]
    fn topic_styles() {
        let with_unit = publisher(TopicStyle::NameWithUnit, TimestampTopics::Drop);
        let bare = publisher(TopicStyle::Name, TimestampTopics::Drop);

        assert_eq!(
            with_unit.topic_for(spec("power_delivered")).unwrap().as_str(),
            "sensor/dsmr/dsmr-esp/status/power_delivered_kW"
        );
        assert_eq!(
            with_unit.topic_for(spec("electricity_failures")).unwrap().as_str(),
            "sensor/dsmr/dsmr-esp/status/electricity_failures"
        );
        assert_eq!(
            bare.topic_for(spec("power_delivered")).unwrap().as_str(),
            "sensor/dsmr/dsmr-esp/status/power_delivered"
        );
    }

    #[test]
    fn absent_fields_publish_nothing() {
        let mut sink = RecordingTransport::connected();
        let sent =
            publisher(TopicStyle::Name, TimestampTopics::Drop).publish(&Record::new(), &mut sink);
        assert_eq!(sent, 0);
        assert!(sink.messages.is_empty());
    }

    #[test]
    fn each_present_field_publishes_once_in_order() {
        let record = record_with(&[
            ("voltage_l1", Value::Fixed(FixedValue::parse_decimal("230.1").unwrap())),
            ("power_delivered", Value::Fixed(FixedValue::from_milli(1234))),
            ("electricity_failures", Value::Integer(7)),
            ("equipment_id", Value::Text("E0001".into())),
        ]);
        let mut sink = RecordingTransport::connected();

        let sent =
            publisher(TopicStyle::NameWithUnit, TimestampTopics::Drop).publish(&record, &mut sink);

        assert_eq!(sent, 4);
        let topics: Vec<_> = sink.messages.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            topics,
            [
                "sensor/dsmr/dsmr-esp/status/equipment_id",
                "sensor/dsmr/dsmr-esp/status/power_delivered_kW",
                "sensor/dsmr/dsmr-esp/status/electricity_failures",
                "sensor/dsmr/dsmr-esp/status/voltage_l1_V",
            ]
        );
        assert_eq!(sink.payload("sensor/dsmr/dsmr-esp/status/voltage_l1_V"), Some("230.100"));
        assert_eq!(sink.payload("sensor/dsmr/dsmr-esp/status/power_delivered_kW"), Some("1.234"));
        assert_eq!(sink.payload("sensor/dsmr/dsmr-esp/status/electricity_failures"), Some("7"));
        assert_eq!(sink.payload("sensor/dsmr/dsmr-esp/status/equipment_id"), Some("E0001"));
    }

    #[test]
    fn timestamp_topic_is_opt_in() {
        let record = record_with(&[(
            "gas_delivered",
            Value::Timestamped {
                timestamp: "161129200000W".into(),
                value: FixedValue::from_milli(981_443),
            },
        )]);

        let mut sink = RecordingTransport::connected();
        publisher(TopicStyle::NameWithUnit, TimestampTopics::Drop).publish(&record, &mut sink);
        assert_eq!(sink.messages.len(), 1);
        assert_eq!(sink.payload("sensor/dsmr/dsmr-esp/status/gas_delivered_m3"), Some("981.443"));

        let mut sink = RecordingTransport::connected();
        let sent = publisher(TopicStyle::NameWithUnit, TimestampTopics::Separate)
            .publish(&record, &mut sink);
        assert_eq!(sent, 1);
        assert_eq!(sink.messages.len(), 2);
        assert_eq!(
            sink.payload("sensor/dsmr/dsmr-esp/status/gas_delivered_m3_timestamp"),
            Some("161129200000W")
        );
    }
}
