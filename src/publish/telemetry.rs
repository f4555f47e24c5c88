use crate::transport::MessageSink;
use core::fmt::Display;

/// Publish a number as decimal ASCII; failures are logged and dropped.
pub fn publish_number<S: MessageSink>(sink: &mut S, topic: &str, value: impl Display) {
    publish_text(sink, topic, &value.to_string());
}

pub fn publish_text<S: MessageSink>(sink: &mut S, topic: &str, text: &str) {
    if let Err(e) = sink.publish(topic, text.as_bytes()) {
        log::warn!("Publish to '{}' failed: {:?}", topic, e);
    }
}
