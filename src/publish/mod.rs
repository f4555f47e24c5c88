pub mod format;
pub mod publisher;
pub mod telemetry;

pub use format::format_value;
pub use publisher::FieldPublisher;
pub use telemetry::{publish_number, publish_text};
