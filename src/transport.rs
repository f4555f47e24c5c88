//! Outbound message transport seams.

use core::fmt::Debug;

/// Fire-and-forget publishing of one message per call.
pub trait MessageSink {
    type Error: Debug;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Broker connection underneath the publish path.
pub trait Transport: MessageSink {
    /// One connection attempt.
    fn connect(
        &mut self,
        client_id: &str,
        credentials: Option<Credentials<'_>>,
    ) -> Result<(), Self::Error>;

    fn is_connected(&self) -> bool;

    /// Run the client's event handling (keepalive, inbound dispatch, drop detection).
    fn service_events(&mut self);
}
