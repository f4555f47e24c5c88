//! Broker events as seen by the main loop, and the wait for a CONNACK.

use core::fmt;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Events forwarded from the MQTT client's connection thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinkEvent {
    Connected(bool),
    Disconnected,
    Received { topic: String, len: usize },
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectFailure {
    /// The broker closed the connection before accepting it.
    Refused,
    TimedOut,
    HandlerStopped,
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectFailure::Refused => write!(f, "connection closed before CONNACK"),
            ConnectFailure::TimedOut => write!(f, "no CONNACK in time"),
            ConnectFailure::HandlerStopped => write!(f, "MQTT connection handler stopped"),
        }
    }
}

/// Wait until the broker accepts or drops the connection.
///
/// Every event received is handed to `on_event`, including the one that ends
/// the wait. Returns the broker's `session_present` flag.
pub(crate) fn await_connack(
    rx: &Receiver<LinkEvent>,
    timeout: Duration,
    mut on_event: impl FnMut(&LinkEvent),
) -> Result<bool, ConnectFailure> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(event) => {
                on_event(&event);
                match event {
                    LinkEvent::Connected(session_present) => return Ok(session_present),
                    LinkEvent::Disconnected => return Err(ConnectFailure::Refused),
                    _ => {}
                }
            }
            Err(RecvTimeoutError::Timeout) => return Err(ConnectFailure::TimedOut),
            Err(RecvTimeoutError::Disconnected) => return Err(ConnectFailure::HandlerStopped),
        }
    }
}
