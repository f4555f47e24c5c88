//! Host-side fakes shared by the unit tests.

use crate::cycle::SystemMonitor;
use crate::dsmr::fields::index_of_name;
use crate::dsmr::{telegram_crc, Record, SerialPort, Value};
use crate::transport::{Credentials, MessageSink, Transport};
use core::cell::Cell;
use core::convert::Infallible;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use std::collections::VecDeque;

/// Append the CRC a meter would send after `!`.
pub fn frame_telegram(body: &str) -> Vec<u8> {
    let mut data = body.as_bytes().to_vec();
    data.extend_from_slice(format!("{:04X}\r\n", telegram_crc(body.as_bytes())).as_bytes());
    data
}

pub fn record_with(values: &[(&str, Value)]) -> Record {
    let mut record = Record::new();
    for (name, value) in values {
        *record.slot_mut(index_of_name(name).unwrap()) = Some(value.clone());
    }
    record
}

#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub connected: bool,
    pub messages: Vec<(String, String)>,
    pub connect_calls: u32,
    pub service_calls: u32,
    pub fail_next_connects: u32,
    pub fail_publishes: bool,
    pub last_client_id: Option<String>,
    pub last_credentials: Option<(String, String)>,
}

impl RecordingTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Disconnected link whose first `failures` connect attempts fail.
    pub fn failing_connects(failures: u32) -> Self {
        Self {
            fail_next_connects: failures,
            ..Default::default()
        }
    }

    pub fn drop_link(&mut self) {
        self.connected = false;
    }

    /// Last payload published to `topic`.
    pub fn payload(&self, topic: &str) -> Option<&str> {
        self.payloads(topic).last().copied()
    }

    pub fn payloads(&self, topic: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.as_str())
            .collect()
    }

    pub fn topics_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.messages
            .iter()
            .map(|(t, _)| t.as_str())
            .filter(|t| t.starts_with(prefix))
            .collect()
    }
}

impl MessageSink for RecordingTransport {
    type Error = &'static str;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error> {
        if self.fail_publishes || !self.connected {
            return Err("publish rejected");
        }
        self.messages
            .push((topic.to_string(), String::from_utf8_lossy(payload).into_owned()));
        Ok(())
    }
}

impl Transport for RecordingTransport {
    fn connect(
        &mut self,
        client_id: &str,
        credentials: Option<Credentials<'_>>,
    ) -> Result<(), Self::Error> {
        self.connect_calls += 1;
        self.last_client_id = Some(client_id.to_string());
        self.last_credentials =
            credentials.map(|c| (c.username.to_string(), c.password.to_string()));
        if self.fail_next_connects > 0 {
            self.fail_next_connects -= 1;
            return Err("broker unreachable");
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn service_events(&mut self) {
        self.service_calls += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub waits: Vec<u32>,
}

impl DelayMs<u32> for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.waits.push(ms);
    }
}

#[derive(Debug, Default)]
pub struct MemorySerial {
    data: VecDeque<u8>,
}

impl MemorySerial {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.iter().copied().collect(),
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        self.data.extend(data.iter().copied());
    }
}

impl SerialPort for MemorySerial {
    type Error = Infallible;

    fn available(&mut self) -> bool {
        !self.data.is_empty()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.data.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

/// Clock that advances by `step_ms` on every read, heap that shrinks by `heap_step`.
#[derive(Debug)]
pub struct FakeSystem {
    now_ms: Cell<u64>,
    step_ms: u64,
    heap: Cell<u32>,
    heap_step: u32,
}

impl FakeSystem {
    pub fn new(start_ms: u64, step_ms: u64, heap: u32, heap_step: u32) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
            step_ms,
            heap: Cell::new(heap),
            heap_step,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl SystemMonitor for FakeSystem {
    fn free_heap(&self) -> u32 {
        let heap = self.heap.get();
        self.heap.set(heap.saturating_sub(self.heap_step));
        heap
    }

    fn uptime_ms(&self) -> u64 {
        let now = self.now_ms.get();
        self.now_ms.set(now + self.step_ms);
        now
    }
}

/// Output pin remembering every level it was driven to (`true` = high).
#[derive(Debug, Default)]
pub struct FakePin {
    pub levels: Vec<bool>,
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}
