//! One pass of the firmware main loop: keep the link up, read the P1 port,
//! publish a decoded telegram and the cycle telemetry.

use crate::connection::ConnectionManager;
use crate::dsmr::TelegramSource;
use crate::network_config::{PublishConfig, StatusTopics};
use crate::publish::{publish_number, publish_text, FieldPublisher};
use crate::transport::Transport;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

/// Platform facts sampled for telemetry.
pub trait SystemMonitor {
    fn free_heap(&self) -> u32;

    /// Monotonic milliseconds since boot.
    fn uptime_ms(&self) -> u64;
}

/// Signals that a telegram is being handled.
pub trait Indicator {
    fn set_active(&mut self, active: bool);
}

/// LED on any output pin, active-low when wired to the supply rail.
pub struct StatusLed<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }
}

impl<P: OutputPin> Indicator for StatusLed<P> {
    fn set_active(&mut self, active: bool) {
        let result = if active != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            log::debug!("LED: Failed to switch {}", if active { "on" } else { "off" });
        }
    }
}

/// Counters kept since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounters {
    pub successful: u32,
    pub failed: u32,
    /// Uptime at the end of the previous telegram cycle.
    pub last_cycle_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No complete telegram was waiting.
    Idle,
    Published { fields: usize },
    Failed,
}

pub struct TelegramCycle<S, T, D, M, I> {
    source: S,
    link: ConnectionManager<T, D>,
    monitor: M,
    indicator: I,
    publisher: FieldPublisher,
    topics: StatusTopics,
    interval_telemetry: bool,
    counters: CycleCounters,
}

impl<S, T, D, M, I> TelegramCycle<S, T, D, M, I>
where
    S: TelegramSource,
    T: Transport,
    D: DelayMs<u32>,
    M: SystemMonitor,
    I: Indicator,
{
    pub fn new(
        source: S,
        link: ConnectionManager<T, D>,
        monitor: M,
        indicator: I,
        publish: &PublishConfig,
        topics: StatusTopics,
    ) -> Self {
        Self {
            source,
            link,
            monitor,
            indicator,
            publisher: FieldPublisher::new(publish),
            topics,
            interval_telemetry: publish.interval_telemetry,
            counters: CycleCounters::default(),
        }
    }

    pub fn counters(&self) -> &CycleCounters {
        &self.counters
    }

    pub fn link(&self) -> &ConnectionManager<T, D> {
        &self.link
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn run_once(&mut self) -> CycleOutcome {
        self.link.ensure_connected();
        self.link.service_events();

        if self.source.bytes_available() {
            self.source.poll();
        }
        if !self.source.telegram_available() {
            return CycleOutcome::Idle;
        }

        let start_ms = self.monitor.uptime_ms();
        let sink = self.link.transport_mut();
        publish_number(sink, &self.topics.free_heap_before, self.monitor.free_heap());
        self.indicator.set_active(true);

        let outcome = match self.source.decode() {
            Ok(record) => {
                self.counters.successful += 1;
                let fields = self.publisher.publish(&record, sink);
                log::info!(
                    "P1: Telegram #{} decoded, {} fields published",
                    self.counters.successful,
                    fields
                );
                CycleOutcome::Published { fields }
            }
            Err(e) => {
                self.counters.failed += 1;
                log::warn!("P1: Telegram decode failed (#{}): {}", self.counters.failed, e);
                publish_text(sink, &self.topics.error, &e.to_string());
                CycleOutcome::Failed
            }
        };

        publish_number(sink, &self.topics.decode_success, self.counters.successful);
        publish_number(sink, &self.topics.decode_failure, self.counters.failed);
        publish_number(sink, &self.topics.free_heap_after, self.monitor.free_heap());
        let end_ms = self.monitor.uptime_ms();
        publish_number(sink, &self.topics.parse_time, end_ms.saturating_sub(start_ms));
        self.indicator.set_active(false);

        let now_ms = self.monitor.uptime_ms();
        if self.interval_telemetry {
            if let Some(previous) = self.counters.last_cycle_ms {
                publish_number(
                    sink,
                    &self.topics.time_after_prev_msg,
                    now_ms.saturating_sub(previous),
                );
            }
        }
        self.counters.last_cycle_ms = Some(now_ms);

        outcome
    }
}
