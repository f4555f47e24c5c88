use crate::cycle::SystemMonitor;
use crate::dsmr::SerialPort;
use anyhow::Result;
use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartRxDriver;
use esp_idf_svc::sys::{self, esp, EspError};
use std::time::Instant;

/// Heap and uptime readings from ESP-IDF.
pub struct EspSystem {
    boot: Instant,
}

impl Default for EspSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl EspSystem {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl SystemMonitor for EspSystem {
    fn free_heap(&self) -> u32 {
        unsafe { sys::esp_get_free_heap_size() }
    }

    fn uptime_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }
}

/// P1 port on a UART receiver.
pub struct UartSerial<'d> {
    rx: UartRxDriver<'d>,
}

impl<'d> UartSerial<'d> {
    pub fn new(rx: UartRxDriver<'d>, invert_rx: bool) -> Result<Self> {
        if invert_rx {
            esp!(unsafe {
                sys::uart_set_line_inverse(rx.port(), sys::uart_signal_inv_t_UART_SIGNAL_RXD_INV)
            })?;
            log::info!("P1: UART RX line inverted");
        }
        Ok(Self { rx })
    }
}

impl SerialPort for UartSerial<'_> {
    type Error = EspError;

    fn available(&mut self) -> bool {
        self.rx.count().map(|n| n > 0).unwrap_or(false)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.rx.read(buf, NON_BLOCK)
    }
}
