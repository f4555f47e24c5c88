#[cfg(target_os = "espidf")]
use dsmr_esp::{
    AppConfig, ConnectionManager, CycleOutcome, EspMqttTransport, EspSystem, Indicator, P1Reader,
    StatusLed, TelegramCycle, UartSerial, WifiManager,
};

/// Built-in LED of ESP32 DevKit boards (GPIO2) is active-high.
#[cfg(target_os = "espidf")]
const LED_ACTIVE_LOW: bool = false;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use embedded_svc::mqtt::client::QoS;
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::PinDriver;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys;
    use std::time::Duration;

    // Initialize ESP-IDF system services
    sys::link_patches();

    // Initialize logging
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("ESP32 DSMR P1 Reader");
    log::info!("Initializing...");

    let config = AppConfig::default();
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // LED stays lit until the network is up
    let mut led = StatusLed::new(PinDriver::output(peripherals.pins.gpio2)?, LED_ACTIVE_LOW);
    led.set_active(true);

    let wifi = WifiManager::new(peripherals.modem, sysloop, nvs, &config.wifi)?;
    led.set_active(false);

    // P1 port on UART1, receive only (GPIO16)
    log::info!("Initializing UART1 for P1 input...");
    let uart_config = UartConfig::new().baudrate(config.p1.baud_rate.into());
    let mut uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17, // TX (unused)
        peripherals.pins.gpio16, // RX (P1 data)
        Option::<esp_idf_hal::gpio::Gpio0>::None,
        Option::<esp_idf_hal::gpio::Gpio0>::None,
        &uart_config,
    )?;
    let (_uart_tx, uart_rx) = uart.split();
    let serial = UartSerial::new(uart_rx, config.p1.invert_rx)?;
    log::info!("✅ UART1 initialized ({} baud)", config.p1.baud_rate);

    let transport = EspMqttTransport::new(
        config.mqtt.broker_url.as_str(),
        QoS::AtMostOnce,
        Duration::from_secs(10),
    )?
    .with_wifi(wifi);

    let topics = config.status_topics();
    let link = ConnectionManager::new(transport, FreeRtos, &config.mqtt, &topics);
    let mut cycle = TelegramCycle::new(
        P1Reader::new(serial, config.p1.require_crc),
        link,
        EspSystem::new(),
        led,
        &config.publish,
        topics,
    );

    log::info!("Entering telegram loop...");

    loop {
        if cycle.run_once() == CycleOutcome::Idle {
            // Nothing to do, let the idle task feed the watchdog
            FreeRtos::delay_ms(10);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "dsmr_esp is ESP-IDF firmware; build it for an espidf target (e.g. xtensa-esp32-espidf)"
    );
}
