use crate::network_config::WifiConfig;
use anyhow::Result;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};
use std::net::Ipv4Addr;

/// Station-mode WiFi, connected once at boot.
pub struct WifiManager {
    wifi: Box<BlockingWifi<EspWifi<'static>>>,
}

impl WifiManager {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &WifiConfig,
    ) -> Result<Self> {
        info!("🌐 WiFi: Creating EspWifi instance...");
        let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;

        info!("🌐 WiFi: Configuring for SSID '{}'...", config.ssid);
        esp_wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config.ssid.clone(),
            auth_method: AuthMethod::WPA2Personal,
            password: config.password.clone(),
            ..Default::default()
        }))?;

        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        wifi.start()?;
        info!("✅ WiFi: Started");

        info!("🌐 WiFi: Connecting to '{}'...", config.ssid);
        wifi.connect()?;
        wifi.wait_netif_up()?;

        let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
        info!("📡 WiFi: DHCP info: {:?}", ip_info);
        info!("✅ WiFi: Connected, IP address: {}", ip_info.ip);

        Ok(Self {
            wifi: Box::new(wifi),
        })
    }

    pub fn get_ip(&self) -> Result<Ipv4Addr> {
        let ip_info = self.wifi.wifi().sta_netif().get_ip_info()?;
        Ok(ip_info.ip)
    }

    /// Rejoin the configured network after the station dropped off.
    pub fn ensure_connected(&mut self) -> Result<()> {
        if self.wifi.is_connected().unwrap_or(false) {
            return Ok(());
        }
        warn!("🌐 WiFi: Link lost, reconnecting...");
        self.wifi.connect()?;
        self.wifi.wait_netif_up()?;
        info!("✅ WiFi: Reconnected, IP address: {}", self.get_ip()?);
        Ok(())
    }
}
