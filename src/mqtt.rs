use crate::link::{await_connack, LinkEvent};
use crate::transport::{Credentials, MessageSink, Transport};
use crate::wifi::WifiManager;
use anyhow::{anyhow, Result};
use embedded_svc::mqtt::client::QoS;
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};
use log::{debug, info, warn};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

/// [`Transport`] over the ESP-IDF MQTT client.
///
/// Each `connect` builds a fresh client; the previous one, if any, is
/// dropped together with its connection thread.
pub struct EspMqttTransport {
    broker_url: heapless::String<128>,
    qos: QoS,
    connect_timeout: Duration,
    client: Option<EspMqttClient<'static>>,
    events: Option<Receiver<LinkEvent>>,
    connected: bool,
    wifi: Option<WifiManager>,
}

impl EspMqttTransport {
    pub fn new(broker_url: &str, qos: QoS, connect_timeout: Duration) -> Result<Self> {
        let mut url = heapless::String::new();
        url.push_str(broker_url)
            .map_err(|_| anyhow!("Broker URL too long (max 128 chars)"))?;

        info!("Initializing MQTT transport...");
        info!("  Broker: {}", broker_url);

        Ok(Self {
            broker_url: url,
            qos,
            connect_timeout,
            client: None,
            events: None,
            connected: false,
            wifi: None,
        })
    }

    /// Rejoin WiFi first whenever a broker connect is attempted.
    pub fn with_wifi(mut self, wifi: WifiManager) -> Self {
        self.wifi = Some(wifi);
        self
    }

    fn teardown(&mut self) {
        if self.client.take().is_some() {
            debug!("MQTT: Dropping previous client");
        }
        self.events = None;
        self.connected = false;
    }

    fn handle(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::Connected(session_present) => {
                info!("✅ MQTT connected to broker (session_present: {})", session_present);
                self.connected = true;
            }
            LinkEvent::Disconnected => {
                warn!("🔌 MQTT disconnected from broker");
                self.connected = false;
            }
            LinkEvent::Received { topic, len } => {
                info!("📩 MQTT received on '{}': {} bytes", topic, len);
            }
            LinkEvent::Error(e) => {
                warn!("❌ MQTT error: {}", e);
            }
        }
    }
}

impl MessageSink for EspMqttTransport {
    type Error = anyhow::Error;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| anyhow!("MQTT client not connected"))?;
        client.enqueue(topic, self.qos, false, payload)?;

        debug!("📤 MQTT enqueued publish to '{}': {} bytes", topic, payload.len());
        Ok(())
    }
}

impl Transport for EspMqttTransport {
    fn connect(&mut self, client_id: &str, credentials: Option<Credentials<'_>>) -> Result<()> {
        self.teardown();

        if let Some(wifi) = self.wifi.as_mut() {
            wifi.ensure_connected()?;
        }

        info!("🔄 MQTT connecting to {} as '{}'...", self.broker_url, client_id);

        let mqtt_config = MqttClientConfiguration {
            client_id: Some(client_id),
            username: credentials.map(|c| c.username),
            password: credentials.map(|c| c.password),
            keep_alive_interval: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let (client, mut connection) =
            EspMqttClient::new(self.broker_url.as_str(), &mqtt_config)?;
        let (tx, rx) = mpsc::channel();

        std::thread::Builder::new()
            .stack_size(8192)
            .name("mqtt_conn".to_string())
            .spawn(move || {
                info!("MQTT connection handler started");
                // Ends once the client is dropped or nobody listens anymore
                while let Ok(event) = connection.next() {
                    let forwarded = match event.payload() {
                        EventPayload::Connected(session_present) => {
                            LinkEvent::Connected(session_present)
                        }
                        EventPayload::Disconnected => LinkEvent::Disconnected,
                        EventPayload::Received {
                            topic: Some(topic),
                            data,
                            ..
                        } => LinkEvent::Received {
                            topic: topic.to_string(),
                            len: data.len(),
                        },
                        EventPayload::Error(e) => LinkEvent::Error(format!("{:?}", e)),
                        _ => continue,
                    };
                    if tx.send(forwarded).is_err() {
                        break;
                    }
                }
                info!("🔌 MQTT connection handler exiting");
            })?;

        // SAFETY: the client owns copies of its configuration strings and is
        // kept until the next connect attempt replaces it
        let client_static: EspMqttClient<'static> = unsafe { std::mem::transmute(client) };
        self.client = Some(client_static);

        match await_connack(&rx, self.connect_timeout, |event| self.handle(event)) {
            Ok(_) => {
                self.events = Some(rx);
                Ok(())
            }
            Err(failure) => {
                self.teardown();
                Err(anyhow!("MQTT connect to {} failed: {}", self.broker_url, failure))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn service_events(&mut self) {
        loop {
            let next = match self.events.as_ref() {
                Some(rx) => rx.try_recv(),
                None => return,
            };
            match next {
                Ok(event) => self.handle(&event),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    warn!("🔌 MQTT connection handler gone, marking link down");
                    self.teardown();
                    return;
                }
            }
        }
    }
}
