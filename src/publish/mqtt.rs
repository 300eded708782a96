//! MQTT sink over rumqttc's synchronous client.
//!
//! The connection event loop runs on a background thread for the lifetime
//! of the process; the pipeline only sees the blocking `publish` calls.

use std::time::Duration;

use rumqttc::{Client, MqttOptions, QoS as MqttQoS};

use crate::publish::{QoS, Sink, SinkMessage};
use crate::{MqttConfig, Result};

pub struct MqttSink {
    client: Client,
}

impl MqttSink {
    /// Open the broker connection. Failure here is fatal to the run;
    /// nothing useful can proceed without the sink.
    pub fn connect(config: &MqttConfig, client_id: &str) -> Result<Self> {
        let mut options = MqttOptions::new(client_id, config.host.as_str(), config.port);
        options.set_keep_alive(Duration::from_secs(60));
        if !config.username.is_empty() {
            options.set_credentials(config.username.as_str(), config.password.as_str());
        }

        let (client, mut connection) = Client::new(options, 64);

        std::thread::spawn(move || {
            for event in connection.iter() {
                if let Err(e) = event {
                    log::warn!("MQTT connection error: {}", e);
                    std::thread::sleep(Duration::from_secs(1));
                }
            }
        });

        log::info!("Connected to MQTT broker at {}:{}", config.host, config.port);
        Ok(MqttSink { client })
    }

    /// Flush and drop the connection at the end of the run.
    pub fn disconnect(self) {
        if let Err(e) = self.client.disconnect() {
            log::warn!("MQTT disconnect failed: {}", e);
        }
    }
}

impl Sink for MqttSink {
    fn publish(&mut self, message: &SinkMessage) -> Result<()> {
        let qos = match message.qos {
            QoS::AtMostOnce => MqttQoS::AtMostOnce,
            QoS::AtLeastOnce => MqttQoS::AtLeastOnce,
        };
        self.client.publish(
            message.topic.as_str(),
            qos,
            message.retain,
            message.payload.as_bytes(),
        )?;
        log::debug!("Published {} ({} bytes)", message.topic, message.payload.len());
        Ok(())
    }
}
