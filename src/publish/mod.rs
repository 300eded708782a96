//! Sensor publication: payload planning and the MQTT sink boundary.

pub mod mqtt;
pub mod planner;

use crate::Result;

/// Delivery guarantee for one message; mirrors MQTT QoS 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
}

/// One message bound for the sink. Discovery messages are retained so
/// Home Assistant can rebuild sensors after a restart.
#[derive(Debug, Clone)]
pub struct SinkMessage {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
    pub qos: QoS,
}

/// Publication sink, opened once per run and shared by every publish call.
pub trait Sink {
    fn publish(&mut self, message: &SinkMessage) -> Result<()>;
}
