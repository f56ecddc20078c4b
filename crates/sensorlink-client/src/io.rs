/*!
 * The IO-system boundary.
 *
 * Device transport, wire protocols, and hardware decoding live behind the
 * [`IoSystem`] and [`SensorDevice`] traits; the session manager never sees
 * anything below them. Backends deliver asynchronous activity (samples,
 * disconnects) through the [`EventSink`] handed to them at connect time,
 * which feeds the owning client's ordered event queue.
 */
use std::fmt::Debug;

use async_trait::async_trait;
use sensorlink_core::value::Value;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::event::SensorEvent;
use crate::handle::{ComponentId, ComponentInfo, SensorDesc, SensorId};
use crate::properties::Property;

/// Which part of a sensor a property call addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyTarget {
    /// The sensor itself (device name, firmware version, ...)
    Sensor,
    /// One of the sensor's components
    Component(ComponentId),
}

/// Sink through which a backend pushes events into the client queue
///
/// Sends preserve arrival order and never drop an event while the session
/// is open; once the session closes, `send` reports `false` and the backend
/// should wind down.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<SensorEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::Sender<SensorEvent>) -> Self {
        Self { tx }
    }

    /// Deliver an event to the owning client
    ///
    /// Returns `false` if the session has been shut down.
    pub async fn send(&self, event: SensorEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }
}

/// One IO system (transport family) sensors can be reached through
#[async_trait]
pub trait IoSystem: Send + Sync + Debug {
    /// The IO-type name callers use to address this system (e.g. `"SimIO"`)
    fn name(&self) -> &str;

    /// List the devices currently reachable through this system
    async fn list_devices(&self) -> Result<Vec<SensorDesc>>;

    /// Connect to a device and start its background activity
    ///
    /// The returned device must stamp all events it emits through `sink`
    /// with `sensor_id`.
    async fn connect(
        &self,
        desc: &SensorDesc,
        sensor_id: SensorId,
        sink: EventSink,
    ) -> Result<Box<dyn SensorDevice>>;
}

/// A connected device, owned by the session on behalf of the caller
#[async_trait]
pub trait SensorDevice: Send + Sync + Debug {
    /// The components this device exposes
    fn components(&self) -> Vec<ComponentInfo>;

    /// Read a property from the device
    async fn get_property(&self, target: PropertyTarget, property: Property) -> Result<Value>;

    /// Write a property to the device
    ///
    /// The session validates value kind and length before calling this, so
    /// implementations only need to check whether they support the property.
    async fn set_property(
        &self,
        target: PropertyTarget,
        property: Property,
        value: Value,
    ) -> Result<()>;

    /// Tear down the connection and stop background activity
    async fn disconnect(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SensorEventKind;

    #[tokio::test]
    async fn test_event_sink_send() {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = EventSink::new(tx);

        assert!(sink.send(SensorEvent::SessionClosed).await);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind(), SensorEventKind::SessionClosed);
    }

    #[tokio::test]
    async fn test_event_sink_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        let sink = EventSink::new(tx);
        drop(rx);

        assert!(!sink.send(SensorEvent::SessionClosed).await);
    }
}
