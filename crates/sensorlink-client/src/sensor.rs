/*!
 * Connected sensors.
 *
 * A [`Sensor`] is a cheaply clonable handle to one connected device. All
 * clones alias the same connection: releasing the sensor through any of
 * them (or shutting the client down) invalidates every alias, and later
 * calls through any alias fail with `InvalidHandle`. Memory is reclaimed
 * when the last alias drops.
 */
use std::sync::Arc;

use sensorlink_core::value::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::component::Component;
use crate::error::{ClientError, Result};
use crate::handle::{ComponentInfo, SensorDesc, SensorId};
use crate::io::{PropertyTarget, SensorDevice};
use crate::properties::{self, Property};

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SensorState {
    /// The connection is live
    Connected,
    /// The connection was torn down; all aliases are invalid
    Released,
}

/// Shared state behind every alias of one connected sensor
///
/// Property calls take the state lock for reading, release takes it for
/// writing, so a release never interleaves with an in-flight property call.
#[derive(Debug)]
pub(crate) struct SensorInner {
    id: SensorId,
    desc: SensorDesc,
    device: Box<dyn SensorDevice>,
    components: Vec<ComponentInfo>,
    state: RwLock<SensorState>,
}

impl SensorInner {
    pub(crate) fn new(id: SensorId, desc: SensorDesc, device: Box<dyn SensorDevice>) -> Self {
        let components = device.components();
        debug!(sensor = %id, components = components.len(), "Sensor connected");
        Self {
            id,
            desc,
            device,
            components,
            state: RwLock::new(SensorState::Connected),
        }
    }

    pub(crate) fn id(&self) -> SensorId {
        self.id
    }

    pub(crate) fn desc(&self) -> &SensorDesc {
        &self.desc
    }

    pub(crate) async fn is_connected(&self) -> bool {
        *self.state.read().await == SensorState::Connected
    }

    pub(crate) async fn components(&self) -> Result<Vec<ComponentInfo>> {
        let state = self.state.read().await;
        if *state != SensorState::Connected {
            return Err(ClientError::InvalidHandle);
        }
        Ok(self.components.clone())
    }

    pub(crate) async fn get_property(
        &self,
        target: PropertyTarget,
        property: Property,
    ) -> Result<Value> {
        let state = self.state.read().await;
        if *state != SensorState::Connected {
            return Err(ClientError::InvalidHandle);
        }
        self.device.get_property(target, property).await
    }

    pub(crate) async fn set_property(
        &self,
        target: PropertyTarget,
        property: Property,
        value: Value,
    ) -> Result<()> {
        if !property.is_writable() {
            return Err(ClientError::UnsupportedProperty(property));
        }
        properties::validate_value(property, &value)?;

        let state = self.state.read().await;
        if *state != SensorState::Connected {
            return Err(ClientError::InvalidHandle);
        }
        self.device.set_property(target, property, value).await
    }

    /// Tear the connection down and invalidate every alias
    ///
    /// Fails with `InvalidHandle` when the sensor was already released.
    pub(crate) async fn invalidate(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if *state != SensorState::Connected {
            return Err(ClientError::InvalidHandle);
        }
        *state = SensorState::Released;
        drop(state);

        info!(sensor = %self.id, "Sensor released");
        self.device.disconnect().await
    }
}

/// Handle to a connected sensor
#[derive(Debug, Clone)]
pub struct Sensor {
    inner: Arc<SensorInner>,
}

impl Sensor {
    pub(crate) fn new(inner: Arc<SensorInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Arc<SensorInner> {
        &self.inner
    }

    /// The sensor's identity within its client session
    pub fn id(&self) -> SensorId {
        self.inner.id()
    }

    /// The descriptor the sensor was connected from
    pub fn desc(&self) -> &SensorDesc {
        self.inner.desc()
    }

    /// The device name
    pub fn name(&self) -> &str {
        &self.inner.desc().name
    }

    /// The IO system the sensor is connected through
    pub fn io_type(&self) -> &str {
        &self.inner.desc().io_type
    }

    /// Whether the connection is still live
    pub async fn is_connected(&self) -> bool {
        self.inner.is_connected().await
    }

    /// Handles to all components the sensor exposes
    pub async fn components(&self) -> Result<Vec<Component>> {
        let infos = self.inner.components().await?;
        Ok(infos
            .into_iter()
            .map(|info| Component::new(Arc::clone(&self.inner), info))
            .collect())
    }

    /// The first component of the given type, if the sensor has one
    ///
    /// Returns `None` both when no such component exists and when the
    /// sensor has been released.
    pub async fn get_any_component_of_type(&self, component_type: &str) -> Option<Component> {
        if !self.inner.is_connected().await {
            return None;
        }
        self.inner
            .components
            .iter()
            .find(|c| c.component_type == component_type)
            .map(|info| Component::new(Arc::clone(&self.inner), info.clone()))
    }

    /// Read a sensor-level property
    pub async fn get_property(&self, property: Property) -> Result<Value> {
        self.inner.get_property(PropertyTarget::Sensor, property).await
    }

    /// Write a sensor-level property
    pub async fn set_property<V: Into<Value>>(&self, property: Property, value: V) -> Result<()> {
        self.inner
            .set_property(PropertyTarget::Sensor, property, value.into())
            .await
    }

    /// Read a boolean sensor-level property
    pub async fn get_bool(&self, property: Property) -> Result<bool> {
        let value = self.get_property(property).await?;
        properties::coerce_bool(property, value)
    }

    /// Read an integer sensor-level property
    pub async fn get_int32(&self, property: Property) -> Result<i32> {
        let value = self.get_property(property).await?;
        properties::coerce_int32(property, value)
    }

    /// Read a float sensor-level property
    pub async fn get_float(&self, property: Property) -> Result<f32> {
        let value = self.get_property(property).await?;
        value.as_float().ok_or_else(|| ClientError::InvalidValue {
            property,
            reason: format!("expected float, got {}", value.kind()),
        })
    }

    /// Read a string sensor-level property
    pub async fn get_string(&self, property: Property) -> Result<String> {
        let value = self.get_property(property).await?;
        properties::coerce_string(property, value)
    }

    /// Read an integer-array sensor-level property
    pub async fn get_int32_array(&self, property: Property) -> Result<Vec<i32>> {
        let value = self.get_property(property).await?;
        properties::coerce_int32_array(property, value)
    }
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use crate::io::{EventSink, IoSystem};
    use crate::sim::{SimIoSystem, SIM_DEFAULT_SENSOR};
    use tokio::sync::mpsc;

    async fn connected_sensor() -> Sensor {
        let sim = SimIoSystem::new();
        let descs = sim.list_devices().await.unwrap();
        let (tx, _rx) = mpsc::channel(16);
        let device = sim
            .connect(&descs[0], SensorId(1), EventSink::new(tx))
            .await
            .unwrap();
        Sensor::new(Arc::new(SensorInner::new(
            SensorId(1),
            descs[0].clone(),
            device,
        )))
    }

    #[tokio::test]
    async fn test_sensor_level_properties() {
        let sensor = connected_sensor().await;

        assert_eq!(
            sensor.get_string(Property::DeviceName).await.unwrap(),
            SIM_DEFAULT_SENSOR
        );
        assert_eq!(
            sensor.get_int32_array(Property::FirmwareVersion).await.unwrap(),
            vec![1, 2, 0]
        );
        assert_eq!(sensor.get_float(Property::BatteryLevel).await.unwrap(), 100.0);
        assert!(!sensor.get_bool(Property::BatteryCharging).await.unwrap());

        sensor.set_property(Property::TimeOffset, 25i32).await.unwrap();
        assert_eq!(sensor.get_int32(Property::TimeOffset).await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_read_only_property_rejects_writes() {
        let sensor = connected_sensor().await;

        let err = sensor
            .set_property(Property::SerialNumber, "override")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::UnsupportedProperty(Property::SerialNumber)
        ));
    }

    #[tokio::test]
    async fn test_component_lookup() {
        let sensor = connected_sensor().await;

        let imu = sensor.get_any_component_of_type("imu").await;
        assert!(imu.is_some());
        assert!(sensor.get_any_component_of_type("gnss").await.is_none());
    }

    #[tokio::test]
    async fn test_aliases_invalidated_together() {
        let sensor = connected_sensor().await;
        let alias = sensor.clone();

        sensor.inner().invalidate().await.unwrap();

        assert!(!alias.is_connected().await);
        let err = alias.get_string(Property::DeviceName).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidHandle));
        assert!(alias.get_any_component_of_type("imu").await.is_none());

        // A second release through the other alias fails too
        let err = alias.inner().invalidate().await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidHandle));
    }
}
