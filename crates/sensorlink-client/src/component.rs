/*!
 * Sensor components.
 *
 * A [`Component`] addresses one functional unit of a connected sensor (an
 * IMU, for example) for property access. Components share their sensor's
 * lifecycle: once the sensor is released, every component handle obtained
 * from it fails with `InvalidHandle`.
 */
use std::sync::Arc;

use sensorlink_core::value::Value;

use crate::error::{ClientError, Result};
use crate::handle::{ComponentId, ComponentInfo, SensorId};
use crate::io::PropertyTarget;
use crate::properties::{self, Property};
use crate::sensor::SensorInner;

/// Handle to one component of a connected sensor
#[derive(Debug, Clone)]
pub struct Component {
    inner: Arc<SensorInner>,
    info: ComponentInfo,
}

impl Component {
    pub(crate) fn new(inner: Arc<SensorInner>, info: ComponentInfo) -> Self {
        Self { inner, info }
    }

    /// The component's identity within its sensor
    pub fn id(&self) -> ComponentId {
        self.info.id
    }

    /// The component type name (e.g. `"imu"`)
    pub fn component_type(&self) -> &str {
        &self.info.component_type
    }

    /// The sensor this component belongs to
    pub fn sensor_id(&self) -> SensorId {
        self.inner.id()
    }

    fn target(&self) -> PropertyTarget {
        PropertyTarget::Component(self.info.id)
    }

    /// Read a component property
    pub async fn get_property(&self, property: Property) -> Result<Value> {
        self.inner.get_property(self.target(), property).await
    }

    /// Write a component property
    ///
    /// The value is validated against the property's declared kind and
    /// element count before it reaches the device.
    pub async fn set_property<V: Into<Value>>(&self, property: Property, value: V) -> Result<()> {
        self.inner
            .set_property(self.target(), property, value.into())
            .await
    }

    /// Read a boolean component property
    pub async fn get_bool(&self, property: Property) -> Result<bool> {
        let value = self.get_property(property).await?;
        properties::coerce_bool(property, value)
    }

    /// Read an integer component property
    pub async fn get_int32(&self, property: Property) -> Result<i32> {
        let value = self.get_property(property).await?;
        properties::coerce_int32(property, value)
    }

    /// Read a float component property
    pub async fn get_float(&self, property: Property) -> Result<f32> {
        let value = self.get_property(property).await?;
        value.as_float().ok_or_else(|| ClientError::InvalidValue {
            property,
            reason: format!("expected float, got {}", value.kind()),
        })
    }

    /// Read a float-array component property
    pub async fn get_float_array(&self, property: Property) -> Result<Vec<f32>> {
        let value = self.get_property(property).await?;
        properties::coerce_float_array(property, value)
    }
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use crate::handle::{SensorDesc, COMPONENT_TYPE_IMU};
    use crate::io::{EventSink, IoSystem};
    use crate::sensor::Sensor;
    use crate::sim::SimIoSystem;
    use tokio::sync::mpsc;

    async fn imu_component() -> (Sensor, Component) {
        let sim = SimIoSystem::new();
        let descs: Vec<SensorDesc> = sim.list_devices().await.unwrap();
        let (tx, _rx) = mpsc::channel(16);
        let device = sim
            .connect(&descs[0], SensorId(1), EventSink::new(tx))
            .await
            .unwrap();
        let sensor = Sensor::new(Arc::new(SensorInner::new(
            SensorId(1),
            descs[0].clone(),
            device,
        )));
        let imu = sensor
            .get_any_component_of_type(COMPONENT_TYPE_IMU)
            .await
            .unwrap();
        (sensor, imu)
    }

    #[tokio::test]
    async fn test_typed_accessors() {
        let (_sensor, imu) = imu_component().await;

        assert_eq!(imu.component_type(), COMPONENT_TYPE_IMU);
        assert!(!imu.get_bool(Property::StreamData).await.unwrap());
        assert_eq!(imu.get_int32(Property::SamplingRate).await.unwrap(), 200);

        imu.set_property(Property::GyrBias, vec![0.5f32, 0.0, -0.5])
            .await
            .unwrap();
        assert_eq!(
            imu.get_float_array(Property::GyrBias).await.unwrap(),
            vec![0.5, 0.0, -0.5]
        );
    }

    #[tokio::test]
    async fn test_wrong_length_array_rejected() {
        let (_sensor, imu) = imu_component().await;

        let err = imu
            .set_property(Property::AccBias, vec![1.0f32, 2.0])
            .await
            .unwrap_err();
        match err {
            ClientError::InvalidValue { property, reason } => {
                assert_eq!(property, Property::AccBias);
                assert!(reason.contains("expected 3 elements"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_released_sensor_invalidates_component() {
        let (sensor, imu) = imu_component().await;

        sensor.inner().invalidate().await.unwrap();

        let err = imu.get_bool(Property::StreamData).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidHandle));
        let err = imu
            .set_property(Property::StreamData, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidHandle));
    }
}
