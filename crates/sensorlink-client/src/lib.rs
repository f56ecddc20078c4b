/*!
 * SensorLink Client
 *
 * This crate provides the session layer of SensorLink: client
 * initialization, asynchronous sensor discovery, sensor and component
 * handles with typed property access, and the ordered event queue all
 * sensor activity is delivered through.
 *
 * # Example
 *
 * ```no_run
 * use sensorlink_client::prelude::*;
 *
 * # async fn run() -> sensorlink_client::error::Result<()> {
 * let client = SensorClient::init().await?;
 * let sensor = client.obtain_sensor_by_name("SimIO", "TestSensor", 0).await?;
 *
 * if let Some(imu) = sensor.get_any_component_of_type(COMPONENT_TYPE_IMU).await {
 *     imu.set_property(Property::StreamData, true).await?;
 * }
 *
 * loop {
 *     match client.wait_for_next_event().await {
 *         SensorEvent::ImuSample { data, .. } => println!("a = {:?}", data.a),
 *         SensorEvent::SessionClosed => break,
 *         _ => {}
 *     }
 * }
 * # Ok(())
 * # }
 * ```
 */

#![warn(missing_docs)]

pub mod component;
pub mod error;
pub mod event;
pub mod handle;
pub mod io;
pub mod properties;
pub mod registry;
pub mod sensor;
pub mod session;
#[cfg(feature = "sim")]
pub mod sim;

pub use component::Component;
pub use error::{ClientError, Result};
pub use event::{ImuData, SensorEvent, SensorEventKind};
pub use handle::{ComponentId, ComponentInfo, SensorDesc, SensorId, COMPONENT_TYPE_IMU};
pub use io::{EventSink, IoSystem, PropertyTarget, SensorDevice};
pub use properties::Property;
pub use registry::IoRegistry;
pub use sensor::Sensor;
pub use session::SensorClient;

/// Commonly used types, importable in one line
pub mod prelude {
    pub use crate::component::Component;
    pub use crate::error::{ClientError, Result};
    pub use crate::event::{ImuData, SensorEvent, SensorEventKind};
    pub use crate::handle::{ComponentInfo, SensorDesc, SensorId, COMPONENT_TYPE_IMU};
    pub use crate::properties::Property;
    pub use crate::registry::IoRegistry;
    pub use crate::sensor::Sensor;
    pub use crate::session::SensorClient;
    pub use sensorlink_core::config::Config;
    pub use sensorlink_core::value::{Value, ValueKind};
}

/// SensorLink client crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
