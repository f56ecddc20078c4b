/*!
 * Identity types for sensors and components.
 *
 * Handles are opaque, non-reusable tokens minted by the session. Validity
 * is tracked by the session and sensor state machines, never by sentinel
 * values inside the token itself.
 */
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a connected sensor, unique within one client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SensorId(pub(crate) u64);

impl SensorId {
    /// The raw token value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor-{}", self.0)
    }
}

/// Identity of a component, unique within its owning sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
    /// The raw token value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component-{}", self.0)
    }
}

/// Immutable description of a sensor produced during discovery
///
/// A descriptor identifies a device on a specific IO system and can be
/// consumed by [`SensorClient::obtain_sensor`](crate::SensorClient::obtain_sensor)
/// to establish a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDesc {
    /// The device name
    pub name: String,
    /// The device serial number, when the IO system reports one
    pub serial: Option<String>,
    /// The IO system the device is reachable through
    pub io_type: String,
    /// IO-system specific address (bus id, baud-rate hint, ...)
    pub identifier: u64,
}

/// Description of one component of a connected sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// The component identity, scoped to its owning sensor
    pub id: ComponentId,
    /// The component type name (e.g. `"imu"`)
    pub component_type: String,
}

/// The component type name of inertial measurement units
pub const COMPONENT_TYPE_IMU: &str = "imu";
