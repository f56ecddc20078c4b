/*!
 * Error type for client session operations.
 *
 * Every fallible session, sensor, and component operation returns a
 * [`ClientError`]. Discovery failures are the one exception: they travel
 * the event stream, since listing is asynchronous.
 */
use thiserror::Error;

use crate::properties::Property;

/// Error type for client session operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// The client could not be initialized
    #[error("Failed to initialize client: {0}")]
    InitFailed(String),

    /// A client is already active in this process
    #[error("A client is already active in this process")]
    AlreadyInitialized,

    /// The client has been shut down or was never initialized
    #[error("Client is not initialized")]
    NotInitialized,

    /// No sensor with the given name exists on the IO system
    #[error("Sensor {name} not found on IO system {io_type}")]
    SensorNotFound {
        /// The IO system that was searched
        io_type: String,
        /// The requested sensor name
        name: String,
    },

    /// The requested IO system is not registered
    #[error("IO system not supported: {0}")]
    UnsupportedIoType(String),

    /// A connection attempt failed
    #[error("Failed to connect to sensor: {0}")]
    ConnectionFailed(String),

    /// The operation did not finish within its deadline
    #[error("Operation timed out")]
    Timeout,

    /// The handle refers to a released sensor or a closed client
    #[error("Handle is no longer valid")]
    InvalidHandle,

    /// An asynchronous listing pass is already running
    #[error("Sensor listing is already in progress")]
    ListingInProgress,

    /// The component does not expose the property
    #[error("Property not supported: {0}")]
    UnsupportedProperty(Property),

    /// The value has the wrong kind or length for the property
    #[error("Invalid value for property {property}: {reason}")]
    InvalidValue {
        /// The property being written or read
        property: Property,
        /// What was wrong with the value
        reason: String,
    },

    /// A low-level IO error from the sensor transport
    #[error("I/O error: {0}")]
    Io(String),

    /// An error from the SensorLink core crate
    #[error("Core error: {0}")]
    Core(#[from] sensorlink_core::error::Error),
}

/// Result type for client session operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = ClientError::SensorNotFound {
            io_type: "SimIO".into(),
            name: "TestSensor".into(),
        };
        assert_eq!(e.to_string(), "Sensor TestSensor not found on IO system SimIO");

        let e = ClientError::InvalidValue {
            property: Property::AccBias,
            reason: "expected 3 elements, got 2".into(),
        };
        assert!(e.to_string().contains("AccBias"));
        assert!(e.to_string().contains("expected 3 elements"));
    }

    #[test]
    fn test_from_core_error() {
        let core = sensorlink_core::error::Error::io("device gone");
        let e: ClientError = core.into();
        assert!(matches!(e, ClientError::Core(_)));
    }
}
