/*!
 * Typed sensor and component properties.
 *
 * Properties are an explicit enum rather than stringly-typed ids: each
 * property declares the value kind it carries, the expected element count
 * for array properties, and whether it accepts writes. The session layer
 * validates values against these declarations before anything crosses the
 * IO-system boundary, so backends only ever see well-formed writes.
 */
use std::fmt;

use serde::{Deserialize, Serialize};
use sensorlink_core::value::{Value, ValueKind};

use crate::error::{ClientError, Result};

/// A property of a sensor or one of its components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    /// Human-readable device name (string, read-only)
    DeviceName,
    /// Device serial number (string, read-only)
    SerialNumber,
    /// Firmware version as major/minor/patch (int32[3], read-only)
    FirmwareVersion,
    /// Battery charge level in percent (float, read-only)
    BatteryLevel,
    /// Whether the battery is currently charging (bool, read-only)
    BatteryCharging,
    /// Device clock offset against the host (int32)
    TimeOffset,

    /// Whether the component streams data samples (bool)
    StreamData,
    /// Sample output rate in Hz (int32)
    SamplingRate,
    /// Whether samples include the orientation quaternion (bool)
    OutputQuat,
    /// Whether samples include Euler angles (bool)
    OutputEuler,
    /// Accelerometer bias vector (float[3])
    AccBias,
    /// Gyroscope bias vector (float[3])
    GyrBias,
    /// Magnetometer bias vector (float[3])
    MagBias,
    /// Active orientation filter mode (int32)
    FilterMode,
}

impl Property {
    /// The value kind this property carries
    pub fn kind(&self) -> ValueKind {
        match self {
            Property::DeviceName | Property::SerialNumber => ValueKind::String,
            Property::FirmwareVersion => ValueKind::Int32Array,
            Property::BatteryLevel => ValueKind::Float,
            Property::BatteryCharging | Property::StreamData => ValueKind::Bool,
            Property::OutputQuat | Property::OutputEuler => ValueKind::Bool,
            Property::TimeOffset | Property::SamplingRate | Property::FilterMode => {
                ValueKind::Int32
            }
            Property::AccBias | Property::GyrBias | Property::MagBias => ValueKind::FloatArray,
        }
    }

    /// The required element count for array properties, `None` otherwise
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Property::FirmwareVersion => Some(3),
            Property::AccBias | Property::GyrBias | Property::MagBias => Some(3),
            _ => None,
        }
    }

    /// Whether the property accepts writes
    pub fn is_writable(&self) -> bool {
        !matches!(
            self,
            Property::DeviceName
                | Property::SerialNumber
                | Property::FirmwareVersion
                | Property::BatteryLevel
                | Property::BatteryCharging
        )
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Validate a value against a property's declared kind and length
///
/// Returns `InvalidValue` on a kind mismatch or a wrong element count.
pub fn validate_value(property: Property, value: &Value) -> Result<()> {
    if value.kind() != property.kind() {
        return Err(ClientError::InvalidValue {
            property,
            reason: format!("expected {}, got {}", property.kind(), value.kind()),
        });
    }

    if let Some(expected) = property.array_len() {
        let actual = value.array_len().unwrap_or(0);
        if actual != expected {
            return Err(ClientError::InvalidValue {
                property,
                reason: format!("expected {} elements, got {}", expected, actual),
            });
        }
    }

    Ok(())
}

/// Coerce a value read from a backend into a boolean
pub(crate) fn coerce_bool(property: Property, value: Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| ClientError::InvalidValue {
        property,
        reason: format!("expected bool, got {}", value.kind()),
    })
}

/// Coerce a value read from a backend into a 32-bit integer
pub(crate) fn coerce_int32(property: Property, value: Value) -> Result<i32> {
    value.as_int32().ok_or_else(|| ClientError::InvalidValue {
        property,
        reason: format!("expected int32, got {}", value.kind()),
    })
}

/// Coerce a value read from a backend into a float array
pub(crate) fn coerce_float_array(property: Property, value: Value) -> Result<Vec<f32>> {
    match value {
        Value::FloatArray(a) => Ok(a),
        other => Err(ClientError::InvalidValue {
            property,
            reason: format!("expected float[], got {}", other.kind()),
        }),
    }
}

/// Coerce a value read from a backend into an integer array
pub(crate) fn coerce_int32_array(property: Property, value: Value) -> Result<Vec<i32>> {
    match value {
        Value::Int32Array(a) => Ok(a),
        other => Err(ClientError::InvalidValue {
            property,
            reason: format!("expected int32[], got {}", other.kind()),
        }),
    }
}

/// Coerce a value read from a backend into a string
pub(crate) fn coerce_string(property: Property, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ClientError::InvalidValue {
            property,
            reason: format!("expected string, got {}", other.kind()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Property::StreamData.kind(), ValueKind::Bool);
        assert_eq!(Property::SamplingRate.kind(), ValueKind::Int32);
        assert_eq!(Property::AccBias.kind(), ValueKind::FloatArray);
        assert_eq!(Property::FirmwareVersion.kind(), ValueKind::Int32Array);
        assert_eq!(Property::DeviceName.kind(), ValueKind::String);
    }

    #[test]
    fn test_array_lengths() {
        assert_eq!(Property::AccBias.array_len(), Some(3));
        assert_eq!(Property::FirmwareVersion.array_len(), Some(3));
        assert_eq!(Property::StreamData.array_len(), None);
    }

    #[test]
    fn test_writability() {
        assert!(Property::StreamData.is_writable());
        assert!(Property::GyrBias.is_writable());
        assert!(!Property::FirmwareVersion.is_writable());
        assert!(!Property::SerialNumber.is_writable());
    }

    #[test]
    fn test_validate_kind_mismatch() {
        let err = validate_value(Property::StreamData, &Value::Int32(1)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidValue { property: Property::StreamData, .. }));
    }

    #[test]
    fn test_validate_array_length() {
        let ok = validate_value(Property::AccBias, &Value::FloatArray(vec![0.0; 3]));
        assert!(ok.is_ok());

        let err = validate_value(Property::AccBias, &Value::FloatArray(vec![0.0; 2])).unwrap_err();
        match err {
            ClientError::InvalidValue { reason, .. } => {
                assert!(reason.contains("expected 3 elements"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_coercions() {
        assert!(coerce_bool(Property::StreamData, Value::Bool(true)).unwrap());
        assert_eq!(coerce_int32(Property::SamplingRate, Value::Int32(100)).unwrap(), 100);
        assert!(coerce_bool(Property::StreamData, Value::Float(1.0)).is_err());
        assert_eq!(
            coerce_float_array(Property::AccBias, Value::FloatArray(vec![1.0, 2.0, 3.0])).unwrap(),
            vec![1.0, 2.0, 3.0]
        );
    }
}
