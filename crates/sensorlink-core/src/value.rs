/*!
 * Property value model for SensorLink.
 *
 * Sensor components expose typed properties (booleans, 32-bit integers,
 * floats, fixed-length arrays, strings). This module defines the tagged
 * value type carried across the IO-system boundary and the kind
 * discriminant used to validate reads and writes.
 */
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int32,
    /// 32-bit float
    Float,
    /// Array of 32-bit floats
    FloatArray,
    /// Array of 32-bit signed integers
    Int32Array,
    /// UTF-8 string
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int32 => "int32",
            ValueKind::Float => "float",
            ValueKind::FloatArray => "float[]",
            ValueKind::Int32Array => "int32[]",
            ValueKind::String => "string",
        };
        write!(f, "{}", name)
    }
}

/// A typed property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// 32-bit signed integer value
    Int32(i32),
    /// 32-bit float value
    Float(f32),
    /// Array of 32-bit floats
    FloatArray(Vec<f32>),
    /// Array of 32-bit signed integers
    Int32Array(Vec<i32>),
    /// String value
    String(String),
}

impl Value {
    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int32(_) => ValueKind::Int32,
            Value::Float(_) => ValueKind::Float,
            Value::FloatArray(_) => ValueKind::FloatArray,
            Value::Int32Array(_) => ValueKind::Int32Array,
            Value::String(_) => ValueKind::String,
        }
    }

    /// Try to get a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get a 32-bit integer value
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get a float value
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int32(i) => Some(*i as f32),
            _ => None,
        }
    }

    /// Try to get a float array value
    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            Value::FloatArray(a) => Some(a),
            _ => None,
        }
    }

    /// Try to get an integer array value
    pub fn as_int32_array(&self) -> Option<&[i32]> {
        match self {
            Value::Int32Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to get a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number of elements for array values, `None` otherwise
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::FloatArray(a) => Some(a.len()),
            Value::Int32Array(a) => Some(a.len()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<f32>> for Value {
    fn from(a: Vec<f32>) -> Self {
        Value::FloatArray(a)
    }
}

impl From<&[f32]> for Value {
    fn from(a: &[f32]) -> Self {
        Value::FloatArray(a.to_vec())
    }
}

impl From<Vec<i32>> for Value {
    fn from(a: Vec<i32>) -> Self {
        Value::Int32Array(a)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
