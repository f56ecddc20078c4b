/*!
 * Prelude module for SensorLink Core.
 *
 * This module re-exports commonly used types and functions from the
 * SensorLink Core crate to make them easier to import.
 */

// Re-export error types
pub use crate::error::{Error, Result};

// Re-export value types
pub use crate::value::{Value, ValueKind};

// Re-export config types
pub use crate::config::{Config, ConfigBuilder, SessionConfig, SharedConfig};
