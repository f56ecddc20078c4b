/*!
 * SensorLink Core
 *
 * This crate provides the foundation for the SensorLink sensor-session
 * system: the shared error type, the typed property value model,
 * configuration, and logging.
 */

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod value;

/// Re-export of dependencies that are part of the public API
pub mod deps {
    pub use serde;
    pub use tokio;
    pub use tracing;
}

/// SensorLink core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization
pub fn init() -> Result<(), error::Error> {
    logging::init()?;
    tracing::info!("SensorLink Core {} initialized", VERSION);
    Ok(())
}
