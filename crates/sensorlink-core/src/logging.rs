/*!
 * Logging functionality for SensorLink.
 *
 * This module provides tracing setup and utilities for consistent logging
 * across the SensorLink crates.
 */
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Initialize the logging system with default configuration
pub fn init() -> Result<()> {
    init_with_filter("info")
}

/// Initialize the logging system with a specific filter
///
/// # Arguments
///
/// * `filter` - The log filter string (e.g., "info", "debug", "sensorlink=trace")
pub fn init_with_filter(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .map_err(|e| Error::runtime(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// A type alias for a tracing span
pub type Span = tracing::Span;

/// Create a new span for a session operation
///
/// # Arguments
///
/// * `name` - The name of the operation
/// * `client` - The client token performing the operation
pub fn session_span(name: &str, client: u64) -> Span {
    tracing::info_span!("session", name = %name, client = %client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        // May fail when another test initialized the subscriber first
        let _ = init();
    }

    #[test]
    fn test_session_span() {
        // Whether the span is enabled depends on test ordering (another
        // test may have installed a subscriber), so only check metadata
        let span = session_span("obtain", 1);
        if let Some(meta) = span.metadata() {
            assert_eq!(meta.name(), "session");
        }
    }
}
