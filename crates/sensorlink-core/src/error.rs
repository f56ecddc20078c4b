/*!
 * Error types for SensorLink.
 *
 * This module defines the base error type shared across the SensorLink
 * crates, together with convenience constructors.
 */
use thiserror::Error;

/// Base error type for SensorLink
#[derive(Error, Debug)]
pub enum Error {
    /// A runtime error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// A configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An event delivery error
    #[error("Event error: {0}")]
    Event(String),

    /// A low-level I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Any other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a runtime error
    pub fn runtime<S: Into<String>>(message: S) -> Self {
        Error::Runtime(message.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Create an event delivery error
    pub fn event<S: Into<String>>(message: S) -> Self {
        Error::Event(message.into())
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Error::Io(message.into())
    }

    /// Create an unspecified error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Error::Other(message.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// Result type for SensorLink core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(matches!(Error::runtime("x"), Error::Runtime(_)));
        assert!(matches!(Error::config("x"), Error::Config(_)));
        assert!(matches!(Error::event("x"), Error::Event(_)));
        assert!(matches!(Error::io("x"), Error::Io(_)));
        assert!(matches!(Error::other("x"), Error::Other(_)));
    }

    #[test]
    fn test_display() {
        let e = Error::config("bad value");
        assert_eq!(e.to_string(), "Configuration error: bad value");

        let e = Error::other("something else");
        assert_eq!(e.to_string(), "something else");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
