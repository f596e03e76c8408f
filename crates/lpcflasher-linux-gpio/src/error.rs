//! Error types for the Linux GPIO backend

use thiserror::Error;

/// Linux GPIO backend errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request GPIO lines
    #[error("Failed to request GPIO lines on '{path}': {source}")]
    LineRequestFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid GPIO line number
    #[error("Invalid GPIO line number for {name}: {value}")]
    InvalidLineNumber { name: &'static str, value: String },

    /// Both dev and gpiochip were given
    #[error("Only one of 'dev' or 'gpiochip' can be specified")]
    ConflictingDevice,

    /// GPIO chip number out of range
    #[error("Maximum gpiochip number supported is 9, got {0}")]
    GpiochipOutOfRange(u32),

    /// Device path is empty
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,

    /// Two bus signals mapped to the same GPIO line
    #[error("{first} and {second} are both mapped to GPIO line {offset}")]
    DuplicateLine {
        first: &'static str,
        second: &'static str,
        offset: u32,
    },
}

/// Result type for Linux GPIO backend operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
