use thiserror::Error;

/// Error type for input device operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No device node with the requested name was found.
    #[error("input device not found: {0}")]
    DeviceNotFound(String),
    /// Reading from or opening the device failed.
    #[error("device read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for input operations.
pub type Result<T> = std::result::Result<T, Error>;
