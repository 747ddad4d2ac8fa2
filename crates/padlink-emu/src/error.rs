use thiserror::Error;

/// Error type at the emulated-controller boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable Bluetooth adapter is present. Fatal at startup.
    #[error("no usable bluetooth adapter found")]
    NoAdapter,
    /// The adapter is momentarily claimed by something else. Clears on
    /// its own; reconnection retries after a pause.
    #[error("bluetooth adapter is currently in use")]
    AdapterBusy,
    /// The referenced session does not exist (anymore).
    #[error("no active session with id {0}")]
    StaleSession(u32),
    /// A generic backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Whether the condition is expected to clear without intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::AdapterBusy)
    }
}

/// Convenient result alias for backend operations.
pub type Result<T> = std::result::Result<T, Error>;
