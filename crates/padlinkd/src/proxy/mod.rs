//! The input-forwarding proxy: event mapping, turbo, the fixed-rate
//! worker loop and the connection supervisor.

mod link;
mod mapper;
mod supervisor;
mod turbo;
mod worker;

pub(crate) use link::LinkShared;
pub(crate) use supervisor::ConnectionSupervisor;
pub(crate) use worker::spawn_worker;

use std::time::Duration;

use padlink_emu::Button;
use thiserror::Error;

/// Tunables of one proxy session.
#[derive(Debug, Clone)]
pub(crate) struct ProxySettings {
    /// Target interval of the forwarding loop (8.33 ms = 120 Hz).
    pub tick_interval: Duration,
    /// Turbo phase flip interval, half of the full on/off cycle.
    pub turbo_half_period: Duration,
    /// Button that gates turbo toggling while physically held.
    pub turbo_modifier: Button,
    /// How long shutdown waits for the worker's in-flight tick.
    pub join_timeout: Duration,
    /// Pause after a backend crash before reconnecting.
    pub settle_pause: Duration,
    /// Pause after a transient connect failure.
    pub retry_pause: Duration,
    /// Reconnect ceiling per crash.
    pub max_reconnect_attempts: u32,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_micros(8_333),
            turbo_half_period: Duration::from_millis(25),
            turbo_modifier: Button::Capture,
            join_timeout: Duration::from_secs(5),
            settle_pause: Duration::from_secs(1),
            retry_pause: Duration::from_secs(1),
            max_reconnect_attempts: 5,
        }
    }
}

/// Errors that terminate a proxy session.
#[derive(Debug, Error)]
pub(crate) enum ProxyError {
    #[error("input device error: {0}")]
    Input(#[from] padlink_input::Error),

    #[error("controller backend error: {0}")]
    Backend(#[from] padlink_emu::Error),

    #[error("gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    #[error("failed to spawn the proxy worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("proxy worker panicked")]
    WorkerPanicked,
}
