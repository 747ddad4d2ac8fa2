use crate::error::Result;
use crate::packet::InputPacket;

/// Reference to a local Bluetooth adapter a backend can transmit on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRef(pub String);

/// Body and button colours the emulated controller advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub body: [u8; 3],
    pub buttons: [u8; 3],
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            body: [255, 0, 255],
            buttons: [0, 255, 255],
        }
    }
}

/// Identifier of an active emulated-controller session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u32);

impl SessionHandle {
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

/// Diagnostic detail a backend reports for a crashed session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrashReport {
    pub last_error: String,
    pub last_packet: Option<InputPacket>,
}

/// Backend-reported state of one session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Connecting,
    Connected,
    Crashed(CrashReport),
}

/// Contract of a wireless HID backend that impersonates the console's
/// controller.
///
/// Implementations are shared between the proxy worker (state pushes)
/// and the supervising thread (lifecycle), so every method takes `&self`
/// and the type must be `Send + Sync`. `connect` may block for seconds;
/// `set_state` is called at the proxy tick rate and must be cheap.
pub trait EmulatedController: Send + Sync {
    /// Enumerates usable adapters. An empty list is a configuration
    /// error on the caller's side.
    fn list_adapters(&self) -> Result<Vec<AdapterRef>>;

    /// Establishes a session and blocks until the console accepted the
    /// link. `reconnect_hints` are console addresses remembered from
    /// earlier sessions.
    fn connect(
        &self,
        adapter: &AdapterRef,
        appearance: Appearance,
        reconnect_hints: &[String],
    ) -> Result<SessionHandle>;

    /// Tears the session down. Unknown handles are a no-op.
    fn disconnect(&self, session: SessionHandle) -> Result<()>;

    /// Transmits the packet as the controller's current state.
    fn set_state(&self, session: SessionHandle, packet: &InputPacket) -> Result<()>;

    /// Reports the session's health, with diagnostic detail on crash.
    fn query_status(&self, session: SessionHandle) -> Result<SessionStatus>;

    /// Address of the console this session is linked to, once known.
    fn peer_address(&self, session: SessionHandle) -> Result<Option<String>>;
}
