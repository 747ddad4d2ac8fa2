use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use padlink_emu::SessionHandle;

const NO_SESSION: u32 = u32::MAX;

/// Lifecycle of the proxy loop as observed across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopPhase {
    Idle,
    Running,
    Stopped,
    Crashed,
}

impl LoopPhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => LoopPhase::Running,
            2 => LoopPhase::Stopped,
            3 => LoopPhase::Crashed,
            _ => LoopPhase::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            LoopPhase::Idle => 0,
            LoopPhase::Running => 1,
            LoopPhase::Stopped => 2,
            LoopPhase::Crashed => 3,
        }
    }
}

/// The only mutable state shared between the proxy worker and the
/// supervising thread. Everything else is owned by exactly one thread.
#[derive(Debug)]
pub(crate) struct LinkShared {
    /// Stop request flag, checked once per tick by the worker.
    running: AtomicBool,
    /// Loop lifecycle, written by the worker (and by spawn).
    phase: AtomicU8,
    /// Packet pushes are gated on this; owned by the supervisor.
    connected: AtomicBool,
    /// Raw id of the live session, `NO_SESSION` when there is none.
    session: AtomicU32,
}

impl LinkShared {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            phase: AtomicU8::new(LoopPhase::Idle.as_u8()),
            connected: AtomicBool::new(false),
            session: AtomicU32::new(NO_SESSION),
        }
    }

    pub fn begin_running(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.phase.store(LoopPhase::Running.as_u8(), Ordering::SeqCst);
    }

    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn mark_stopped(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.phase.store(LoopPhase::Stopped.as_u8(), Ordering::SeqCst);
    }

    pub fn mark_crashed(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.phase.store(LoopPhase::Crashed.as_u8(), Ordering::SeqCst);
    }

    pub fn phase(&self) -> LoopPhase {
        LoopPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn is_crashed(&self) -> bool {
        self.phase() == LoopPhase::Crashed
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Publish before `set_connected(true)` so the worker never sees a
    /// connected link without a session id.
    pub fn publish_session(&self, session: SessionHandle) {
        self.session.store(session.as_raw(), Ordering::SeqCst);
    }

    pub fn clear_session(&self) {
        self.session.store(NO_SESSION, Ordering::SeqCst);
    }

    pub fn take_session(&self) -> Option<SessionHandle> {
        let raw = self.session.swap(NO_SESSION, Ordering::SeqCst);
        (raw != NO_SESSION).then(|| SessionHandle::from_raw(raw))
    }

    pub fn session(&self) -> Option<SessionHandle> {
        let raw = self.session.load(Ordering::SeqCst);
        (raw != NO_SESSION).then(|| SessionHandle::from_raw(raw))
    }
}
