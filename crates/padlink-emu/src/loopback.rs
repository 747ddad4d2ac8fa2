//! In-process stand-in for a wireless HID backend.
//!
//! Keeps every pushed packet in memory so callers can inspect what a
//! real console would have received. Tests (and dry runs of the daemon)
//! script connect outcomes and inject session crashes through it.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use ahash::AHashMap;

use crate::controller::{
    AdapterRef, Appearance, CrashReport, EmulatedController, SessionHandle,
    SessionStatus,
};
use crate::error::{Error, Result};
use crate::packet::InputPacket;

const LOOPBACK_PEER: &str = "7C:BB:8A:00:00:01";

/// Outcome the backend produces for the next `connect` call.
#[derive(Debug, Clone)]
pub enum ConnectOutcome {
    Ok,
    Busy,
    Fail(String),
}

pub struct LoopbackController {
    inner: Mutex<Inner>,
}

struct Inner {
    adapters: Vec<AdapterRef>,
    next_id: u32,
    sessions: AHashMap<u32, Session>,
    connect_script: VecDeque<ConnectOutcome>,
    connect_calls: u32,
}

struct Session {
    status: SessionStatus,
    last_packet: Option<InputPacket>,
    pushes: u64,
}

impl LoopbackController {
    /// A backend with one fake adapter, accepting every connect.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                adapters: vec![AdapterRef("hci0".to_string())],
                next_id: 0,
                sessions: AHashMap::new(),
                connect_script: VecDeque::new(),
                connect_calls: 0,
            }),
        }
    }

    /// A backend that reports no usable adapters.
    pub fn without_adapters() -> Self {
        let backend = Self::new();
        backend.lock().adapters.clear();
        backend
    }

    /// Queues outcomes for upcoming `connect` calls; once the script is
    /// drained, connects succeed.
    pub fn script_connect<I: IntoIterator<Item = ConnectOutcome>>(&self, outcomes: I) {
        self.lock().connect_script.extend(outcomes);
    }

    /// Marks the session as crashed, as a real backend would after its
    /// link died.
    pub fn crash_session(&self, session: SessionHandle, reason: &str) {
        let mut inner = self.lock();
        if let Some(record) = inner.sessions.get_mut(&session.as_raw()) {
            record.status = SessionStatus::Crashed(CrashReport {
                last_error: reason.to_string(),
                last_packet: record.last_packet.clone(),
            });
        }
    }

    /// The most recent packet pushed to the session, if any.
    pub fn last_packet(&self, session: SessionHandle) -> Option<InputPacket> {
        self.lock()
            .sessions
            .get(&session.as_raw())
            .and_then(|record| record.last_packet.clone())
    }

    /// How many packets the session has received.
    pub fn push_count(&self, session: SessionHandle) -> u64 {
        self.lock()
            .sessions
            .get(&session.as_raw())
            .map_or(0, |record| record.pushes)
    }

    /// How often `connect` has been called, successful or not.
    pub fn connect_calls(&self) -> u32 {
        self.lock().connect_calls
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("loopback state poisoned")
    }
}

impl Default for LoopbackController {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatedController for LoopbackController {
    fn list_adapters(&self) -> Result<Vec<AdapterRef>> {
        Ok(self.lock().adapters.clone())
    }

    fn connect(
        &self,
        adapter: &AdapterRef,
        _appearance: Appearance,
        _reconnect_hints: &[String],
    ) -> Result<SessionHandle> {
        let mut inner = self.lock();
        inner.connect_calls += 1;
        if !inner.adapters.contains(adapter) {
            return Err(Error::Backend(format!("unknown adapter {}", adapter.0)));
        }
        match inner.connect_script.pop_front().unwrap_or(ConnectOutcome::Ok) {
            ConnectOutcome::Ok => {}
            ConnectOutcome::Busy => return Err(Error::AdapterBusy),
            ConnectOutcome::Fail(reason) => return Err(Error::Backend(reason)),
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.sessions.insert(
            id,
            Session {
                status: SessionStatus::Connected,
                last_packet: None,
                pushes: 0,
            },
        );
        Ok(SessionHandle::from_raw(id))
    }

    fn disconnect(&self, session: SessionHandle) -> Result<()> {
        // idempotent: removing an unknown session is fine
        self.lock().sessions.remove(&session.as_raw());
        Ok(())
    }

    fn set_state(&self, session: SessionHandle, packet: &InputPacket) -> Result<()> {
        let mut inner = self.lock();
        let Some(record) = inner.sessions.get_mut(&session.as_raw()) else {
            return Err(Error::StaleSession(session.as_raw()));
        };
        if let SessionStatus::Crashed(report) = &record.status {
            return Err(Error::Backend(format!(
                "session has crashed: {}",
                report.last_error
            )));
        }
        record.last_packet = Some(packet.clone());
        record.pushes += 1;
        Ok(())
    }

    fn query_status(&self, session: SessionHandle) -> Result<SessionStatus> {
        self.lock()
            .sessions
            .get(&session.as_raw())
            .map(|record| record.status.clone())
            .ok_or(Error::StaleSession(session.as_raw()))
    }

    fn peer_address(&self, session: SessionHandle) -> Result<Option<String>> {
        let inner = self.lock();
        if inner.sessions.contains_key(&session.as_raw()) {
            Ok(Some(LOOPBACK_PEER.to_string()))
        } else {
            Err(Error::StaleSession(session.as_raw()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Button;

    fn connect(backend: &LoopbackController) -> SessionHandle {
        let adapter = backend.list_adapters().unwrap().remove(0);
        backend
            .connect(&adapter, Appearance::default(), &[])
            .unwrap()
    }

    #[test]
    fn pushes_are_recorded_per_session() {
        let backend = LoopbackController::new();
        let session = connect(&backend);

        let mut packet = InputPacket::new();
        packet.set_button(Button::A, true);
        backend.set_state(session, &packet).unwrap();

        assert_eq!(backend.push_count(session), 1);
        assert_eq!(backend.last_packet(session), Some(packet));
    }

    #[test]
    fn crashed_session_rejects_pushes_and_reports_detail() {
        let backend = LoopbackController::new();
        let session = connect(&backend);
        backend.set_state(session, &InputPacket::new()).unwrap();
        backend.crash_session(session, "link dropped");

        let status = backend.query_status(session).unwrap();
        let SessionStatus::Crashed(report) = status else {
            panic!("expected crashed status");
        };
        assert_eq!(report.last_error, "link dropped");
        assert!(report.last_packet.is_some());
        assert!(backend.set_state(session, &InputPacket::new()).is_err());
    }

    #[test]
    fn scripted_busy_then_ok() {
        let backend = LoopbackController::new();
        backend.script_connect([ConnectOutcome::Busy, ConnectOutcome::Ok]);
        let adapter = backend.list_adapters().unwrap().remove(0);

        let first = backend.connect(&adapter, Appearance::default(), &[]);
        assert!(matches!(first, Err(Error::AdapterBusy)));
        assert!(first.unwrap_err().is_transient());
        assert!(backend.connect(&adapter, Appearance::default(), &[]).is_ok());
        assert_eq!(backend.connect_calls(), 2);
    }

    #[test]
    fn disconnect_unknown_session_is_a_noop() {
        let backend = LoopbackController::new();
        assert!(backend.disconnect(SessionHandle::from_raw(99)).is_ok());
    }
}
