use std::sync::Arc;
use std::thread;

use colored::Colorize;
use padlink_emu::{
    AdapterRef, Appearance, EmulatedController, Error as BackendError,
    SessionHandle, SessionStatus,
};

use crate::{print_debug, print_error, print_info, print_warning};

use super::link::LinkShared;
use super::worker::WorkerHandle;
use super::{ProxyError, ProxySettings};

/// Connection lifecycle as owned by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Crashed,
}

/// Owns the connect/reconnect/crash-recovery policy and the packet push
/// authorization. Runs on the supervising thread at a coarse interval;
/// its operations may block for seconds and must stay out of the
/// worker's 120 Hz path.
pub(crate) struct ConnectionSupervisor<B: EmulatedController> {
    backend: Arc<B>,
    link: Arc<LinkShared>,
    settings: ProxySettings,
    adapter: AdapterRef,
    appearance: Appearance,
    hints: Vec<String>,
    session: Option<SessionHandle>,
    state: ConnectionState,
}

impl<B: EmulatedController> ConnectionSupervisor<B> {
    /// Fails fast when no Bluetooth adapter is usable.
    pub fn new(
        backend: Arc<B>,
        link: Arc<LinkShared>,
        settings: ProxySettings,
        hints: Vec<String>,
    ) -> Result<Self, ProxyError> {
        let mut adapters = backend.list_adapters()?;
        if adapters.is_empty() {
            return Err(BackendError::NoAdapter.into());
        }
        let adapter = adapters.remove(0);
        Ok(Self {
            backend,
            link,
            settings,
            adapter,
            appearance: Appearance::default(),
            hints,
            session: None,
            state: ConnectionState::Disconnected,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Known console addresses, most recent first.
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Requests a fresh session and blocks until the backend confirms
    /// the link. Only then does the worker's packet push open up.
    pub fn connect(&mut self) -> Result<(), ProxyError> {
        self.state = ConnectionState::Connecting;
        print_info!("connecting emulated controller via {}", self.adapter.0);
        let session =
            match self
                .backend
                .connect(&self.adapter, self.appearance, &self.hints)
            {
                Ok(session) => session,
                Err(e) => {
                    self.state = ConnectionState::Disconnected;
                    return Err(e.into());
                }
            };

        self.session = Some(session);
        self.link.publish_session(session);
        self.link.set_connected(true);
        self.state = ConnectionState::Connected;
        self.remember_peer(session);
        print_info!("emulated controller connected");
        Ok(())
    }

    /// Tears the active session down. Calling without one is a no-op,
    /// and teardown failures are logged rather than raised so cleanup
    /// never masks the error that caused it.
    pub fn disconnect(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.link.set_connected(false);
        self.link.clear_session();
        if let Err(e) = self.backend.disconnect(session) {
            print_debug!("disconnect reported: {e}");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Polls the backend's status and runs the bounded reconnection
    /// procedure when the session has crashed.
    pub fn check_health(&mut self) -> Result<(), ProxyError> {
        if self.state != ConnectionState::Connected {
            return Ok(());
        }
        let Some(session) = self.session else {
            return Ok(());
        };
        let report = match self.backend.query_status(session)? {
            SessionStatus::Crashed(report) => report,
            SessionStatus::Connected | SessionStatus::Connecting => return Ok(()),
        };

        self.state = ConnectionState::Crashed;
        self.link.set_connected(false);
        print_error!("backend session crashed: {}", report.last_error);
        if let Some(packet) = &report.last_packet {
            print_debug!("last transmitted state: {packet:?}");
        }

        // let the backend settle before hammering it with reconnects
        thread::sleep(self.settings.settle_pause);
        self.reconnect()
    }

    /// Stops the proxy loop (bounded wait), then tears the session
    /// down. Safe to call repeatedly and after a crash.
    pub fn close(&mut self, worker: Option<WorkerHandle>) -> Result<(), ProxyError> {
        self.link.request_stop();
        let worker_result = match worker {
            Some(worker) => match worker.join_timeout(self.settings.join_timeout) {
                Some(result) => result,
                None => {
                    print_warning!(
                        "proxy worker did not stop within {:?}, proceeding with teardown",
                        self.settings.join_timeout
                    );
                    Ok(())
                }
            },
            None => Ok(()),
        };
        self.disconnect();
        worker_result
    }

    fn reconnect(&mut self) -> Result<(), ProxyError> {
        let attempts = self.settings.max_reconnect_attempts;
        for attempt in 1..=attempts {
            print_info!("reconnect attempt {attempt}/{attempts}");
            self.disconnect();
            match self.connect() {
                Ok(()) => return Ok(()),
                Err(ProxyError::Backend(e)) if e.is_transient() => {
                    print_warning!("{e}, retrying shortly");
                    thread::sleep(self.settings.retry_pause);
                }
                Err(e) => {
                    print_error!("reconnection aborted: {e}");
                    return Err(e);
                }
            }
        }
        Err(ProxyError::ReconnectExhausted { attempts })
    }

    fn remember_peer(&mut self, session: SessionHandle) {
        match self.backend.peer_address(session) {
            Ok(Some(address)) => {
                self.hints.retain(|known| known != &address);
                self.hints.insert(0, address);
            }
            Ok(None) => {}
            Err(e) => {
                print_debug!("peer address unavailable: {e}");
            }
        }
    }
}
