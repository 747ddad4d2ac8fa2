use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use padlink_emu::{EmulatedController, InputPacket};
use padlink_input::InputSource;

use crate::{print_debug, print_error, print_warning};

use super::link::LinkShared;
use super::mapper::EventMapper;
use super::turbo::TurboEngine;
use super::{ProxyError, ProxySettings};

/// Handle to the running proxy loop thread.
pub(crate) struct WorkerHandle {
    thread: thread::JoinHandle<Result<(), ProxyError>>,
}

impl WorkerHandle {
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits up to `timeout` for the worker to finish its in-flight
    /// tick. Returns `None` when it is still running afterwards;
    /// shutdown then proceeds without it.
    pub fn join_timeout(self, timeout: Duration) -> Option<Result<(), ProxyError>> {
        let deadline = Instant::now() + timeout;
        while !self.thread.is_finished() {
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(10));
        }
        Some(self.thread.join().unwrap_or(Err(ProxyError::WorkerPanicked)))
    }
}

/// Spawns the fixed-rate forwarding loop on a dedicated thread.
///
/// Each tick drains the input source, runs one turbo oscillation check
/// and pushes the packet while the supervisor reports the link as
/// connected. Stop is cooperative, checked once per tick. A failed
/// push clears the connected gate and the loop keeps ticking; the
/// supervisor's health check owns recovery. Input failures mark the
/// loop crashed, attempt a best-effort disconnect and surface the
/// error on join.
pub(crate) fn spawn_worker<S, B>(
    source: S,
    backend: Arc<B>,
    link: Arc<LinkShared>,
    settings: &ProxySettings,
) -> Result<WorkerHandle, ProxyError>
where
    S: InputSource + 'static,
    B: EmulatedController + 'static,
{
    let interval = settings.tick_interval;
    let mapper = EventMapper::new(settings.turbo_modifier);
    let turbo = TurboEngine::new(settings.turbo_half_period);

    link.begin_running();
    let thread = thread::Builder::new()
        .name("padlink-proxy".into())
        .spawn(move || run_loop(source, &*backend, &link, interval, mapper, turbo))?;
    Ok(WorkerHandle { thread })
}

fn run_loop<S, B>(
    mut source: S,
    backend: &B,
    link: &LinkShared,
    interval: Duration,
    mut mapper: EventMapper,
    mut turbo: TurboEngine,
) -> Result<(), ProxyError>
where
    S: InputSource,
    B: EmulatedController + ?Sized,
{
    let mut packet = InputPacket::new();

    let result = (|| -> Result<(), ProxyError> {
        while link.is_running() {
            let tick_start = Instant::now();

            while let Some(event) = source.try_read_event()? {
                mapper.handle_event(event, &mut packet, &mut turbo);
            }
            turbo.on_tick(tick_start, &mut packet);

            if link.is_connected() {
                if let Some(session) = link.session() {
                    // a failed push means the link went down, not the
                    // loop; recovery belongs to the supervisor
                    if let Err(e) = backend.set_state(session, &packet) {
                        print_warning!("state push failed: {e}");
                        link.set_connected(false);
                    }
                }
            }

            // overruns roll straight into the next tick, no catch-up
            let elapsed = tick_start.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        Ok(())
    })();

    match &result {
        Ok(()) => link.mark_stopped(),
        Err(e) => {
            print_error!("proxy tick failed: {e}");
            link.mark_crashed();
            link.set_connected(false);
            // the supervisor may already be gone; teardown is best-effort
            if let Some(session) = link.take_session() {
                if let Err(e) = backend.disconnect(session) {
                    print_debug!("post-crash disconnect reported: {e}");
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::link::LoopPhase;
    use crate::proxy::mapper::BTN_EAST;
    use padlink_emu::loopback::LoopbackController;
    use padlink_emu::{Appearance, Button, SessionHandle};
    use padlink_input::{RawEvent, ScriptedSource};

    fn fast_settings() -> ProxySettings {
        ProxySettings {
            tick_interval: Duration::from_millis(1),
            ..ProxySettings::default()
        }
    }

    fn connected_backend() -> (Arc<LoopbackController>, SessionHandle) {
        let backend = Arc::new(LoopbackController::new());
        let adapter = backend.list_adapters().unwrap().remove(0);
        let session = backend
            .connect(&adapter, Appearance::default(), &[])
            .unwrap();
        (backend, session)
    }

    #[test]
    fn forwards_drained_events_while_connected() {
        let (backend, session) = connected_backend();
        let link = Arc::new(LinkShared::new());
        link.publish_session(session);
        link.set_connected(true);

        let source = ScriptedSource::new([RawEvent::key(BTN_EAST, 1)]);
        let worker =
            spawn_worker(source, backend.clone(), link.clone(), &fast_settings()).unwrap();

        thread::sleep(Duration::from_millis(50));
        link.request_stop();
        let result = worker.join_timeout(Duration::from_secs(1)).expect("join");
        result.unwrap();

        assert_eq!(link.phase(), LoopPhase::Stopped);
        assert!(backend.push_count(session) > 0);
        assert!(backend.last_packet(session).unwrap().button(Button::A));
    }

    #[test]
    fn never_pushes_while_disconnected() {
        let (backend, session) = connected_backend();
        let link = Arc::new(LinkShared::new());
        link.publish_session(session);
        // connected flag deliberately left unset

        let source = ScriptedSource::new([RawEvent::key(BTN_EAST, 1)]);
        let worker =
            spawn_worker(source, backend.clone(), link.clone(), &fast_settings()).unwrap();

        thread::sleep(Duration::from_millis(30));
        link.request_stop();
        worker.join_timeout(Duration::from_secs(1)).expect("join").unwrap();

        assert_eq!(backend.push_count(session), 0);
    }

    #[test]
    fn failed_push_marks_the_link_down_but_keeps_ticking() {
        let (backend, session) = connected_backend();
        backend.crash_session(session, "radio gone");

        let link = Arc::new(LinkShared::new());
        link.publish_session(session);
        link.set_connected(true);

        let worker = spawn_worker(
            ScriptedSource::default(),
            backend.clone(),
            link.clone(),
            &fast_settings(),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(30));
        assert!(!link.is_connected());
        assert!(!worker.is_finished());
        // the session stays published; teardown is the supervisor's call
        assert_eq!(link.session(), Some(session));

        link.request_stop();
        worker.join_timeout(Duration::from_secs(1)).expect("join").unwrap();
        assert_eq!(link.phase(), LoopPhase::Stopped);
    }

    struct UnpluggedSource;

    impl padlink_input::InputSource for UnpluggedSource {
        fn try_read_event(&mut self) -> padlink_input::Result<Option<RawEvent>> {
            Err(padlink_input::Error::Io(std::io::Error::other(
                "device unplugged",
            )))
        }
    }

    #[test]
    fn input_failure_crashes_the_loop() {
        let (backend, session) = connected_backend();
        let link = Arc::new(LinkShared::new());
        link.publish_session(session);
        link.set_connected(true);

        let worker =
            spawn_worker(UnpluggedSource, backend.clone(), link.clone(), &fast_settings())
                .unwrap();

        let result = worker.join_timeout(Duration::from_secs(1)).expect("join");
        assert!(matches!(result, Err(ProxyError::Input(_))));
        assert_eq!(link.phase(), LoopPhase::Crashed);
        assert!(!link.is_connected());
        assert_eq!(link.session(), None);
    }
}
