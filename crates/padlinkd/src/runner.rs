//! Wires the CLI to a running proxy: opens the input device, brings
//! the emulated controller up, spawns the forwarding loop and
//! supervises it until Ctrl-C or a fatal error.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick};
use padlink_emu::loopback::LoopbackController;
use padlink_input::EvdevSource;
use thiserror::Error;

use crate::cli::Cli;
use crate::proxy::{
    spawn_worker, ConnectionSupervisor, LinkShared, ProxyError, ProxySettings,
};
use crate::{hints, print_info};

const HEALTH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub(crate) enum RunnerError {
    #[error("input device error: {0}")]
    Input(#[from] padlink_input::Error),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("failed to install the signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub(crate) fn run(cli: &Cli) -> Result<(), RunnerError> {
    let source = open_source(cli)?;
    let settings = ProxySettings::default();
    let backend = Arc::new(LoopbackController::new());
    let link = Arc::new(LinkShared::new());

    let hints = hints::load(&cli.hints_file).into_iter().collect();
    let mut supervisor = ConnectionSupervisor::new(
        Arc::clone(&backend),
        Arc::clone(&link),
        settings.clone(),
        hints,
    )?;
    supervisor.connect()?;
    if let Some(address) = supervisor.hints().first() {
        hints::store(&cli.hints_file, address);
    }

    let worker = match spawn_worker(source, backend, Arc::clone(&link), &settings) {
        Ok(worker) => worker,
        Err(e) => {
            // tear the session down; the spawn failure is the error to report
            let _ = supervisor.close(None);
            return Err(e.into());
        }
    };
    print_info!("proxy running, press Ctrl-C to stop");

    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })?;

    let health = tick(HEALTH_INTERVAL);
    let supervision: Result<(), ProxyError> = loop {
        select! {
            recv(stop_rx) -> _ => {
                print_info!("shutdown requested");
                break Ok(());
            }
            recv(health) -> _ => {
                // a finished worker carries its own verdict; join below
                if link.is_crashed() || worker.is_finished() {
                    break Ok(());
                }
                if let Err(e) = supervisor.check_health() {
                    break Err(e);
                }
            }
        }
    };

    let worker_result = supervisor.close(Some(worker));
    if let Some(address) = supervisor.hints().first() {
        hints::store(&cli.hints_file, address);
    }

    supervision?;
    worker_result?;
    Ok(())
}

fn open_source(cli: &Cli) -> Result<EvdevSource, padlink_input::Error> {
    let source = match &cli.device {
        Some(path) => EvdevSource::open(path)?,
        None => EvdevSource::open_by_name(&cli.name)?,
    };
    print_info!(
        "forwarding events from {}",
        source.name().unwrap_or("unnamed device")
    );
    Ok(source)
}
