use localdns_application::use_cases::AdminCommand;
#[cfg(unix)]
use std::future::Future;
use tokio::sync::mpsc;
#[cfg(not(unix))]
use tracing::info;
#[cfg(unix)]
use tracing::{debug, info, warn};

/// Source of admin notifications; `None` once it can no longer deliver.
#[cfg(unix)]
trait AdminSignal {
    fn recv(&mut self) -> impl Future<Output = Option<()>> + Send;
}

#[cfg(unix)]
impl AdminSignal for tokio::signal::unix::Signal {
    fn recv(&mut self) -> impl Future<Output = Option<()>> + Send {
        tokio::signal::unix::Signal::recv(self)
    }
}

/// SIGUSR1 flushes the caches, SIGUSR2 logs their statistics.
#[cfg(unix)]
pub fn spawn_admin_signals(commands: mpsc::Sender<AdminCommand>) {
    use tokio::signal::unix::{signal, SignalKind};

    let flush = match signal(SignalKind::user_defined1()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "install signal handler failed: SIGUSR1");
            return;
        }
    };
    let dump_stats = match signal(SignalKind::user_defined2()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "install signal handler failed: SIGUSR2");
            return;
        }
    };

    tokio::spawn(relay(flush, dump_stats, commands));

    info!("Admin signals bound: SIGUSR1 flushes the cache, SIGUSR2 dumps stats");
}

#[cfg(not(unix))]
pub fn spawn_admin_signals(_commands: mpsc::Sender<AdminCommand>) {
    info!("Admin signals are not available on this platform");
}

/// Turn notifications into commands until both sources are gone or the
/// dispatcher stops listening.
#[cfg(unix)]
async fn relay<F, D>(mut flush: F, mut dump_stats: D, commands: mpsc::Sender<AdminCommand>)
where
    F: AdminSignal,
    D: AdminSignal,
{
    let mut flush_open = true;
    let mut dump_open = true;

    while flush_open || dump_open {
        let command = tokio::select! {
            received = flush.recv(), if flush_open => match received {
                Some(()) => AdminCommand::Flush,
                None => {
                    flush_open = false;
                    continue;
                }
            },
            received = dump_stats.recv(), if dump_open => match received {
                Some(()) => AdminCommand::DumpStats,
                None => {
                    dump_open = false;
                    continue;
                }
            },
        };

        info!(command = %command, "Admin signal received");
        if commands.send(command).await.is_err() {
            return;
        }
    }

    debug!("Admin signal sources closed");
}
