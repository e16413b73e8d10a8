use std::env;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::data_source::DataSource;
use crate::state::{Delta, Health, MatrixPayload, ProviderCommand, Snapshot};

const MIN_REFRESH_SECS: u64 = 10;

/// `ARENA_REFRESH_SECS`: 0 or unset disables periodic reloads.
pub fn refresh_interval_from_env() -> Option<Duration> {
    let secs = env::var("ARENA_REFRESH_SECS")
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(0);
    refresh_interval(secs)
}

pub fn refresh_interval(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs.max(MIN_REFRESH_SECS)))
}

/// Loads everything once, then again on `ProviderCommand::Reload` or when the
/// refresh interval elapses. Exits when either channel closes.
pub fn spawn_loader(
    source: DataSource,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    refresh: Option<Duration>,
) {
    thread::spawn(move || {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Loading data from {}",
            source.describe()
        )));
        if !load_all(&source, &tx) {
            return;
        }
        let mut last_load = Instant::now();

        loop {
            let wait = match refresh {
                Some(interval) => interval.saturating_sub(last_load.elapsed()),
                None => Duration::from_secs(3600),
            };
            match cmd_rx.recv_timeout(wait) {
                Ok(ProviderCommand::Reload) => {}
                Err(RecvTimeoutError::Timeout) if refresh.is_some() => {}
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return,
            }
            if !load_all(&source, &tx) {
                return;
            }
            last_load = Instant::now();
        }
    });
}

/// The four loads run concurrently and report independently. Failures
/// become neutral values plus a warning. Returns false once the receiver is
/// gone.
pub fn load_all(source: &DataSource, tx: &Sender<Delta>) -> bool {
    thread::scope(|scope| {
        let current = scope.spawn(|| match source.load_current() {
            Ok(snapshot) => send(tx, Delta::SetCurrent(snapshot)),
            Err(err) => {
                warn(tx, format!("[WARN] Leaderboard load failed: {err:#}"));
                send(tx, Delta::SetCurrent(Snapshot::empty()))
            }
        });
        // A missing previous snapshot is the normal first-run state.
        let previous = scope.spawn(|| {
            let snapshot = source.load_previous().unwrap_or_default();
            send(tx, Delta::SetPrevious(snapshot))
        });
        let health = scope.spawn(|| match source.load_health() {
            Ok(health) => send(tx, Delta::SetHealth(health)),
            Err(err) => send(tx, Delta::SetHealth(Health::unavailable(format!("{err:#}")))),
        });
        let matrices = scope.spawn(|| match source.load_matrices() {
            Ok(matrices) => send(tx, Delta::SetMatrices(matrices)),
            Err(err) => {
                warn(tx, format!("[WARN] Heatmap load failed: {err:#}"));
                send(tx, Delta::SetMatrices(MatrixPayload::default()))
            }
        });
        [current, previous, health, matrices]
            .into_iter()
            .all(|handle| handle.join().unwrap_or(false))
    })
}

fn send(tx: &Sender<Delta>, delta: Delta) -> bool {
    tx.send(delta).is_ok()
}

fn warn(tx: &Sender<Delta>, msg: String) {
    let _ = tx.send(Delta::Log(msg));
}
