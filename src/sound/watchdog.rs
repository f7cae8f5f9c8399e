//! Audio watchdog for enforcement sessions.
//!
//! The watchdog runs as its own tokio task for the whole break. It starts
//! looped playback, polls it every [`WATCHDOG_POLL`] and restarts it if the
//! device dropped it. It never fails: every error is logged and the blackout
//! keeps running without music.

use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::error::SoundError;
use super::AudioBackend;

/// Playback status poll interval.
pub const WATCHDOG_POLL: Duration = Duration::from_millis(100);

/// What the watchdog did during one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchdogReport {
    /// Whether playback ever started
    pub started: bool,
    /// Number of times playback was restarted after stopping early
    pub restarts: u32,
    /// The error that ended the watchdog early, if any
    pub aborted_by: Option<SoundError>,
}

/// Spawns the watchdog task, which plays until `deadline`.
///
/// `backend` is the result of opening the audio output; an error there (no
/// device) is logged inside the task so the caller's join path is the same
/// in every case.
pub fn spawn_watchdog(
    backend: Result<Box<dyn AudioBackend>, SoundError>,
    track: Option<PathBuf>,
    deadline: Instant,
) -> JoinHandle<WatchdogReport> {
    tokio::spawn(async move {
        match backend {
            Ok(backend) => run_watchdog(backend, track, deadline, WATCHDOG_POLL).await,
            Err(e) => {
                warn!("Audio output unavailable, break will be silent: {}", e);
                WatchdogReport {
                    aborted_by: Some(e),
                    ..WatchdogReport::default()
                }
            }
        }
    })
}

/// Runs playback until `deadline`, restarting it whenever it stops.
pub async fn run_watchdog(
    mut backend: Box<dyn AudioBackend>,
    track: Option<PathBuf>,
    deadline: Instant,
    poll: Duration,
) -> WatchdogReport {
    let mut report = WatchdogReport::default();

    let Some(track) = track else {
        warn!("No music file configured, break will be silent");
        return report;
    };

    if let Err(e) = backend.load(&track) {
        warn!("Cannot load music '{}': {} ({})", track.display(), e, e.suggestion());
        report.aborted_by = Some(e);
        return report;
    }

    match backend.play(true) {
        Ok(()) => {
            report.started = true;
            info!("Music started: {}", track.display());
        }
        Err(e) => warn!("Music playback error: {}", e),
    }

    let mut ticker = interval_at(Instant::now() + poll, poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let end = sleep_until(deadline);
    tokio::pin!(end);

    loop {
        tokio::select! {
            biased;
            _ = &mut end => break,
            _ = ticker.tick() => {
                match backend.is_playing() {
                    Ok(true) => {}
                    Ok(false) => match backend.play(true) {
                        Ok(()) => {
                            report.started = true;
                            report.restarts += 1;
                            debug!("Playback stopped early, restarted ({})", report.restarts);
                        }
                        Err(e) => warn!("Failed to restart playback: {}", e),
                    },
                    Err(e) => warn!("Cannot query playback status: {}", e),
                }
            }
        }
    }

    if let Err(e) = backend.stop() {
        warn!("Failed to stop playback: {}", e);
    }
    debug!("Audio watchdog finished");
    report
}
