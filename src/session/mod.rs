//! Enforcement sessions.
//!
//! A session is one blackout-with-music episode. It:
//!
//! 1. blocks the screen (overlay windows on every display, or a screen lock
//!    bounded by `LOCK_TIMEOUT`),
//! 2. arms a single deadline and starts the audio watchdog against it,
//! 3. counts down once per second until that deadline,
//! 4. tears every window down exactly once,
//! 5. joins the watchdog with a bounded wait.
//!
//! Nothing in here can shorten a break: every subsystem failure is logged
//! and the session runs to its deadline anyway. `enforce()` returns after at
//! least `duration` and at most `duration + AUDIO_JOIN_TIMEOUT`: time spent
//! waiting on a lock command comes out of the watchdog join budget.

mod blocker;
mod countdown;
mod error;
mod window;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub use blocker::{
    lock_within, BlockingMode, BlockingStrategy, LockFuture, MockScreenLocker, ScreenLocker,
    SystemLocker, LOCK_TIMEOUT,
};
pub use countdown::{format_time, CountdownTask};
pub use error::SessionError;
pub use window::{
    DisplayEnumerator, DisplayInfo, EscapeGesture, MockWindowSystem, NoWindowSystem,
    OverlayContent, OverlaySpec, StaticDisplays, WindowHandle, WindowRole, WindowSystem,
    ESCAPE_GESTURES, MUSIC_INDICATOR,
};

use crate::config::AppConfig;
use crate::sound::{spawn_watchdog, AudioOutput, Rotation, WatchdogReport};
use crate::types::{BreakKind, MAX_BREAK_DURATION};

/// Upper bound on waiting for the audio watchdog after the blackout ends.
pub const AUDIO_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Countdown label refresh period.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

// ============================================================================
// EnforcementSession
// ============================================================================

/// The windows of one break.
///
/// Owns its window handles; they never leave the session. Teardown is
/// idempotent and also runs on drop, so no exit path leaves a window behind.
pub struct EnforcementSession {
    kind: BreakKind,
    duration: Duration,
    system: Arc<dyn WindowSystem>,
    /// Live windows in creation order
    windows: Vec<WindowHandle>,
    /// Window that shows the countdown and message
    content_window: Option<WindowHandle>,
    message: String,
    opened: usize,
    failed: usize,
}

impl EnforcementSession {
    #[must_use]
    pub fn new(kind: BreakKind, duration: Duration, system: Arc<dyn WindowSystem>) -> Self {
        Self {
            kind,
            duration,
            system,
            windows: Vec::new(),
            content_window: None,
            message: String::new(),
            opened: 0,
            failed: 0,
        }
    }

    #[must_use]
    pub fn kind(&self) -> BreakKind {
        self.kind
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Opens one blackout window per display.
    ///
    /// The first display gets the primary role. A failed window is logged and
    /// skipped; the first window actually created carries the content.
    /// Returns the number of windows created.
    pub fn open_windows(&mut self, displays: &[DisplayInfo]) -> usize {
        for (index, info) in displays.iter().enumerate() {
            let role = if index == 0 {
                WindowRole::Primary
            } else {
                WindowRole::Secondary
            };
            let spec = OverlaySpec::for_display(info.clone(), role);

            match self.system.open(&spec) {
                Ok(handle) => {
                    debug!(
                        "Opened {:?} window on {} ({})",
                        role,
                        info.name,
                        info.geometry()
                    );
                    if self.content_window.is_none() {
                        self.content_window = Some(handle);
                    }
                    self.windows.push(handle);
                    self.opened += 1;
                }
                Err(e) => {
                    warn!("Skipping display {}: {}", info.name, e);
                    self.failed += 1;
                }
            }
        }
        self.opened
    }

    /// Sets the wellness message and draws the initial content.
    pub fn show(&mut self, countdown: &CountdownTask, message: &str) {
        self.message = message.to_string();
        self.update_countdown(countdown);
    }

    /// Redraws the content window with the current countdown.
    pub fn update_countdown(&self, countdown: &CountdownTask) {
        let Some(window) = self.content_window else {
            return;
        };
        if !self.windows.contains(&window) {
            return;
        }
        let content = OverlayContent::new(countdown.label(), self.message.as_str());
        if let Err(e) = self.system.set_content(window, &content) {
            warn!("Failed to update countdown: {}", e);
        }
    }

    /// Closes every live window in creation order.
    ///
    /// Close errors are logged and the window is dropped from the live set
    /// anyway. Calling this again is a no-op. Returns the number of windows
    /// closed cleanly by this call.
    pub fn teardown(&mut self) -> usize {
        let mut closed = 0;
        for window in self.windows.drain(..) {
            match self.system.close(window) {
                Ok(()) => closed += 1,
                Err(e) => warn!("Window teardown error: {}", e),
            }
        }
        if closed > 0 {
            debug!("Closed {} window(s)", closed);
        }
        closed
    }

    /// Windows still owned by the session.
    #[must_use]
    pub fn live_windows(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn windows_opened(&self) -> usize {
        self.opened
    }

    #[must_use]
    pub fn windows_failed(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub fn content_window(&self) -> Option<WindowHandle> {
        self.content_window
    }
}

impl Drop for EnforcementSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for EnforcementSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnforcementSession")
            .field("kind", &self.kind)
            .field("duration", &self.duration)
            .field("windows", &self.windows)
            .field("content_window", &self.content_window)
            .finish()
    }
}

// ============================================================================
// Session loop helpers
// ============================================================================

/// Ticks `countdown` once per second until `deadline`, then cancels it.
///
/// `redraw` runs after every tick that changed the label.
pub async fn run_countdown<F>(deadline: Instant, countdown: &mut CountdownTask, mut redraw: F)
where
    F: FnMut(&CountdownTask),
{
    let mut ticker = interval_at(Instant::now() + COUNTDOWN_TICK, COUNTDOWN_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let end = sleep_until(deadline);
    tokio::pin!(end);

    loop {
        tokio::select! {
            biased;
            _ = &mut end => break,
            _ = ticker.tick() => {
                if countdown.tick() {
                    redraw(countdown);
                }
            }
        }
    }
    countdown.cancel();
}

/// Waits for the watchdog for at most `limit`, aborting it on timeout.
pub async fn join_watchdog(mut handle: JoinHandle<WatchdogReport>, limit: Duration) -> WatchdogReport {
    match timeout(limit, &mut handle).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            warn!("Audio watchdog task failed: {}", e);
            WatchdogReport::default()
        }
        Err(_) => {
            warn!(
                "Audio watchdog did not finish within {}s, aborting it",
                limit.as_secs()
            );
            handle.abort();
            WatchdogReport::default()
        }
    }
}

// ============================================================================
// Enforcer
// ============================================================================

/// Platform collaborators of the enforcer.
pub struct SessionBackends {
    pub windows: Arc<dyn WindowSystem>,
    pub displays: Box<dyn DisplayEnumerator>,
    pub audio: Arc<dyn AudioOutput>,
    pub locker: Box<dyn ScreenLocker>,
}

/// What happened during one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub kind: BreakKind,
    pub strategy: BlockingStrategy,
    pub windows_opened: usize,
    pub windows_failed: usize,
    /// Windows still open after teardown; always zero unless teardown broke
    pub residual_windows: usize,
    pub audio: WatchdogReport,
    pub elapsed: Duration,
}

/// Runs a break to completion.
#[allow(async_fn_in_trait)]
pub trait BreakEnforcer {
    /// Blocks the screen for `duration` and returns once everything is
    /// released.
    async fn enforce(&mut self, kind: BreakKind, duration: Duration) -> SessionReport;
}

/// The production enforcer.
///
/// Holds the music and message rotations so their order persists across
/// breaks.
pub struct Enforcer {
    backends: SessionBackends,
    mode: BlockingMode,
    music: Rotation<PathBuf>,
    messages: Rotation<String>,
}

impl Enforcer {
    #[must_use]
    pub fn new(backends: SessionBackends, config: &AppConfig) -> Self {
        Self {
            backends,
            mode: config.blocking_mode,
            music: Rotation::new(config.music_files.clone(), config.music_mode),
            messages: Rotation::new(config.wellness_messages.clone(), config.message_mode),
        }
    }

    /// Overrides the configured blocking mode.
    #[must_use]
    pub fn with_mode(mut self, mode: BlockingMode) -> Self {
        self.mode = mode;
        self
    }

    /// The strategy the next session would start with.
    #[must_use]
    pub fn strategy(&self) -> BlockingStrategy {
        BlockingStrategy::select(
            self.mode,
            self.backends.windows.is_available(),
            self.backends.locker.is_available(),
        )
    }

    /// Displays as currently reported, or an empty list on failure.
    #[must_use]
    pub fn displays(&self) -> Vec<DisplayInfo> {
        match self.backends.displays.displays() {
            Ok(displays) => displays,
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    /// Runs one session.
    pub async fn run_session(&mut self, kind: BreakKind, duration: Duration) -> SessionReport {
        let started = Instant::now();
        if duration > MAX_BREAK_DURATION {
            warn!(
                "Break length {}s capped at {}s",
                duration.as_secs(),
                MAX_BREAK_DURATION.as_secs()
            );
        }
        let duration = duration.min(MAX_BREAK_DURATION);
        info!("Starting {} break for {}s", kind, duration.as_secs());

        let track = self.music.next_item().cloned();
        let message = self.messages.next_item().cloned().unwrap_or_default();
        let mut countdown = CountdownTask::new(duration);
        let mut session =
            EnforcementSession::new(kind, duration, Arc::clone(&self.backends.windows));

        let mut strategy = self.strategy();
        if strategy == BlockingStrategy::LockScreen {
            match lock_within(self.backends.locker.as_ref(), LOCK_TIMEOUT).await {
                Ok(()) => info!("Screen locked"),
                Err(e) => {
                    warn!("{}, falling back to overlay", e);
                    strategy = BlockingStrategy::OverlayBlackout;
                }
            }
        }

        if strategy == BlockingStrategy::OverlayBlackout {
            let displays = self.displays();
            if displays.is_empty() {
                warn!("No displays available, running audio-only break");
            }
            session.open_windows(&displays);
            session.show(&countdown, &message);
        }

        // Music and blackout share one deadline.
        let deadline = Instant::now() + duration;
        let watchdog = spawn_watchdog(self.backends.audio.open(), track, deadline);

        run_countdown(deadline, &mut countdown, |countdown| {
            if session.live_windows() > 0 {
                session.update_countdown(countdown);
            } else if countdown.remaining_seconds() % 60 == 0 {
                debug!("{}", countdown.label());
            }
        })
        .await;

        session.teardown();
        let residual_windows = session.live_windows();
        let windows_opened = session.windows_opened();
        let windows_failed = session.windows_failed();
        drop(session);

        let join_limit =
            (started + duration + AUDIO_JOIN_TIMEOUT).saturating_duration_since(Instant::now());
        let audio = join_watchdog(watchdog, join_limit).await;

        let elapsed = started.elapsed();
        info!("{} break finished after {}s", kind, elapsed.as_secs());

        SessionReport {
            kind,
            strategy,
            windows_opened,
            windows_failed,
            residual_windows,
            audio,
            elapsed,
        }
    }
}

impl BreakEnforcer for Enforcer {
    async fn enforce(&mut self, kind: BreakKind, duration: Duration) -> SessionReport {
        self.run_session(kind, duration).await
    }
}

// ============================================================================
// Mock
// ============================================================================

/// Mock enforcer for testing.
///
/// Sleeps for the requested duration on the tokio clock and records calls.
#[derive(Debug, Clone, Default)]
pub struct MockEnforcer {
    calls: Arc<Mutex<Vec<(BreakKind, Duration, Instant)>>>,
    count: Arc<AtomicUsize>,
}

impl MockEnforcer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every enforcement as (kind, duration, start time).
    #[must_use]
    pub fn calls(&self) -> Vec<(BreakKind, Duration, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl BreakEnforcer for MockEnforcer {
    async fn enforce(&mut self, kind: BreakKind, duration: Duration) -> SessionReport {
        let started = Instant::now();
        self.calls.lock().unwrap().push((kind, duration, started));
        self.count.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(duration).await;
        SessionReport {
            kind,
            strategy: BlockingStrategy::OverlayBlackout,
            windows_opened: 0,
            windows_failed: 0,
            residual_windows: 0,
            audio: WatchdogReport::default(),
            elapsed: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::MockAudioBackend;
    use crate::types::SelectionMode;

    fn displays(n: usize) -> Vec<DisplayInfo> {
        (0..n)
            .map(|i| DisplayInfo::new(format!("DP-{}", i), 1920, 1080, 1920 * i as i32, 0))
            .collect()
    }

    fn config() -> AppConfig {
        AppConfig {
            music_mode: SelectionMode::Sequential,
            message_mode: SelectionMode::Sequential,
            blocking_mode: BlockingMode::Overlay,
            ..AppConfig::default()
        }
    }

    fn enforcer(
        windows: &MockWindowSystem,
        audio: &MockAudioBackend,
        locker: &MockScreenLocker,
        n_displays: usize,
    ) -> Enforcer {
        let backends = SessionBackends {
            windows: Arc::new(windows.clone()),
            displays: Box::new(StaticDisplays::new(displays(n_displays))),
            audio: Arc::new(audio.clone()),
            locker: Box::new(locker.clone()),
        };
        Enforcer::new(backends, &config())
    }

    mod enforcement_session_tests {
        use super::*;

        #[test]
        fn test_first_display_is_primary() {
            let system = MockWindowSystem::new();
            let mut session =
                EnforcementSession::new(BreakKind::Short, Duration::from_secs(1), Arc::new(system.clone()));

            assert_eq!(session.open_windows(&displays(3)), 3);

            let specs = system.opened_specs();
            assert_eq!(specs[0].role, WindowRole::Primary);
            assert!(specs[0].capture_input);
            assert_eq!(specs[1].role, WindowRole::Secondary);
            assert_eq!(specs[2].role, WindowRole::Secondary);
            assert_eq!(specs[2].display.x, 3840);
        }

        #[test]
        fn test_teardown_is_idempotent() {
            let system = MockWindowSystem::new();
            let mut session =
                EnforcementSession::new(BreakKind::Short, Duration::from_secs(1), Arc::new(system.clone()));
            session.open_windows(&displays(2));

            assert_eq!(session.teardown(), 2);
            assert_eq!(session.teardown(), 0);
            assert_eq!(session.live_windows(), 0);
            assert_eq!(system.open_count(), 0);
            assert_eq!(system.closed().len(), 2);
        }

        #[test]
        fn test_teardown_closes_in_creation_order() {
            let system = MockWindowSystem::new();
            let mut session =
                EnforcementSession::new(BreakKind::Long, Duration::from_secs(1), Arc::new(system.clone()));
            session.open_windows(&displays(3));
            session.teardown();

            let closed = system.closed();
            assert!(closed.windows(2).all(|pair| pair[0] < pair[1]));
        }

        #[test]
        fn test_teardown_errors_still_empty_live_set() {
            let system = MockWindowSystem::new();
            system.set_should_fail_close(true);
            let mut session =
                EnforcementSession::new(BreakKind::Short, Duration::from_secs(1), Arc::new(system.clone()));
            session.open_windows(&displays(2));

            assert_eq!(session.teardown(), 0);
            assert_eq!(session.live_windows(), 0);
            assert_eq!(session.teardown(), 0);
            assert_eq!(system.closed().len(), 2);
        }

        #[test]
        fn test_drop_tears_down() {
            let system = MockWindowSystem::new();
            {
                let mut session = EnforcementSession::new(
                    BreakKind::Short,
                    Duration::from_secs(1),
                    Arc::new(system.clone()),
                );
                session.open_windows(&displays(2));
                assert_eq!(system.open_count(), 2);
            }
            assert_eq!(system.open_count(), 0);
        }

        #[test]
        fn test_failed_primary_promotes_next_window() {
            let system = MockWindowSystem::new();
            system.fail_open_on("DP-0");
            let mut session =
                EnforcementSession::new(BreakKind::Short, Duration::from_secs(5), Arc::new(system.clone()));

            assert_eq!(session.open_windows(&displays(3)), 2);
            assert_eq!(session.windows_failed(), 1);

            session.show(&CountdownTask::new(Duration::from_secs(5)), "Blink slowly 10 times");
            let contents = system.contents();
            assert_eq!(contents.len(), 1);
            assert_eq!(Some(contents[0].0), session.content_window());
            assert_eq!(contents[0].1.countdown, "Break Time - 0:05");
            assert_eq!(contents[0].1.music_indicator, MUSIC_INDICATOR);
        }

        #[test]
        fn test_show_without_windows_is_noop() {
            let system = MockWindowSystem::new();
            let mut session =
                EnforcementSession::new(BreakKind::Short, Duration::from_secs(5), Arc::new(system.clone()));
            session.open_windows(&[]);
            session.show(&CountdownTask::new(Duration::from_secs(5)), "x");
            assert!(system.contents().is_empty());
        }
    }

    mod enforcer_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_duration_bound_with_failing_audio() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            audio.set_should_fail_load(true);
            let locker = MockScreenLocker::new();
            let mut enforcer = enforcer(&windows, &audio, &locker, 2);

            let start = Instant::now();
            let report = enforcer.enforce(BreakKind::Short, Duration::from_secs(120)).await;
            let elapsed = start.elapsed();

            assert!(elapsed >= Duration::from_secs(120));
            assert!(elapsed <= Duration::from_secs(125));
            assert_eq!(report.residual_windows, 0);
            assert_eq!(report.windows_opened, 2);
            assert_eq!(windows.open_count(), 0);
            assert!(report.audio.aborted_by.is_some());
        }

        #[tokio::test(start_paused = true)]
        async fn test_countdown_updates_every_second() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            let locker = MockScreenLocker::new();
            let mut enforcer = enforcer(&windows, &audio, &locker, 1);

            enforcer.enforce(BreakKind::Short, Duration::from_secs(5)).await;

            let labels: Vec<String> = windows
                .contents()
                .into_iter()
                .map(|(_, content)| content.countdown)
                .collect();
            assert_eq!(labels.first().map(String::as_str), Some("Break Time - 0:05"));
            assert!(labels.contains(&"Break Time - 0:01".to_string()));
            assert!(labels.len() >= 5);
        }

        #[tokio::test(start_paused = true)]
        async fn test_zero_displays_runs_audio_only() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            let locker = MockScreenLocker::new();
            let mut enforcer = enforcer(&windows, &audio, &locker, 0);

            let start = Instant::now();
            let report = enforcer.enforce(BreakKind::Long, Duration::from_secs(30)).await;

            assert!(start.elapsed() >= Duration::from_secs(30));
            assert_eq!(report.windows_opened, 0);
            assert!(report.audio.started);
            assert_eq!(audio.stop_count(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_audio_device_unavailable() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            audio.set_device_available(false);
            let locker = MockScreenLocker::new();
            let mut enforcer = enforcer(&windows, &audio, &locker, 1);

            let start = Instant::now();
            let report = enforcer.enforce(BreakKind::Short, Duration::from_secs(10)).await;

            assert!(start.elapsed() >= Duration::from_secs(10));
            assert_eq!(report.windows_opened, 1);
            assert_eq!(report.residual_windows, 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_lock_strategy() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            let locker = MockScreenLocker::new();
            let mut enforcer =
                enforcer(&windows, &audio, &locker, 2).with_mode(BlockingMode::Lock);

            let start = Instant::now();
            let report = enforcer.enforce(BreakKind::Short, Duration::from_secs(20)).await;

            assert!(start.elapsed() >= Duration::from_secs(20));
            assert_eq!(report.strategy, BlockingStrategy::LockScreen);
            assert_eq!(locker.lock_count(), 1);
            assert!(windows.opened_specs().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_lock_failure_falls_back_to_overlay() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            let locker = MockScreenLocker::new();
            locker.set_should_fail(true);
            let mut enforcer =
                enforcer(&windows, &audio, &locker, 2).with_mode(BlockingMode::Lock);

            let report = enforcer.enforce(BreakKind::Short, Duration::from_secs(20)).await;

            assert_eq!(report.strategy, BlockingStrategy::OverlayBlackout);
            assert_eq!(report.windows_opened, 2);
            assert_eq!(report.residual_windows, 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_stalled_lock_falls_back_within_bound() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            let locker = MockScreenLocker::new();
            locker.set_hang(true);
            let mut enforcer =
                enforcer(&windows, &audio, &locker, 2).with_mode(BlockingMode::Lock);

            let start = Instant::now();
            let report = enforcer.enforce(BreakKind::Short, Duration::from_secs(30)).await;
            let elapsed = start.elapsed();

            assert!(elapsed >= Duration::from_secs(30));
            assert!(elapsed <= Duration::from_secs(30) + AUDIO_JOIN_TIMEOUT);
            assert_eq!(report.strategy, BlockingStrategy::OverlayBlackout);
            assert_eq!(report.windows_opened, 2);
            assert_eq!(report.residual_windows, 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_music_plays_until_blackout_ends() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            let locker = MockScreenLocker::new();
            locker.set_hang(true);
            let mut enforcer =
                enforcer(&windows, &audio, &locker, 1).with_mode(BlockingMode::Lock);

            // The lock wait delays the blackout; music must still cover all of it.
            let check_at = LOCK_TIMEOUT + Duration::from_secs(10) - Duration::from_millis(500);
            let checker = {
                let audio = audio.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(check_at).await;
                    audio.is_currently_playing()
                })
            };

            enforcer.enforce(BreakKind::Short, Duration::from_secs(10)).await;

            assert!(checker.await.unwrap());
            assert!(!audio.is_currently_playing());
            assert_eq!(audio.stop_count(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_rotations_persist_across_sessions() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            let locker = MockScreenLocker::new();
            let backends = SessionBackends {
                windows: Arc::new(windows.clone()),
                displays: Box::new(StaticDisplays::new(displays(1))),
                audio: Arc::new(audio.clone()),
                locker: Box::new(locker.clone()),
            };
            let config = AppConfig {
                music_files: vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")],
                ..config()
            };
            let mut enforcer = Enforcer::new(backends, &config);

            enforcer.enforce(BreakKind::Short, Duration::from_secs(1)).await;
            enforcer.enforce(BreakKind::Short, Duration::from_secs(1)).await;

            assert_eq!(
                audio.loaded_paths(),
                vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]
            );
        }

        #[test]
        fn test_strategy_auto() {
            let windows = MockWindowSystem::new();
            let audio = MockAudioBackend::new();
            let locker = MockScreenLocker::new();
            let enforcer = enforcer(&windows, &audio, &locker, 1).with_mode(BlockingMode::Auto);
            assert_eq!(enforcer.strategy(), BlockingStrategy::OverlayBlackout);

            windows.set_available(false);
            assert_eq!(enforcer.strategy(), BlockingStrategy::LockScreen);
        }
    }

    mod join_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_join_is_bounded() {
            let handle = tokio::spawn(async {
                std::future::pending::<()>().await;
                WatchdogReport::default()
            });

            let start = Instant::now();
            let report = join_watchdog(handle, AUDIO_JOIN_TIMEOUT).await;

            let elapsed = start.elapsed();
            assert!(elapsed >= AUDIO_JOIN_TIMEOUT);
            assert!(elapsed < AUDIO_JOIN_TIMEOUT + Duration::from_secs(1));
            assert_eq!(report, WatchdogReport::default());
        }

        #[tokio::test(start_paused = true)]
        async fn test_countdown_cancelled_at_deadline() {
            let mut countdown = CountdownTask::new(Duration::from_secs(3));
            let mut redraws = 0;
            run_countdown(Instant::now() + Duration::from_secs(3), &mut countdown, |_| {
                redraws += 1
            })
            .await;

            assert!(countdown.is_cancelled());
            assert!(redraws <= 3);
        }
    }
}
