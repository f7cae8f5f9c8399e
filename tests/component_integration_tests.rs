//! Component integration tests for enforcement sessions.
//!
//! These exercise `Enforcer::enforce` through the public API:
//! - Duration bound with a failing audio backend
//! - Zero, one and many displays
//! - Window creation and teardown failures
//! - Lock strategy and its overlay fallback

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use disengage::config::AppConfig;
use disengage::session::{
    BlockingMode, BlockingStrategy, BreakEnforcer, DisplayInfo, Enforcer, MockScreenLocker,
    MockWindowSystem, SessionBackends, StaticDisplays, WindowRole, MUSIC_INDICATOR,
};
use disengage::sound::MockAudioBackend;
use disengage::types::{BreakKind, SelectionMode};

const JOIN_SLACK: Duration = Duration::from_secs(5);

fn displays(n: usize) -> Vec<DisplayInfo> {
    (0..n)
        .map(|i| DisplayInfo::new(format!("DP-{}", i), 1920, 1080, 1920 * i as i32, 0))
        .collect()
}

fn create_enforcer(
    windows: &MockWindowSystem,
    audio: &MockAudioBackend,
    locker: &MockScreenLocker,
    n_displays: usize,
    mode: BlockingMode,
) -> Enforcer {
    let config = AppConfig {
        music_files: vec![PathBuf::from("soothing.mp3")],
        message_mode: SelectionMode::Sequential,
        blocking_mode: mode,
        ..AppConfig::default()
    };
    let backends = SessionBackends {
        windows: Arc::new(windows.clone()),
        displays: Box::new(StaticDisplays::new(displays(n_displays))),
        audio: Arc::new(audio.clone()),
        locker: Box::new(locker.clone()),
    };
    Enforcer::new(backends, &config)
}

fn assert_within_bound(elapsed: Duration, duration: Duration) {
    assert!(elapsed >= duration, "returned early: {:?}", elapsed);
    assert!(elapsed <= duration + JOIN_SLACK, "returned late: {:?}", elapsed);
}

// ============================================================================
// Duration bound
// ============================================================================

mod duration_bound {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_short_break_with_missing_music() {
        let windows = MockWindowSystem::new();
        let audio = MockAudioBackend::new();
        audio.set_should_fail_load(true);
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 1, BlockingMode::Overlay);

        let start = Instant::now();
        let report = enforcer
            .enforce(BreakKind::Short, Duration::from_secs(120))
            .await;

        assert_within_bound(start.elapsed(), Duration::from_secs(120));
        assert_eq!(report.residual_windows, 0);
        assert_eq!(windows.open_count(), 0);
        assert!(!report.audio.started);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_break_with_every_audio_call_failing() {
        let windows = MockWindowSystem::new();
        let audio = MockAudioBackend::new();
        audio.set_should_fail_all(true);
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 3, BlockingMode::Overlay);

        let start = Instant::now();
        let report = enforcer
            .enforce(BreakKind::Long, Duration::from_secs(300))
            .await;

        assert_within_bound(start.elapsed(), Duration::from_secs(300));
        assert_eq!(report.windows_opened, 3);
        assert_eq!(report.residual_windows, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_strategy_keeps_same_bound() {
        let windows = MockWindowSystem::new();
        let audio = MockAudioBackend::new();
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 2, BlockingMode::Lock);

        let start = Instant::now();
        let report = enforcer
            .enforce(BreakKind::Short, Duration::from_secs(120))
            .await;

        assert_within_bound(start.elapsed(), Duration::from_secs(120));
        assert_eq!(report.strategy, BlockingStrategy::LockScreen);
        assert_eq!(locker.lock_count(), 1);
    }
    #[tokio::test(start_paused = true)]
    async fn test_stalled_lock_command_cannot_hold_the_session() {
        let windows = MockWindowSystem::new();
        let audio = MockAudioBackend::new();
        let locker = MockScreenLocker::new();
        locker.set_hang(true);
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 2, BlockingMode::Lock);

        let start = Instant::now();
        let report = enforcer
            .enforce(BreakKind::Short, Duration::from_secs(120))
            .await;

        assert_within_bound(start.elapsed(), Duration::from_secs(120));
        assert_eq!(report.strategy, BlockingStrategy::OverlayBlackout);
        assert_eq!(report.residual_windows, 0);
    }
}

// ============================================================================
// Displays and windows
// ============================================================================

mod windows {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_zero_displays_is_audio_only() {
        let windows = MockWindowSystem::new();
        let audio = MockAudioBackend::new();
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 0, BlockingMode::Overlay);

        let start = Instant::now();
        let report = enforcer
            .enforce(BreakKind::Short, Duration::from_secs(60))
            .await;

        assert_within_bound(start.elapsed(), Duration::from_secs(60));
        assert_eq!(report.windows_opened, 0);
        assert!(report.audio.started);
        assert!(windows.contents().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_primary_captures_input() {
        let windows = MockWindowSystem::new();
        let audio = MockAudioBackend::new();
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 3, BlockingMode::Overlay);

        enforcer
            .enforce(BreakKind::Short, Duration::from_secs(2))
            .await;

        let specs = windows.opened_specs();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].role, WindowRole::Primary);
        assert_eq!(specs.iter().filter(|s| s.capture_input).count(), 1);
        assert!(specs.iter().all(|s| s.always_on_top && s.refuse_close));
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_failure_moves_content() {
        let windows = MockWindowSystem::new();
        windows.fail_open_on("DP-0");
        let audio = MockAudioBackend::new();
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 2, BlockingMode::Overlay);

        let report = enforcer
            .enforce(BreakKind::Short, Duration::from_secs(3))
            .await;

        assert_eq!(report.windows_opened, 1);
        assert_eq!(report.windows_failed, 1);
        let contents = windows.contents();
        assert!(!contents.is_empty());
        assert_eq!(contents[0].1.music_indicator, MUSIC_INDICATOR);
        assert_eq!(contents[0].1.message, "Rest your eyes and stretch");
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_errors_leave_no_residual_windows() {
        let windows = MockWindowSystem::new();
        windows.set_should_fail_close(true);
        let audio = MockAudioBackend::new();
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 2, BlockingMode::Overlay);

        let start = Instant::now();
        let report = enforcer
            .enforce(BreakKind::Short, Duration::from_secs(30))
            .await;

        assert_within_bound(start.elapsed(), Duration::from_secs(30));
        assert_eq!(report.residual_windows, 0);
        assert_eq!(windows.closed().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_system_unavailable_falls_back_in_auto() {
        let windows = MockWindowSystem::new();
        windows.set_available(false);
        let audio = MockAudioBackend::new();
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 2, BlockingMode::Auto);

        let report = enforcer
            .enforce(BreakKind::Long, Duration::from_secs(10))
            .await;

        assert_eq!(report.strategy, BlockingStrategy::LockScreen);
        assert_eq!(locker.lock_count(), 1);
    }
}

// ============================================================================
// Audio
// ============================================================================

mod audio {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_playback_is_restarted() {
        let windows = MockWindowSystem::new();
        let audio = MockAudioBackend::new();
        let locker = MockScreenLocker::new();
        let mut enforcer = create_enforcer(&windows, &audio, &locker, 1, BlockingMode::Overlay);

        let interrupter = {
            let audio = audio.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                audio.interrupt_playback();
            })
        };

        let report = enforcer
            .enforce(BreakKind::Short, Duration::from_secs(20))
            .await;
        interrupter.await.unwrap();

        assert!(report.audio.started);
        assert_eq!(report.audio.restarts, 1);
        assert!(!audio.is_currently_playing());
    }
}
