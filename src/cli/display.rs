//! Display utilities for the Disengage CLI.
//!
//! This module provides formatted output for:
//! - The startup banner
//! - Effective settings (`check`)
//! - Session reports (`now`)
//! - Error messages

use std::time::Duration;

use crate::config::AppConfig;
use crate::session::{format_time, BlockingStrategy, DisplayInfo, SessionReport};
use crate::types::BreakProfile;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the startup banner for the scheduler.
    pub fn show_banner(config: &AppConfig, displays: &[DisplayInfo], strategy: BlockingStrategy) {
        println!("Disengage - 強制休憩タイマー");
        println!("─────────────────────────────");
        for line in Self::profile_lines(&config.profile()) {
            println!("{}", line);
        }
        println!("音楽: {}", Self::music_list(config));
        println!("メッセージ: {:?}", config.message_mode);
        println!("ブロック方式: {}", strategy.as_str());
        for line in Self::display_lines(displays) {
            println!("{}", line);
        }
        println!();
    }

    /// Shows the result of a successful `check`.
    pub fn show_check_success(config: &AppConfig, displays: &[DisplayInfo]) {
        println!("* 設定は有効です");
        for line in Self::profile_lines(&config.profile()) {
            println!("  {}", line);
        }
        println!("  音楽: {}", Self::music_list(config));
        for line in Self::display_lines(displays) {
            println!("  {}", line);
        }
    }

    /// Shows the outcome of a single break.
    pub fn show_session_report(report: &SessionReport) {
        let (minutes, seconds) = format_time(report.elapsed.as_secs());
        println!("* 休憩が終了しました ({})", report.kind);
        println!("  経過時間: {}:{:02}", minutes, seconds);
        println!("  ブロック方式: {}", report.strategy.as_str());
        if report.strategy == BlockingStrategy::OverlayBlackout {
            println!(
                "  ウィンドウ: {} 枚 (失敗 {} 枚)",
                report.windows_opened, report.windows_failed
            );
        }
        if report.audio.started {
            println!("  音楽: 再生しました (再開 {} 回)", report.audio.restarts);
        } else if let Some(e) = &report.audio.aborted_by {
            println!("  音楽: 再生できませんでした ({})", e);
        } else {
            println!("  音楽: なし");
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Lines describing the break profile.
    fn profile_lines(profile: &BreakProfile) -> Vec<String> {
        vec![
            format!(
                "短い休憩: {} ごとに {}",
                Self::format_duration(profile.short_interval),
                Self::format_duration(profile.short_duration)
            ),
            format!(
                "長い休憩: {} ごとに {}",
                Self::format_duration(profile.long_interval),
                Self::format_duration(profile.long_duration)
            ),
            format!(
                "スキップ閾値: {}",
                Self::format_duration(profile.skip_threshold)
            ),
            format!(
                "予告: {} 前 (カウントダウン {})",
                Self::format_duration(profile.warning_lead),
                Self::format_duration(profile.prompt_countdown)
            ),
        ]
    }

    fn music_list(config: &AppConfig) -> String {
        let files: Vec<String> = config
            .music_files
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        format!("{} ({:?})", files.join(", "), config.music_mode)
    }

    /// Lines describing the displays; the first is marked primary.
    fn display_lines(displays: &[DisplayInfo]) -> Vec<String> {
        if displays.is_empty() {
            return vec!["ディスプレイ: 検出されませんでした (音声のみ)".to_string()];
        }
        let mut lines = vec![format!("ディスプレイ: {} 台", displays.len())];
        for (index, display) in displays.iter().enumerate() {
            let marker = if index == 0 { " [primary]" } else { "" };
            lines.push(format!(
                "  {}: {} {}{}",
                index,
                display.name,
                display.geometry(),
                marker
            ));
        }
        lines
    }

    /// Formats a duration as `1h`, `25m`, `90s` or a combination.
    fn format_duration(duration: Duration) -> String {
        let total = duration.as_secs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        let mut parts = Vec::new();
        if hours > 0 {
            parts.push(format!("{}h", hours));
        }
        if minutes > 0 {
            parts.push(format!("{}m", minutes));
        }
        if seconds > 0 || parts.is_empty() {
            parts.push(format!("{}s", seconds));
        }
        parts.join("")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::{SoundError, WatchdogReport};
    use crate::types::BreakKind;

    // ------------------------------------------------------------------------
    // Format Duration Tests
    // ------------------------------------------------------------------------

    mod format_duration_tests {
        use super::*;

        #[test]
        fn test_format_zero() {
            assert_eq!(Display::format_duration(Duration::ZERO), "0s");
        }

        #[test]
        fn test_format_minutes() {
            assert_eq!(Display::format_duration(Duration::from_secs(25 * 60)), "25m");
        }

        #[test]
        fn test_format_hours() {
            assert_eq!(Display::format_duration(Duration::from_secs(3 * 3600)), "3h");
        }

        #[test]
        fn test_format_mixed() {
            assert_eq!(Display::format_duration(Duration::from_secs(3480)), "58m");
            assert_eq!(Display::format_duration(Duration::from_secs(3661)), "1h1m1s");
            assert_eq!(Display::format_duration(Duration::from_secs(90)), "1m30s");
        }
    }

    // ------------------------------------------------------------------------
    // Line Builder Tests
    // ------------------------------------------------------------------------

    mod line_tests {
        use super::*;

        #[test]
        fn test_profile_lines() {
            let lines = Display::profile_lines(&BreakProfile::default());
            assert_eq!(lines.len(), 4);
            assert!(lines[0].contains("1h"));
            assert!(lines[0].contains("2m"));
            assert!(lines[1].contains("3h"));
            assert!(lines[1].contains("5m"));
            assert!(lines[2].contains("25m"));
        }

        #[test]
        fn test_display_lines_marks_first_primary() {
            let displays = vec![
                DisplayInfo::new("DP-1", 1920, 1080, 0, 0),
                DisplayInfo::new("HDMI-1", 2560, 1440, 1920, 0).primary(),
            ];
            let lines = Display::display_lines(&displays);
            assert_eq!(lines.len(), 3);
            assert!(lines[1].contains("DP-1"));
            assert!(lines[1].contains("[primary]"));
            assert!(!lines[2].contains("[primary]"));
        }

        #[test]
        fn test_display_lines_empty() {
            let lines = Display::display_lines(&[]);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].contains("音声のみ"));
        }

        #[test]
        fn test_music_list() {
            let list = Display::music_list(&AppConfig::default());
            assert!(list.contains("soothing.mp3"));
            assert!(list.contains("Random"));
        }
    }

    // ------------------------------------------------------------------------
    // Display Output Tests
    // ------------------------------------------------------------------------

    mod display_tests {
        use super::*;

        fn report(audio: WatchdogReport) -> SessionReport {
            SessionReport {
                kind: BreakKind::Short,
                strategy: BlockingStrategy::OverlayBlackout,
                windows_opened: 2,
                windows_failed: 0,
                residual_windows: 0,
                audio,
                elapsed: Duration::from_secs(120),
            }
        }

        #[test]
        fn test_show_banner() {
            // This test verifies the function doesn't panic
            Display::show_banner(
                &AppConfig::default(),
                &[DisplayInfo::new("DP-1", 1920, 1080, 0, 0)],
                BlockingStrategy::OverlayBlackout,
            );
        }

        #[test]
        fn test_show_check_success() {
            Display::show_check_success(&AppConfig::default(), &[]);
        }

        #[test]
        fn test_show_session_report_variants() {
            Display::show_session_report(&report(WatchdogReport {
                started: true,
                restarts: 1,
                aborted_by: None,
            }));
            Display::show_session_report(&report(WatchdogReport {
                started: false,
                restarts: 0,
                aborted_by: Some(SoundError::MusicNotFound {
                    path: std::path::PathBuf::from("soothing.mp3"),
                    reason: "not found".to_string(),
                }),
            }));
            Display::show_session_report(&report(WatchdogReport::default()));
        }

        #[test]
        fn test_show_error() {
            Display::show_error("Test error message");
        }
    }
}
