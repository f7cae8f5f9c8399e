//! Native overlay windows.
//!
//! # Architecture
//!
//! ```text
//! main thread                        scheduler thread (tokio runtime)
//! ┌──────────────────┐  OverlayCommand  ┌────────────────────┐
//! │ iced daemon      │◀─────────────────│ ProxyWindowSystem  │
//! │ (OverlayApp)     │   crossbeam      │ (WindowSystem)     │
//! └──────────────────┘                  └────────────────────┘
//! ```
//!
//! The proxy half is always built so it can be tested headless; the iced
//! daemon and xcap monitor enumeration need the `gui` feature.

mod proxy;

#[cfg(feature = "gui")]
mod monitors;
#[cfg(feature = "gui")]
mod overlay;

pub use proxy::{overlay_channel, OverlayCommand, OverlayCommands, ProxyWindowSystem};

#[cfg(feature = "gui")]
pub use monitors::XcapDisplays;
#[cfg(feature = "gui")]
pub use overlay::{run_overlay_daemon, COMMAND_POLL};

/// Returns true if a graphical session looks reachable.
///
/// On Linux this requires an X11 or Wayland display; other platforms always
/// have one.
#[must_use]
pub fn display_server_available() -> bool {
    if cfg!(target_os = "linux") {
        std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
    } else {
        true
    }
}

/// Runs `job` on a scheduler thread while the overlay UI owns the main
/// thread.
///
/// `job` receives the window system to use. The UI exits once `job` has
/// finished and dropped it.
///
/// # Errors
///
/// Returns the error of `job`, or an error if the scheduler thread cannot be
/// started or panics.
#[cfg(feature = "gui")]
pub fn run_with_overlays<F, Fut>(job: F) -> anyhow::Result<()>
where
    F: FnOnce(std::sync::Arc<dyn crate::session::WindowSystem>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    use std::sync::Arc;

    use anyhow::Context;
    use tracing::warn;

    let (proxy, commands) = overlay_channel();

    let worker = std::thread::Builder::new()
        .name("scheduler".to_string())
        .spawn(move || -> anyhow::Result<()> {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .context("tokio ランタイムの作成に失敗しました")?;
            runtime.block_on(job(Arc::new(proxy)))
        })
        .context("スケジューラスレッドの起動に失敗しました")?;

    if let Err(e) = run_overlay_daemon(commands) {
        warn!("Overlay UI stopped: {}", e);
    }

    worker
        .join()
        .map_err(|_| anyhow::anyhow!("スケジューラスレッドが異常終了しました"))?
}
