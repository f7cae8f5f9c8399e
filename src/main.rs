//! Disengage - enforced rest breaks
//!
//! Periodically interrupts work with two kinds of breaks:
//! - short breaks (2 minutes every hour by default)
//! - long breaks (5 minutes every 3 hours by default)
//!
//! Each break blocks the screen and plays music for its whole duration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{info, warn};

use disengage::cli::{Cli, Commands, Display, NowArgs, RunArgs};
use disengage::config::AppConfig;
use disengage::daemon::{shutdown_signal, BreakScheduler};
use disengage::prompt::{AutoPrompt, Prompt, TerminalPrompt};
use disengage::session::{
    BlockingMode, BreakEnforcer, DisplayEnumerator, Enforcer, NoWindowSystem, SessionBackends,
    StaticDisplays, SystemLocker, WindowSystem,
};
use disengage::sound::{try_acquire_audio, AudioHandle, AudioOutput, AudioSubsystem, SilentOutput};
use disengage::types::BreakKind;

/// Main entry point
fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(&cli);

    // Execute command
    if let Err(e) = execute(cli) {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Default log level when `RUST_LOG` is unset.
fn default_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        return "debug";
    }
    match cli.command_or_default() {
        Commands::Run(_) | Commands::Now(_) => "info",
        _ => "warn",
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = default_log_level(cli);
    let filter = if cli.verbose {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command_or_default() {
        Commands::Run(args) => {
            let config = load_config(&cli)?;
            launch(move |windows| run_scheduler(config, args, windows))?;
        }
        Commands::Now(args) => {
            let config = load_config(&cli)?;
            launch(move |windows| run_now(config, args, windows))?;
        }
        Commands::Check => {
            let config = load_config(&cli)?;
            let displays = display_enumerator(&config).displays().unwrap_or_else(|e| {
                warn!("{}", e);
                Vec::new()
            });
            Display::show_check_success(&config, &displays);
        }
        Commands::Config { default } => {
            let config = if default {
                AppConfig::default()
            } else {
                load_config(&cli)?
            };
            let json = config
                .to_json_pretty()
                .context("設定のシリアライズに失敗しました")?;
            println!("{}", json);
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Loads the configuration, attaching the fix-it hint to errors.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    AppConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow!("{}\n  ヒント: {}", e, e.suggestion()))
}

// ============================================================================
// Runtime
// ============================================================================

/// Runs `job` with the best window system this build and session offer.
#[cfg(feature = "gui")]
fn launch<F, Fut>(job: F) -> Result<()>
where
    F: FnOnce(Arc<dyn WindowSystem>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>>,
{
    if disengage::gui::display_server_available() {
        return disengage::gui::run_with_overlays(job);
    }
    warn!("No display server found, overlay windows disabled");
    run_headless(job)
}

/// Runs `job` with the best window system this build and session offer.
#[cfg(not(feature = "gui"))]
fn launch<F, Fut>(job: F) -> Result<()>
where
    F: FnOnce(Arc<dyn WindowSystem>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>>,
{
    run_headless(job)
}

/// Runs `job` on a tokio runtime without overlay windows.
fn run_headless<F, Fut>(job: F) -> Result<()>
where
    F: FnOnce(Arc<dyn WindowSystem>) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("tokio ランタイムの作成に失敗しました")?;
    runtime.block_on(job(Arc::new(NoWindowSystem)))
}

// ============================================================================
// Commands
// ============================================================================

/// Picks the display source: the configured layout, monitors, or none.
fn display_enumerator(config: &AppConfig) -> Box<dyn DisplayEnumerator> {
    if let Some(displays) = &config.displays {
        return Box::new(StaticDisplays::new(displays.clone()));
    }
    #[cfg(feature = "gui")]
    {
        if disengage::gui::display_server_available() {
            return Box::new(disengage::gui::XcapDisplays);
        }
    }
    Box::new(StaticDisplays::default())
}

fn build_enforcer(
    config: &AppConfig,
    windows: Arc<dyn WindowSystem>,
    audio: Option<AudioHandle>,
    blocking: Option<BlockingMode>,
) -> Enforcer {
    let audio: Arc<dyn AudioOutput> = match audio {
        Some(handle) => Arc::new(handle),
        None => Arc::new(SilentOutput),
    };
    let backends = SessionBackends {
        windows,
        displays: display_enumerator(config),
        audio,
        locker: Box::new(SystemLocker),
    };
    let enforcer = Enforcer::new(backends, config);
    match blocking {
        Some(mode) => enforcer.with_mode(mode),
        None => enforcer,
    }
}

/// `run`: the scheduler loop until a termination signal.
async fn run_scheduler(
    config: AppConfig,
    args: RunArgs,
    windows: Arc<dyn WindowSystem>,
) -> Result<()> {
    let audio = try_acquire_audio();
    let audio_handle = audio.as_ref().map(AudioSubsystem::handle);

    let enforcer = build_enforcer(&config, windows, audio_handle.clone(), args.blocking);
    Display::show_banner(&config, &enforcer.displays(), enforcer.strategy());

    let profile = config.profile();
    let result = if args.non_interactive {
        supervise(BreakScheduler::new(profile, AutoPrompt, enforcer)).await
    } else {
        let prompt = TerminalPrompt::new().context("入力スレッドの起動に失敗しました")?;
        supervise(BreakScheduler::new(profile, prompt, enforcer)).await
    };

    if let Some(handle) = &audio_handle {
        handle.stop_all();
    }
    drop(audio);
    info!("Disengage stopped");
    result
}

/// Runs the scheduler until a termination signal arrives.
async fn supervise<P: Prompt, E: BreakEnforcer>(mut scheduler: BreakScheduler<P, E>) -> Result<()> {
    tokio::select! {
        _ = scheduler.run() => Ok(()),
        signal = shutdown_signal() => {
            signal.context("シグナルハンドラの登録に失敗しました")?;
            info!("Shutting down");
            Ok(())
        }
    }
}

/// `now`: one break, then exit.
async fn run_now(config: AppConfig, args: NowArgs, windows: Arc<dyn WindowSystem>) -> Result<()> {
    let audio = try_acquire_audio();
    let audio_handle = audio.as_ref().map(AudioSubsystem::handle);

    let mut enforcer = build_enforcer(&config, windows, audio_handle.clone(), args.blocking);
    let kind = BreakKind::from(args.kind);
    let duration = args
        .duration
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.profile().duration(kind));

    tokio::select! {
        report = enforcer.enforce(kind, duration) => {
            Display::show_session_report(&report);
        }
        signal = shutdown_signal() => {
            signal.context("シグナルハンドラの登録に失敗しました")?;
            info!("Break interrupted");
        }
    }

    if let Some(handle) = &audio_handle {
        handle.stop_all();
    }
    drop(audio);
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
