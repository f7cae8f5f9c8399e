//! Command definitions for the Disengage CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::session::BlockingMode;
use crate::types::BreakKind;

// ============================================================================
// CLI Structure
// ============================================================================

/// Disengage - enforced rest breaks
#[derive(Parser, Debug)]
#[command(
    name = "disengage",
    version,
    about = "強制休憩タイマー",
    long_about = "一定間隔で画面をブロックし、音楽を流して休憩を強制します。\n\
                  短い休憩と長い休憩の2種類があり、長い休憩が近い場合は短い休憩をスキップします。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Returns the command to run, defaulting to `run`.
    #[must_use]
    pub fn command_or_default(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the break scheduler (default)
    Run(RunArgs),

    /// Start one break immediately, then exit
    Now(NowArgs),

    /// Validate the configuration and show the effective settings
    Check,

    /// Print the effective configuration as JSON
    Config {
        /// Print the built-in defaults instead
        #[arg(long)]
        default: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Never prompt; every break starts immediately
    #[arg(long)]
    pub non_interactive: bool,

    /// Override the configured blocking mode
    #[arg(long, value_enum)]
    pub blocking: Option<BlockingMode>,
}

/// Break kind as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Short,
    Long,
}

impl From<KindArg> for BreakKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Short => BreakKind::Short,
            KindArg::Long => BreakKind::Long,
        }
    }
}

/// Arguments for the now command
#[derive(Args, Debug, Clone)]
pub struct NowArgs {
    /// Which break to run
    #[arg(short, long, value_enum, default_value = "short")]
    pub kind: KindArg,

    /// Break length in seconds (1-7200); defaults to the configured length
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u64).range(1..=7200)
    )]
    pub duration: Option<u64>,

    /// Override the configured blocking mode
    #[arg(long, value_enum)]
    pub blocking: Option<BlockingMode>,
}

// ============================================================================
// Tests
// ============================================================================
