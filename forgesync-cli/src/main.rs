//! forgesync: provision repositories on a self-hosted primary host and keep
//! them push-mirrored to GitHub or GitLab.
//!
//! # Usage
//!
//! ```text
//! forgesync init
//! forgesync create <repo> [-p|--private] [--github|--gitlab] [--dir <path>]
//! forgesync add [path] [-n|--name <repo>] [-p] [--github|--gitlab]
//! forgesync mirror <repo> [--github|--gitlab]
//! forgesync bulk [-p] [--github|--gitlab]        # names on stdin
//! ```

mod commands;
mod console;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};

use commands::{
    add::AddArgs, bulk::BulkArgs, create::CreateArgs, init::InitArgs, mirror::MirrorArgs,
};
use forgesync_core::{Platform, Visibility};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "forgesync",
    version,
    about = "Create repositories on your primary git host and push-mirror them to GitHub or GitLab",
    long_about = None,
)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store credentials for the primary host, GitHub and GitLab.
    Init(InitArgs),

    /// Create a brand-new repository everywhere, seed it and clone it.
    Create(CreateArgs),

    /// Publish an existing local working copy.
    Add(AddArgs),

    /// Register the push mirror for a repository that already exists.
    Mirror(MirrorArgs),

    /// Ensure + mirror many repositories, names read from stdin.
    Bulk(BulkArgs),
}

// ---------------------------------------------------------------------------
// Shared arguments
// ---------------------------------------------------------------------------

/// `--github` / `--gitlab`. Neither means GitHub.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PlatformArgs {
    /// Mirror to GitHub (default).
    #[arg(long, conflicts_with = "gitlab")]
    pub github: bool,

    /// Mirror to GitLab.
    #[arg(long)]
    pub gitlab: bool,
}

impl PlatformArgs {
    pub fn platform(self) -> Platform {
        Platform::from_flags(self.github, self.gitlab)
    }
}

/// `-p` / `--private`, applied to every provider touched.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct VisibilityArgs {
    /// Create repositories as private.
    #[arg(short, long)]
    pub private: bool,
}

impl VisibilityArgs {
    pub fn visibility(self) -> Visibility {
        Visibility::from_private_flag(self.private)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Create(args) => args.run(),
        Commands::Add(args) => args.run(),
        Commands::Mirror(args) => args.run(),
        Commands::Bulk(args) => args.run(),
    }
}

/// Logs go to stderr; stdout carries progress lines only.
fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn github_and_gitlab_conflict() {
        let err = Cli::try_parse_from(["forgesync", "mirror", "demo", "--github", "--gitlab"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn verbose_is_global_and_counts() {
        let cli = Cli::try_parse_from(["forgesync", "bulk", "-vv", "-p"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Bulk(args) => {
                assert_eq!(args.visibility.visibility(), Visibility::Private);
                assert_eq!(args.platform.platform(), Platform::GitHub);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
