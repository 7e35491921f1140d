//! `forgesync add [path]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use forgesync_core::ProvisioningRequest;

use crate::console;
use crate::{PlatformArgs, VisibilityArgs};

/// Publish an existing working copy: ensure the repository on both
/// providers, register the mirror and push the current branch.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Working copy root (default: current directory).
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Repository name (default: the directory's name).
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub visibility: VisibilityArgs,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

impl AddArgs {
    pub fn run(self) -> Result<()> {
        let path = self
            .path
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.path.display()))?;
        let name = match self.name {
            Some(name) => name.trim().to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .with_context(|| format!("cannot derive a repository name from '{}'", path.display()))?,
        };
        let request = ProvisioningRequest::new(
            name,
            self.visibility.visibility(),
            self.platform.platform(),
        );

        console::banner(&[
            format!("Adding repository: {}", request.repository),
            format!("Path: {}", path.display()),
            format!("Visibility: {}", request.visibility),
            format!("Mirror target: {}", request.platform),
        ]);
        let report = super::orchestrator()?
            .provision_existing(&path, &request)
            .with_context(|| format!("add failed for '{}'", request.repository))?;

        console::success("Repository successfully added!");
        console::print_urls(&report.urls);
        if let Some(remote) = &report.remote {
            println!(
                "\nLocal branch '{}' now pushes to remote '{}'.",
                remote.branch, remote.remote
            );
        }
        Ok(())
    }
}
