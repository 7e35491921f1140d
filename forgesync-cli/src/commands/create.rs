//! `forgesync create <repo>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use forgesync_core::ProvisioningRequest;

use crate::console;
use crate::{PlatformArgs, VisibilityArgs};

/// Create a repository on the secondary platform and the primary host,
/// register the mirror, push an initial commit and clone it locally.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Repository name.
    pub repo: String,

    #[command(flatten)]
    pub visibility: VisibilityArgs,

    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Directory to clone into (default: current directory).
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,
}

impl CreateArgs {
    pub fn run(self) -> Result<()> {
        let request = ProvisioningRequest::new(
            self.repo.trim(),
            self.visibility.visibility(),
            self.platform.platform(),
        );
        let target_dir = match self.dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("cannot read current directory")?,
        };

        console::banner(&[
            format!("Creating repository: {}", request.repository),
            format!("Visibility: {}", request.visibility),
            format!("Mirror target: {}", request.platform),
        ]);
        let report = super::orchestrator()?
            .provision_new(&request, &target_dir)
            .with_context(|| format!("create failed for '{}'", request.repository))?;

        console::success("Repository fully initialized and ready!");
        console::print_urls(&report.urls);
        if let Some(path) = &report.local_path {
            println!("\nLocal directory: {}", path.display());
        }
        Ok(())
    }
}
