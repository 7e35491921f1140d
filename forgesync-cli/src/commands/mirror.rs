//! `forgesync mirror <repo>`

use anyhow::{Context, Result};
use clap::Args;

use forgesync_core::{format_interval, ProvisioningRequest, Visibility, DEFAULT_MIRROR_INTERVAL};
use forgesync_forge::MirrorOutcome;

use crate::console;
use crate::PlatformArgs;

/// Register the push mirror for a repository already on the primary host.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Repository name on the primary host.
    pub repo: String,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

impl MirrorArgs {
    pub fn run(self) -> Result<()> {
        // Nothing is created here, so visibility is never sent.
        let request = ProvisioningRequest::new(
            self.repo.trim(),
            Visibility::default(),
            self.platform.platform(),
        );

        console::banner(&[format!("Setting up mirror for: {}", request.repository)]);
        let report = super::orchestrator()?
            .register_mirror(&request)
            .with_context(|| format!("mirror setup failed for '{}'", request.repository))?;

        match report.mirror {
            MirrorOutcome::Registered => console::success("Mirror setup complete!"),
            MirrorOutcome::AlreadyRegistered => console::success("Mirror was already set up"),
        }
        console::print_urls(&report.urls);
        println!(
            "\nThe repository syncs on every commit and every {}.",
            format_interval(DEFAULT_MIRROR_INTERVAL)
        );
        Ok(())
    }
}
