//! Orchestrator: sequences provider gateways, the mirror registrar and the
//! local remote reconciler for one repository or a batch.
//!
//! Stages run in a fixed order and are each idempotent. A failure stops the
//! current repository and names its stage; completed stages are left as they
//! are so a re-run converges.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use forgesync_core::config::templates_dir_at;
use forgesync_core::{
    Config, DestinationCredential, MirrorSpec, Platform, PrimaryAccount, ProvisioningRequest,
    RepositoryIdentity, SecondaryAccount, Visibility,
};
use forgesync_forge::{
    CreateSpec, MirrorOutcome, MirrorRegistrar, ProviderGateway, RepositoryGateway, Transport,
};
use forgesync_git::{
    clone_repository, ensure_working_copy, remote_access, remote_branches, seed_repository,
    GitError, ReconcileOptions, ReconcileOutcome, Reconciler, RemoteAccess, RemoteState, SeedFile,
};
use forgesync_renderer::{SeedContext, SeedRenderer};

use crate::error::{io_err, Stage, SyncError};
use crate::progress::{NullSink, ProgressEvent, ProgressSink};

/// Branch a brand-new repository is seeded on.
pub const SEED_BRANCH: &str = "main";

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExisted,
}

/// Where the repository can be found after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUrl {
    pub provider: &'static str,
    pub url: String,
}

/// Outcome of one repository's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub repository: String,
    /// `None` when the run does not touch the secondary platform.
    pub secondary: Option<Provisioned>,
    /// `None` for mirror-only runs, which never create on the primary.
    pub primary: Option<Provisioned>,
    pub mirror: MirrorOutcome,
    pub remote: Option<ReconcileOutcome>,
    /// Local clone created by a new-repository run.
    pub local_path: Option<PathBuf>,
    pub urls: Vec<RepositoryUrl>,
}

#[derive(Debug)]
pub struct BatchEntry {
    pub repository: String,
    pub result: Result<ProvisionReport, SyncError>,
}

/// Per-repository results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn completed(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| e.result.is_err())
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

struct Accounts {
    primary: PrimaryAccount,
    secondary: SecondaryAccount,
}

pub struct Orchestrator {
    config: Config,
    transport: Arc<dyn Transport>,
    progress: Arc<dyn ProgressSink>,
    templates_dir: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            progress: Arc::new(NullSink),
            templates_dir: None,
        }
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Seed-template overrides, usually `~/.forgesync/templates`.
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }

    /// Overrides under `<home>/.forgesync/templates`.
    pub fn with_home(self, home: &Path) -> Self {
        self.with_templates_dir(templates_dir_at(home))
    }

    // -----------------------------------------------------------------------
    // 1. Existing working copy (`add`)
    // -----------------------------------------------------------------------

    /// Secondary create-if-absent, primary create-if-absent, mirror, then
    /// reconcile the working copy at `path` and push.
    pub fn provision_existing(
        &self,
        path: &Path,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionReport, SyncError> {
        ensure_working_copy(path).map_err(|e| SyncError::at(Stage::LocalRemote, e))?;
        let accounts = self.accounts(request.platform)?;

        let secondary = self.ensure_secondary(&accounts, request)?;
        let primary = self.ensure_primary(&accounts, &request.repository, request.visibility)?;
        let mirror = self.register(&accounts, &request.repository)?;

        let identity = RepositoryIdentity::new(&accounts.primary.username, &request.repository);
        let access = remote_access(self.config.remote.credentials, &accounts.primary);
        let reconciler = Reconciler::new(access.as_ref(), ReconcileOptions::from(&self.config.remote));

        self.emit(ProgressEvent::Step {
            stage: Stage::LocalRemote,
            message: format!("Configuring remote for {}", access.display_url(&identity)),
        });
        let outcome = reconciler
            .reconcile(path, &identity)
            .map_err(|e| SyncError::at(Stage::LocalRemote, e))?;
        if let RemoteState::OriginIsOther { url } = &outcome.state {
            self.emit(ProgressEvent::Info {
                message: format!("origin exists ({url}); using remote '{}'", outcome.remote),
            });
        }
        self.emit(ProgressEvent::Done {
            stage: Stage::LocalRemote,
            message: format!("Pushed {} to {}", outcome.branch, outcome.remote),
        });

        Ok(ProvisionReport {
            repository: request.repository.clone(),
            secondary: Some(secondary),
            primary: Some(primary),
            mirror,
            remote: Some(outcome),
            local_path: Some(path.to_path_buf()),
            urls: urls(&accounts, &request.repository),
        })
    }

    // -----------------------------------------------------------------------
    // 2. Brand-new repository (`create`)
    // -----------------------------------------------------------------------

    /// Provisions both providers and the mirror, pushes a seed commit when
    /// the primary repository has no branches yet, and clones it into
    /// `target_dir/<repo>`. Fails before any provider call if that
    /// directory already exists.
    pub fn provision_new(
        &self,
        request: &ProvisioningRequest,
        target_dir: &Path,
    ) -> Result<ProvisionReport, SyncError> {
        let target = target_dir.join(&request.repository);
        if target.exists() {
            return Err(SyncError::at(Stage::Clone, GitError::TargetExists { path: target }));
        }
        let accounts = self.accounts(request.platform)?;

        let secondary = self.ensure_secondary(&accounts, request)?;
        let primary = self.ensure_primary(&accounts, &request.repository, request.visibility)?;
        let mirror = self.register(&accounts, &request.repository)?;

        let identity = RepositoryIdentity::new(&accounts.primary.username, &request.repository);
        let access = remote_access(self.config.remote.credentials, &accounts.primary);
        let remote_url = access.remote_url(&identity);

        let scratch = tempfile::Builder::new()
            .prefix("forgesync-seed-")
            .tempdir()
            .map_err(|e| io_err(std::env::temp_dir(), e))?;
        let heads = remote_branches(scratch.path(), &remote_url)
            .map_err(|e| SyncError::at(Stage::Seeding, e))?;

        // Seed whenever the primary repository is empty, not only when this
        // run created it.
        let checkout = if heads.is_empty() {
            let files = self.seed_files(&identity, request)?;
            self.emit(ProgressEvent::Step {
                stage: Stage::Seeding,
                message: "Pushing initial commit".into(),
            });
            seed_repository(scratch.path(), &files, &remote_url, SEED_BRANCH)
                .map_err(|e| SyncError::at(Stage::Seeding, e))?;
            let names: Vec<String> = files.iter().map(|f| f.path.display().to_string()).collect();
            self.emit(ProgressEvent::Done {
                stage: Stage::Seeding,
                message: format!("Initial commit pushed ({})", names.join(", ")),
            });
            Some(SEED_BRANCH)
        } else {
            self.emit(ProgressEvent::Info {
                message: format!(
                    "Primary repository already has branches ({}); skipping initial commit",
                    heads.join(", ")
                ),
            });
            None
        };

        self.emit(ProgressEvent::Step {
            stage: Stage::Clone,
            message: format!("Cloning {}", access.display_url(&identity)),
        });
        clone_repository(&remote_url, &target, checkout)
            .map_err(|e| SyncError::at(Stage::Clone, e))?;
        self.emit(ProgressEvent::Done {
            stage: Stage::Clone,
            message: format!("Cloned into {}", target.display()),
        });

        Ok(ProvisionReport {
            repository: request.repository.clone(),
            secondary: Some(secondary),
            primary: Some(primary),
            mirror,
            remote: None,
            local_path: Some(target),
            urls: urls(&accounts, &request.repository),
        })
    }

    // -----------------------------------------------------------------------
    // 3. Mirror only (`mirror`)
    // -----------------------------------------------------------------------

    /// Registers the push mirror for a repository that must already exist on
    /// the primary host.
    pub fn register_mirror(&self, request: &ProvisioningRequest) -> Result<ProvisionReport, SyncError> {
        let accounts = self.accounts(request.platform)?;
        let gateway = ProviderGateway::primary(&accounts.primary, Arc::clone(&self.transport));
        let owner = accounts.primary.username.as_str();

        self.emit(ProgressEvent::Step {
            stage: Stage::PrimaryProvisioning,
            message: format!("Checking {} repository {owner}/{}", gateway.provider(), request.repository),
        });
        let exists = gateway
            .exists(owner, &request.repository)
            .map_err(|e| SyncError::at(Stage::PrimaryProvisioning, e))?;
        if !exists {
            return Err(SyncError::RepositoryNotFound {
                repo: format!("{owner}/{}", request.repository),
            });
        }
        self.emit(ProgressEvent::Done {
            stage: Stage::PrimaryProvisioning,
            message: "Repository found".into(),
        });

        let mirror = self.register(&accounts, &request.repository)?;
        Ok(ProvisionReport {
            repository: request.repository.clone(),
            secondary: None,
            primary: None,
            mirror,
            remote: None,
            local_path: None,
            urls: urls(&accounts, &request.repository),
        })
    }

    // -----------------------------------------------------------------------
    // 4. Batch (`bulk`)
    // -----------------------------------------------------------------------

    /// Primary create-if-absent plus mirror for every name, in order, one at
    /// a time. A failing repository is recorded and the batch moves on.
    /// Duplicate names are processed once. Missing credentials abort before
    /// the first repository.
    pub fn provision_batch(
        &self,
        names: &[String],
        visibility: Visibility,
        platform: Platform,
    ) -> Result<BatchReport, SyncError> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .filter(|n| seen.insert(n.to_string()))
            .collect();
        if unique.is_empty() {
            return Err(SyncError::EmptyBatch);
        }
        let accounts = self.accounts(platform)?;

        self.emit(ProgressEvent::Info {
            message: format!("Processing {} repositories", unique.len()),
        });
        let mut report = BatchReport::default();
        for name in unique {
            self.emit(ProgressEvent::RepositoryStarted { repo: name.to_string() });
            let result = self.provision_one_of_batch(&accounts, name, visibility);
            if let Err(err) = &result {
                tracing::warn!(repo = name, error = %err, "batch entry failed");
                self.emit(ProgressEvent::Failed {
                    repo: name.to_string(),
                    message: err.to_string(),
                });
            }
            report.entries.push(BatchEntry {
                repository: name.to_string(),
                result,
            });
        }
        tracing::info!(completed = report.completed(), total = report.total(), "batch finished");
        Ok(report)
    }

    fn provision_one_of_batch(
        &self,
        accounts: &Accounts,
        name: &str,
        visibility: Visibility,
    ) -> Result<ProvisionReport, SyncError> {
        let primary = self.ensure_primary(accounts, name, visibility)?;
        let mirror = self.register(accounts, name)?;
        Ok(ProvisionReport {
            repository: name.to_string(),
            secondary: None,
            primary: Some(primary),
            mirror,
            remote: None,
            local_path: None,
            urls: urls(accounts, name),
        })
    }

    // -----------------------------------------------------------------------
    // Stage helpers
    // -----------------------------------------------------------------------

    fn accounts(&self, platform: Platform) -> Result<Accounts, SyncError> {
        Ok(Accounts {
            primary: self.config.primary_account()?,
            secondary: self.config.secondary_account(platform)?,
        })
    }

    fn ensure_secondary(
        &self,
        accounts: &Accounts,
        request: &ProvisioningRequest,
    ) -> Result<Provisioned, SyncError> {
        let gateway = ProviderGateway::secondary(&accounts.secondary, Arc::clone(&self.transport));
        self.ensure_repository(
            &gateway,
            &accounts.secondary.username,
            &request.repository,
            request.visibility,
            Stage::SecondaryProvisioning,
        )
    }

    fn ensure_primary(
        &self,
        accounts: &Accounts,
        repo: &str,
        visibility: Visibility,
    ) -> Result<Provisioned, SyncError> {
        let gateway = ProviderGateway::primary(&accounts.primary, Arc::clone(&self.transport));
        self.ensure_repository(
            &gateway,
            &accounts.primary.username,
            repo,
            visibility,
            Stage::PrimaryProvisioning,
        )
    }

    /// `exists`, then `create` only when absent.
    fn ensure_repository(
        &self,
        gateway: &dyn RepositoryGateway,
        owner: &str,
        repo: &str,
        visibility: Visibility,
        stage: Stage,
    ) -> Result<Provisioned, SyncError> {
        let provider = gateway.provider();
        self.emit(ProgressEvent::Step {
            stage,
            message: format!("Checking {provider} repository {owner}/{repo}"),
        });
        let exists = gateway
            .exists(owner, repo)
            .map_err(|e| SyncError::at(stage, e))?;
        if exists {
            self.emit(ProgressEvent::Done {
                stage,
                message: format!("{provider} repository already exists"),
            });
            return Ok(Provisioned::AlreadyExisted);
        }

        self.emit(ProgressEvent::Step {
            stage,
            message: format!("Creating {provider} repository ({visibility})"),
        });
        gateway
            .create(&CreateSpec::new(repo, visibility))
            .map_err(|e| SyncError::at(stage, e))?;
        self.emit(ProgressEvent::Done {
            stage,
            message: format!("{provider} repository created"),
        });
        Ok(Provisioned::Created)
    }

    fn register(&self, accounts: &Accounts, repo: &str) -> Result<MirrorOutcome, SyncError> {
        let spec = MirrorSpec::new(
            RepositoryIdentity::new(&accounts.primary.username, repo),
            accounts.secondary.destination_url(repo),
            DestinationCredential {
                username: accounts.secondary.username.clone(),
                secret: accounts.secondary.token.clone(),
            },
        );
        let platform = accounts.secondary.platform;
        self.emit(ProgressEvent::Step {
            stage: Stage::MirrorRegistration,
            message: format!("Setting up {platform} mirror"),
        });
        let registrar = MirrorRegistrar::new(&accounts.primary, Arc::clone(&self.transport));
        let outcome = registrar
            .register_push_mirror(&spec)
            .map_err(|e| SyncError::at(Stage::MirrorRegistration, e))?;
        let message = match outcome {
            MirrorOutcome::Registered => format!("{platform} mirror configured"),
            MirrorOutcome::AlreadyRegistered => format!("{platform} mirror already configured"),
        };
        self.emit(ProgressEvent::Done {
            stage: Stage::MirrorRegistration,
            message,
        });
        Ok(outcome)
    }

    fn seed_files(
        &self,
        identity: &RepositoryIdentity,
        request: &ProvisioningRequest,
    ) -> Result<Vec<SeedFile>, SyncError> {
        let renderer = SeedRenderer::with_overrides(self.templates_dir.as_deref())?;
        let ctx = SeedContext::today(identity, request.visibility, request.platform);
        Ok(renderer
            .render_all(&ctx)?
            .into_iter()
            .map(|(path, contents)| SeedFile::new(path, contents))
            .collect())
    }

    fn emit(&self, event: ProgressEvent) {
        self.progress.emit(event);
    }
}

fn urls(accounts: &Accounts, repo: &str) -> Vec<RepositoryUrl> {
    vec![
        RepositoryUrl {
            provider: forgesync_forge::provider::GITEA.name,
            url: accounts.primary.repository_url(repo),
        },
        RepositoryUrl {
            provider: accounts.secondary.platform.display_name(),
            url: accounts.secondary.repository_url(repo),
        },
    ]
}
