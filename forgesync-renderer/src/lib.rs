//! # forgesync-renderer
//!
//! Tera templates for the files committed into a brand-new repository
//! (`README.md`, `.gitignore`), with per-user overrides.
//!
//! ```rust,no_run
//! use forgesync_core::{Platform, RepositoryIdentity, Visibility};
//! use forgesync_renderer::{SeedContext, SeedRenderer};
//!
//! fn seed_files() -> Result<(), forgesync_renderer::RenderError> {
//!     let repo = RepositoryIdentity::new("me", "demo");
//!     let ctx = SeedContext::today(&repo, Visibility::Public, Platform::GitHub);
//!     for (path, content) in SeedRenderer::new()?.render_all(&ctx)? {
//!         println!("{}: {} bytes", path.display(), content.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::SeedContext;
pub use engine::{SeedKind, SeedRenderer};
pub use error::RenderError;
