//! Tera engine for seed files.
//!
//! | Seed        | Template            | Output path  |
//! |-------------|---------------------|--------------|
//! | `Readme`    | `readme.md.tera`    | `README.md`  |
//! | `Gitignore` | `gitignore.tera`    | `.gitignore` |
//!
//! A `.tera` file with the same name in the user template directory
//! (`~/.forgesync/templates/`) replaces the embedded default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::SeedContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("readme.md.tera", include_str!("templates/readme.md.tera")),
    ("gitignore.tera", include_str!("templates/gitignore.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut templates = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((normalize_template_name(rel), contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| (normalize_template_name(Path::new(name)), content.to_string()))
        .collect();
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// SeedKind
// ---------------------------------------------------------------------------

/// Files committed into a brand-new repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedKind {
    Readme,
    Gitignore,
}

impl SeedKind {
    pub fn all() -> &'static [SeedKind] {
        &[SeedKind::Readme, SeedKind::Gitignore]
    }

    pub fn template_name(self) -> &'static str {
        match self {
            SeedKind::Readme => "readme.md.tera",
            SeedKind::Gitignore => "gitignore.tera",
        }
    }

    /// Path relative to the repository root.
    pub fn output_path(self) -> PathBuf {
        match self {
            SeedKind::Readme => PathBuf::from("README.md"),
            SeedKind::Gitignore => PathBuf::from(".gitignore"),
        }
    }
}

// ---------------------------------------------------------------------------
// SeedRenderer
// ---------------------------------------------------------------------------

/// Renders every [`SeedKind`]. Create once and reuse.
pub struct SeedRenderer {
    tera: Tera,
}

impl SeedRenderer {
    /// Embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_overrides(None)
    }

    /// Embedded templates plus any `.tera` overrides in `user_template_dir`.
    /// A missing directory is not an error.
    pub fn with_overrides(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Self {
            tera: build_tera(user_template_dir)?,
        })
    }

    pub fn render(&self, ctx: &SeedContext, kind: SeedKind) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(kind.template_name(), &tera_ctx)?)
    }

    /// `(relative output path, contents)` for every seed file, in
    /// [`SeedKind::all`] order.
    pub fn render_all(&self, ctx: &SeedContext) -> Result<Vec<(PathBuf, String)>, RenderError> {
        SeedKind::all()
            .iter()
            .map(|kind| Ok((kind.output_path(), self.render(ctx, *kind)?)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
