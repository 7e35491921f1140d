//! `forgesync init`: interactive credential wizard.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use forgesync_core::{config, Config, ConfigError, Secret};

use crate::console;

/// Prompt for credentials and write `~/.forgesync/config.yaml`.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let existing = starting_config(&home)?;

        console::banner(&["forgesync configuration".to_string()]);
        let stdin = io::stdin();
        let config = ask(&mut stdin.lock(), existing)?;

        let path = config::save_at(&home, &config).context("failed to save config")?;
        console::success("Configuration saved!");
        println!("Config file: {}", path.display());
        println!("\nYou can now use:");
        println!("  forgesync create <repo>    # create a new repository");
        println!("  forgesync add [path]       # publish an existing working copy");
        println!("  forgesync mirror <repo>    # mirror an existing repository");
        println!("  forgesync bulk             # ensure + mirror many repositories");
        Ok(())
    }
}

/// The config the wizard edits: the saved one, so its `remote` section
/// survives, or defaults on first run. A config that exists but can't be
/// read is an error rather than something to overwrite.
fn starting_config(home: &Path) -> Result<Config> {
    match config::load_at(home) {
        Ok(existing) => Ok(existing),
        Err(ConfigError::ConfigNotFound { path }) => {
            tracing::info!(path = %path.display(), "no config yet; starting from defaults");
            Ok(Config::default())
        }
        Err(err) => Err(err).context("existing config could not be read; fix or remove it first"),
    }
}

/// Fills the credential sections from `input`, one answer per line. A blank
/// GitLab URL skips the GitLab questions and clears that section.
fn ask(input: &mut impl BufRead, mut config: Config) -> Result<Config> {
    config.primary.url = prompt(input, "Primary host URL (e.g. http://pi-nas.local:3000): ")?;
    config.primary.username = prompt(input, "Primary host username: ")?;
    config.primary.token = Secret::new(prompt(input, "Primary host token: ")?);

    config.github.username = prompt(input, "\nGitHub username: ")?;
    config.github.token = Secret::new(prompt(input, "GitHub token: ")?);

    let gitlab_url = prompt(input, "\nGitLab URL (press Enter to skip, default: https://gitlab.com): ")?;
    config.gitlab = Default::default();
    if !gitlab_url.is_empty() {
        config.gitlab.url = gitlab_url;
        config.gitlab.username = prompt(input, "GitLab username: ")?;
        config.gitlab.token = Secret::new(prompt(input, "GitLab token: ")?);
    }
    Ok(config)
}

/// Prints `label` and reads one trimmed line. End of input reads as blank.
fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("failed to flush stdout")?;
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read answer")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_run_starts_from_defaults() {
        let home = TempDir::new().unwrap();
        let cfg = starting_config(home.path()).unwrap();
        assert!(cfg.primary.url.is_empty());
    }

    #[test]
    fn malformed_config_is_not_replaced_by_defaults() {
        let home = TempDir::new().unwrap();
        let path = config::config_path_at(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "primary: [unclosed\n").unwrap();

        let err = starting_config(home.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn blank_gitlab_url_skips_gitlab_questions() {
        let mut input = "http://nas:3000/\nme\ngt\nme-gh\nghp\n\nleftover\n".as_bytes();
        let cfg = ask(&mut input, Config::default()).unwrap();
        assert_eq!(cfg.primary.url, "http://nas:3000/");
        assert_eq!(cfg.github.token.expose(), "ghp");
        assert!(cfg.gitlab.username.is_empty());
        assert!(cfg.gitlab.url.is_empty());
    }

    #[test]
    fn gitlab_answers_are_read_when_url_given() {
        let mut input = "u\nme\ngt\ngh\nghp\nhttps://gitlab.example.com\nme-gl\nglpat\n".as_bytes();
        let cfg = ask(&mut input, Config::default()).unwrap();
        assert_eq!(cfg.gitlab.url, "https://gitlab.example.com");
        assert_eq!(cfg.gitlab.username, "me-gl");
        assert_eq!(cfg.gitlab.token.expose(), "glpat");
    }

    #[test]
    fn short_input_leaves_remaining_answers_blank() {
        let mut input = "u\nme\n".as_bytes();
        let cfg = ask(&mut input, Config::default()).unwrap();
        assert_eq!(cfg.primary.username, "me");
        assert!(cfg.primary.token.is_empty());
        assert!(cfg.github.username.is_empty());
    }
}
