//! Rendering payload for a new repository's seed files.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use forgesync_core::{Platform, RepositoryIdentity, Visibility};

use crate::error::RenderError;

/// Values available to seed templates as top-level tera variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedContext {
    pub repository: String,
    pub owner: String,
    /// `YYYY-MM-DD`.
    pub created_on: String,
    pub visibility: Visibility,
    /// Platform receiving the push mirror, e.g. `GitHub`.
    pub mirror_platform: String,
}

impl SeedContext {
    pub fn new(
        repo: &RepositoryIdentity,
        visibility: Visibility,
        platform: Platform,
        created_on: NaiveDate,
    ) -> Self {
        Self {
            repository: repo.name.clone(),
            owner: repo.owner.clone(),
            created_on: created_on.format("%Y-%m-%d").to_string(),
            visibility,
            mirror_platform: platform.display_name().to_string(),
        }
    }

    /// Same as [`SeedContext::new`], dated today in local time.
    pub fn today(repo: &RepositoryIdentity, visibility: Visibility, platform: Platform) -> Self {
        Self::new(repo, visibility, platform, Local::now().date_naive())
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_is_iso_formatted() {
        let ctx = SeedContext::new(
            &RepositoryIdentity::new("me", "demo"),
            Visibility::Private,
            Platform::GitLab,
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        );
        assert_eq!(ctx.created_on, "2024-03-07");
        assert_eq!(ctx.mirror_platform, "GitLab");
        ctx.to_tera_context().expect("context conversion");
    }
}
