//! Remote repository identifiers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::UpkeepError;

static WEB_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/").unwrap());

/// A hosted repository, identified as `owner/repo`.
///
/// Parsing accepts the forms people paste from a browser or a clone URL
/// (`https://github.com/owner/repo.git`) and normalizes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteSource {
    owner: String,
    repo: String,
}

impl RemoteSource {
    /// Parse and normalize a repository reference.
    pub fn parse(input: &str) -> Result<Self, UpkeepError> {
        let trimmed = input.trim();
        let stripped = WEB_PREFIX.replace(trimmed, "");
        let stripped = stripped.trim_end_matches(".git").trim_matches('/');

        let mut parts = stripped.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(UpkeepError::InvalidRemoteSource {
                input: input.to_string(),
            }),
        }
    }

    /// Repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl fmt::Display for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RemoteSource {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RemoteSource {
    type Error = UpkeepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RemoteSource> for String {
    fn from(value: RemoteSource) -> Self {
        value.to_string()
    }
}
