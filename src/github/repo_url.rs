// src/github/repo_url.rs
// =============================================================================
// Extracts the owner/repository pair from whatever the user typed into the
// repository URL field.
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - http://www.github.com/owner/repo/
//   - github.com/owner/repo
//   - https://github.com/owner/repo/tree/main/src  (extra segments ignored)
//
// Only the first two path segments after the host are used. Branch or
// file qualified URLs therefore open the repository root.
// =============================================================================

use std::fmt;

use thiserror::Error;

// Why a URL could not be turned into an owner/repo pair
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoUrlError {
    #[error("not a GitHub URL: {0}")]
    NotGithub(String),
    #[error("GitHub URL has no owner: {0}")]
    MissingOwner(String),
    #[error("GitHub URL has no repository name: {0}")]
    MissingRepo(String),
}

/// Identifies one repository on the hosted VCS.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

// Parses a GitHub URL into a RepoId
//
// Parameters:
//   text: the raw field contents, surrounding whitespace allowed
//
// Returns: Result<RepoId, RepoUrlError>
//   Success: owner and repository, ".git" stripped
//   Error: not a github.com URL, or owner / repository missing
//
// Example:
//   "https://github.com/octocat/Hello-World" -> octocat/Hello-World
pub fn parse_repo_url(text: &str) -> Result<RepoId, RepoUrlError> {
    let trimmed = text.trim();

    // Remove scheme and "www." prefixes
    let url = trimmed
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");

    let Some(path) = url.strip_prefix("github.com/") else {
        return Err(RepoUrlError::NotGithub(trimmed.to_string()));
    };

    // Drop any query string or fragment before splitting
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let mut segments = path.split('/');

    let owner = segments.next().unwrap_or_default();
    if owner.is_empty() {
        return Err(RepoUrlError::MissingOwner(trimmed.to_string()));
    }

    let repo = segments.next().unwrap_or_default();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(RepoUrlError::MissingRepo(trimmed.to_string()));
    }

    Ok(RepoId::new(owner, repo))
}
