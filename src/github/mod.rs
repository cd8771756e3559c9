// src/github/mod.rs
// =============================================================================
// Everything that talks to GitHub.
//
// Submodules:
// - repo_url: turns a typed repository URL into an owner/repo pair
// - contents: lists directories and downloads raw files through the
//   repository contents API
// =============================================================================

mod contents;
mod repo_url;

pub use contents::{ContentsClient, EntryKind, FetchError, RemoteEntry};
pub use repo_url::{parse_repo_url, RepoId};
