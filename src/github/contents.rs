// src/github/contents.rs
// =============================================================================
// Thin client for the GitHub "repository contents" API.
//
// Two calls are needed to mirror a repository:
//   GET /repos/{owner}/{repo}/contents/{path}  -> JSON array of entries
//   GET <download_url>                         -> raw file text
//
// The client never retries and never inspects rate-limit headers. A token is
// optional; without one GitHub serves anonymous requests at a lower rate.
// =============================================================================

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::repo_url::RepoId;

const USER_AGENT_VALUE: &str = concat!("repo-lens/", env!("CARGO_PKG_VERSION"));

// Everything that can go wrong while walking a remote repository
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("file entry {path} has no download URL")]
    MissingDownloadUrl { path: String },
    #[error("directory {path} is deeper than the configured limit of {limit}")]
    DepthLimitExceeded { path: String, limit: usize },
    #[error("cannot build a request URL from {base}: {reason}")]
    InvalidUrl { base: String, reason: String },
    #[error("token is not a valid header value")]
    InvalidToken,
}

/// What kind of object a listing entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks and submodules; the tree skips these.
    #[serde(other)]
    Other,
}

/// One item of a directory listing. Consumed right away by the tree builder.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

// The listing client. Cheap to clone: reqwest::Client is reference counted.
#[derive(Debug, Clone)]
pub struct ContentsClient {
    client: Client,
    api_base: Url,
}

impl ContentsClient {
    // Builds a client against `api_base` (normally https://api.github.com)
    //
    // The token, when present, is sent as `Authorization: token <TOKEN>` on
    // every request, including raw downloads.
    pub fn new(api_base: Url, token: Option<&str>) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|_| FetchError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        // No timeout: a slow listing simply takes as long as it takes
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| FetchError::Request {
                url: api_base.to_string(),
                source,
            })?;

        Ok(Self { client, api_base })
    }

    // Lists the entries at `path` ("" for the repository root), in the order
    // the API served them
    pub async fn list_dir(&self, id: &RepoId, path: &str) -> Result<Vec<RemoteEntry>, FetchError> {
        let url = self.contents_url(id, path)?;
        debug!(%url, "listing directory");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<RemoteEntry>>()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })
    }

    // Downloads the raw text of one file
    pub async fn fetch_raw(&self, download_url: &str) -> Result<String, FetchError> {
        debug!(url = download_url, "downloading file");

        let response = self
            .client
            .get(download_url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: download_url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: download_url.to_string(),
                status: response.status(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: download_url.to_string(),
            source,
        })
    }

    // {base}/repos/{owner}/{repo}/contents[/{path...}], each segment encoded
    fn contents_url(&self, id: &RepoId, path: &str) -> Result<Url, FetchError> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| FetchError::InvalidUrl {
                base: self.api_base.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            })?;
            segments
                .pop_if_empty()
                .extend(["repos", id.owner.as_str(), id.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }
}
