//! Blocking client for the hosting API.
//!
//! All reads are idempotent. Transport failures, non-2xx statuses and
//! malformed payloads come back as [`UpkeepError::Unavailable`]; a 404 comes
//! back as [`UpkeepError::NotFound`]. Redirects are followed by hand so the
//! credential is only ever sent to trusted hosts.

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use super::auth::{Credential, HostPolicy};
use super::payload::{
    CommitId, CommitPayload, ContentsPayload, FileContent, ReleaseMetadata, ReleasePayload,
};
use super::source::RemoteSource;
use crate::error::{Result, UpkeepError};

const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_ANY: &str = "*/*";
const MAX_REDIRECTS: usize = 5;

/// Hosts that serve API responses and archive downloads for github.com.
pub const DEFAULT_TRUSTED_HOSTS: [&str; 2] = ["api.github.com", "codeload.github.com"];

/// Tunables for [`RemoteClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Timeout for API requests.
    pub timeout: Duration,
    /// Timeout for a whole archive download.
    pub download_timeout: Duration,
    pub user_agent: String,
    /// Hosts allowed to receive the credential, in addition to the API host.
    pub trusted_hosts: Vec<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(300),
            user_agent: "upkeep".to_string(),
            trusted_hosts: DEFAULT_TRUSTED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

/// Reads version state and archives from the hosting API.
#[derive(Debug)]
pub struct RemoteClient {
    client: Client,
    api_url: Url,
    credential: Option<Credential>,
    hosts: HostPolicy,
    options: ClientOptions,
}

impl RemoteClient {
    /// Create a client with default options.
    pub fn new(api_url: &str, credential: Option<Credential>) -> Result<Self> {
        Self::with_options(api_url, credential, ClientOptions::default())
    }

    /// Create a client with explicit options.
    pub fn with_options(
        api_url: &str,
        credential: Option<Credential>,
        options: ClientOptions,
    ) -> Result<Self> {
        let api_url = Url::parse(api_url.trim_end_matches('/')).map_err(|e| {
            UpkeepError::ConfigValidationError {
                message: format!("invalid api_url '{}': {}", api_url, e),
            }
        })?;

        let mut hosts: Vec<String> = options.trusted_hosts.clone();
        if let Some(host) = api_url.host_str() {
            hosts.push(host.to_string());
        }

        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_url: api_url.clone(),
            credential,
            hosts: HostPolicy::new(hosts).with_api_origin(&api_url),
            options,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Fetch the decoded bytes of one file at a ref.
    pub fn fetch_file_content(
        &self,
        source: &RemoteSource,
        path: &str,
        git_ref: &str,
    ) -> Result<FileContent> {
        let mut tail = vec!["contents"];
        tail.extend(path.split('/').filter(|s| !s.is_empty()));
        let mut url = self.repo_endpoint(source, &tail)?;
        url.query_pairs_mut().append_pair("ref", git_ref);

        let payload: ContentsPayload = self.get_json(url, &format!("{}:{}@{}", source, path, git_ref))?;
        payload.decode()
    }

    /// Fetch the most recent tagged release.
    pub fn fetch_latest_release(&self, source: &RemoteSource) -> Result<ReleaseMetadata> {
        let url = self.repo_endpoint(source, &["releases", "latest"])?;
        let payload: ReleasePayload = self.get_json(url, &format!("latest release of {}", source))?;
        payload.validate()
    }

    /// Fetch the head commit of a branch.
    pub fn fetch_latest_commit(&self, source: &RemoteSource, branch: &str) -> Result<CommitId> {
        let url = self.repo_endpoint(source, &ref_path("commits", branch))?;
        let payload: CommitPayload = self.get_json(url, &format!("{}@{}", source, branch))?;
        let commit = payload.validate()?;
        tracing::debug!("{}@{} is at {}", source, branch, commit.short());
        Ok(commit)
    }

    /// Archive location for any ref (branch, tag or commit).
    pub fn resolve_archive_url(&self, source: &RemoteSource, git_ref: &str) -> Result<Url> {
        self.repo_endpoint(source, &ref_path("zipball", git_ref))
    }

    /// Stream the archive for a ref into `dest`.
    ///
    /// On failure the partially written file is removed.
    pub fn download_archive(
        &self,
        source: &RemoteSource,
        git_ref: &str,
        dest: &Path,
    ) -> Result<u64> {
        let url = self.resolve_archive_url(source, git_ref)?;
        let url_str = url.to_string();
        tracing::info!("Downloading {} to {}", url_str, dest.display());

        let download_failed = |message: String| UpkeepError::DownloadFailed {
            url: url_str.clone(),
            message,
        };

        let mut response = self
            .send_get(url.clone(), ACCEPT_ANY, Some(self.options.download_timeout))
            .map_err(|e| download_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_failed(format!("HTTP {}", response.status())));
        }

        let written = File::create(dest)
            .map_err(|e| e.to_string())
            .and_then(|mut file| response.copy_to(&mut file).map_err(|e| e.to_string()));

        match written {
            Ok(bytes) => {
                tracing::debug!("Downloaded {} bytes from {}", bytes, url_str);
                Ok(bytes)
            }
            Err(message) => {
                let _ = std::fs::remove_file(dest);
                Err(download_failed(message))
            }
        }
    }

    /// `{api}/repos/{owner}/{repo}/{tail..}` with every segment percent-encoded.
    fn repo_endpoint(&self, source: &RemoteSource, tail: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpkeepError::unavailable(format!("{} cannot take a path", self.api_url)))?
            .pop_if_empty()
            .extend(["repos", source.owner(), source.repo()])
            .extend(tail);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        let response = self.send_get(url.clone(), ACCEPT_JSON, None)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(UpkeepError::not_found(what));
        }
        if !status.is_success() {
            return Err(UpkeepError::unavailable(format!(
                "HTTP {} fetching {}",
                status, url
            )));
        }

        response
            .json::<T>()
            .map_err(|e| UpkeepError::unavailable(format!("malformed response from {}: {}", url, e)))
    }

    /// GET with manual redirect handling and host-restricted auth.
    fn send_get(&self, mut url: Url, accept: &str, timeout: Option<Duration>) -> Result<Response> {
        for _ in 0..=MAX_REDIRECTS {
            let mut request = self.client.get(url.clone()).header(ACCEPT, accept);
            if let Some(value) = self.hosts.authorization_for(&url, self.credential.as_ref()) {
                request = request.header(AUTHORIZATION, value);
            }
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }

            let response = request
                .send()
                .map_err(|e| UpkeepError::unavailable(format!("request to {} failed: {}", url, e)))?;

            if !response.status().is_redirection() {
                return Ok(response);
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    UpkeepError::unavailable(format!("redirect from {} without location", url))
                })?;
            let next = url.join(location).map_err(|e| {
                UpkeepError::unavailable(format!("bad redirect location '{}': {}", location, e))
            })?;
            tracing::debug!("Following redirect {} -> {}", url, next);
            url = next;
        }

        Err(UpkeepError::unavailable(format!(
            "too many redirects fetching {}",
            url
        )))
    }
}

/// Endpoint tail for a ref; slashes in branch names stay path separators.
fn ref_path<'r>(endpoint: &'r str, git_ref: &'r str) -> Vec<&'r str> {
    let mut tail = vec![endpoint];
    tail.extend(git_ref.split('/').filter(|s| !s.is_empty()));
    tail
}
