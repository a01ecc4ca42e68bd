//! GithubStatusSource - GitHub commit status API
//!
//! `GET {api_url}/repos/{owner}/{repo}/statuses/{ref}` を叩き、
//! HTTP ステータスを SourceError の分類（Transient / NotFound / Permanent）に写す。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{SourceError, StatusRecord};
use crate::ports::StatusSource;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("statuswait/", env!("CARGO_PKG_VERSION"));

/// Errors constructing a GithubStatusSource.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("repository must look like owner/name, got {0:?}")]
    InvalidRepository(String),

    #[error("invalid api url {url}: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("failed to construct http client")]
    Client(#[source] reqwest::Error),
}

/// Error body returned by the GitHub API on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct GithubStatusSource {
    client: reqwest::Client,
    api_url: Url,
    owner: String,
    repo: String,
    token: Option<String>,
}

impl GithubStatusSource {
    /// Build a source for `repository` (`owner/name`).
    ///
    /// `request_timeout` bounds every request, body included.
    pub fn new(
        api_url: &str,
        repository: &str,
        token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, SetupError> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| SetupError::InvalidRepository(repository.to_string()))?;

        let api_url = Url::parse(api_url).map_err(|e| SetupError::InvalidApiUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;
        if api_url.cannot_be_a_base() {
            return Err(SetupError::InvalidApiUrl {
                url: api_url.to_string(),
                reason: "url cannot be used as a base".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(SetupError::Client)?;

        Ok(Self {
            client,
            api_url,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Statuses URL for `reference`; the ref is encoded as a single path segment.
    pub fn statuses_url(&self, reference: &str) -> Result<Url, SourceError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::Permanent(format!("{} cannot be a base url", self.api_url)))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "statuses", reference]);
        Ok(url)
    }
}

#[async_trait]
impl StatusSource for GithubStatusSource {
    async fn fetch(&self, reference: &str) -> Result<Vec<StatusRecord>, SourceError> {
        let url = self.statuses_url(reference)?;
        tracing::debug!(%url, "fetching commit statuses");

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(reference.to_string()));
        }
        if !status.is_success() {
            let detail = error_detail(status, response).await;
            return Err(if is_retryable_status(status) {
                SourceError::Transient(detail)
            } else {
                SourceError::Permanent(detail)
            });
        }

        response.json::<Vec<StatusRecord>>().await.map_err(|e| {
            if e.is_decode() {
                SourceError::Permanent(format!("unexpected response body: {e}"))
            } else {
                classify_transport_error(e)
            }
        })
    }

    fn endpoint(&self, reference: &str) -> String {
        match self.statuses_url(reference) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/repos/{}/{}/statuses/{reference}", self.api_url, self.owner, self.repo),
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn classify_transport_error(error: reqwest::Error) -> SourceError {
    if error.is_builder() {
        SourceError::Permanent(error.to_string())
    } else {
        SourceError::Transient(error.to_string())
    }
}

async fn error_detail(status: StatusCode, response: reqwest::Response) -> String {
    match response.json::<ApiErrorBody>().await {
        Ok(body) => format!("{status}: {}", body.message),
        Err(_) => status.to_string(),
    }
}
