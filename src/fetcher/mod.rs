//! Retrieval of resource documents from local files and GitHub/GitLab URLs.

pub mod sources;

pub use sources::{detect_platform, parse_sources, to_raw_url, Platform};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const PRIVATE_TOKEN: HeaderName = HeaderName::from_static("private-token");

/// Separator placed between fetched documents.
pub const DOCUMENT_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} fetching {url}: {reason}")]
    Http {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Failed to fetch {url}: {message}")]
    Request { url: String, message: String },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Local file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// URL or path the failure relates to.
    pub fn location(&self) -> &str {
        match self {
            FetchError::Http { url, .. }
            | FetchError::Request { url, .. }
            | FetchError::InvalidUrl { url, .. } => url,
            FetchError::FileNotFound { path } | FetchError::Io { path, .. } => path,
            FetchError::InvalidToken(_) | FetchError::Client(_) => "",
        }
    }
}

/// Fetches sources sequentially with one shared HTTP client.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch every source in order and join the texts into one multi-document stream.
    pub async fn fetch_all(
        &self,
        sources: &[String],
        token: Option<&str>,
    ) -> Result<String, FetchError> {
        let mut documents = Vec::with_capacity(sources.len());
        for source in sources {
            documents.push(self.fetch_source(source, token).await?);
        }
        Ok(documents.join(DOCUMENT_SEPARATOR))
    }

    pub async fn fetch_source(
        &self,
        source: &str,
        token: Option<&str>,
    ) -> Result<String, FetchError> {
        if sources::is_remote(source) {
            let url = to_raw_url(source);
            let platform = detect_platform(&url);
            tracing::debug!("fetching {} ({:?})", url, platform);
            self.fetch_http(&url, token, platform).await
        } else {
            read_local(source).await
        }
    }

    async fn fetch_http(
        &self,
        url: &str,
        token: Option<&str>,
        platform: Platform,
    ) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .headers(auth_headers(token, platform)?)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response.text().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// GitLab takes the token as `PRIVATE-TOKEN`; everything else gets a bearer token.
fn auth_headers(token: Option<&str>, platform: Platform) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let Some(token) = token.filter(|token| !token.is_empty()) else {
        return Ok(headers);
    };
    let invalid = |_| {
        FetchError::InvalidToken("token contains characters not allowed in headers".to_string())
    };

    match platform {
        Platform::GitLab => {
            let mut value = HeaderValue::from_str(token).map_err(invalid)?;
            value.set_sensitive(true);
            headers.insert(PRIVATE_TOKEN, value);
        }
        Platform::GitHub | Platform::Unknown => {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {}", token)).map_err(invalid)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
            headers.insert(
                ACCEPT,
                HeaderValue::from_static("application/vnd.github.raw+json"),
            );
        }
    }
    Ok(headers)
}

async fn read_local(source: &str) -> Result<String, FetchError> {
    let path = Path::new(source);
    if !path.exists() {
        return Err(FetchError::FileNotFound {
            path: source.to_string(),
        });
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source_err| FetchError::Io {
            path: source.to_string(),
            source: source_err,
        })
}
