//! GitHub HTTP client: top-user search and avatar fetch.

use crate::config::GithubConfig;
use crate::error::{DownloadError, Error, FetchError, Result};
use crate::types::{SearchResponse, UserSummary};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use std::collections::HashSet;

/// Thin wrapper around a preconfigured [`reqwest::Client`]
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct GithubClient {
    http: Client,
    search_url: String,
}

impl GithubClient {
    /// Build a client with the GitHub headers, optional bearer token and timeout
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| Error::Config {
                message: format!("invalid user agent: {}", e),
                key: Some("user_agent".to_string()),
            })?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        if let Some(token) = config.token.as_deref() {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| Error::Config {
                    message: format!("invalid token value: {}", e),
                    key: Some("token".to_string()),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            search_url: config.search_url(),
        })
    }

    /// URL used by [`search_top_users`](Self::search_top_users)
    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Fetch the most-followed users, in upstream order
    ///
    /// Fails with [`FetchError::Malformed`] when the payload has no `items`
    /// list, an element lacks `id`/`login`/`avatar_url`, an avatar URL is not
    /// absolute, or an id appears twice.
    pub async fn search_top_users(&self) -> std::result::Result<Vec<UserSummary>, FetchError> {
        tracing::debug!(url = %self.search_url, "Requesting top users");

        let response = self
            .http
            .get(&self.search_url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(FetchError::Network)?;
        parse_search_response(&body)
    }

    /// Download the raw avatar bytes for one user
    pub async fn fetch_avatar(
        &self,
        user: &UserSummary,
    ) -> std::result::Result<AvatarPayload, DownloadError> {
        let response = self
            .http
            .get(&user.avatar_url)
            .send()
            .await
            .map_err(|source| DownloadError::Network {
                login: user.login.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                login: user.login.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|source| DownloadError::Network {
                login: user.login.clone(),
                source,
            })?;

        Ok(AvatarPayload {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

/// Validate and decode a search response body
pub(crate) fn parse_search_response(
    body: &str,
) -> std::result::Result<Vec<UserSummary>, FetchError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let mut seen = HashSet::with_capacity(parsed.items.len());
    for user in &parsed.items {
        if !seen.insert(user.id) {
            return Err(FetchError::Malformed(format!(
                "duplicate user id {}",
                user.id
            )));
        }
        match url::Url::parse(&user.avatar_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(FetchError::Malformed(format!(
                    "user {} has an invalid avatar_url: {}",
                    user.login, user.avatar_url
                )));
            }
        }
    }

    Ok(parsed.items)
}

/// Avatar bytes plus the declared content type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarPayload {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// `Content-Type` header value, if any
    pub content_type: Option<String>,
}

impl AvatarPayload {
    /// File extension for the declared content type
    ///
    /// Unknown or missing types yield `None`; callers fall back to the
    /// configured default.
    pub fn extension(&self) -> Option<&'static str> {
        let mime = self
            .content_type
            .as_deref()?
            .split(';')
            .next()?
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "image/svg+xml" => Some("svg"),
            "image/avif" => Some("avif"),
            "image/bmp" => Some("bmp"),
            _ => None,
        }
    }

    /// Base64 text handed to the storage layer
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}
