//! Admin Directory HTTP client with token injection and listing retries.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

use crate::{DirectoryConfig, DirectoryError, DirectoryResult, TokenCache, MAX_RETRY_DELAY};

/// Error response returned by the directory API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Error response body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// One entry of the `errors` array.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Admin Directory API client.
#[derive(Debug)]
pub struct HttpDirectoryClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    config: DirectoryConfig,
}

impl HttpDirectoryClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        config
            .validate()
            .map_err(|e| DirectoryError::Config(e.to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DirectoryError::Config(format!("Failed to create HTTP client: {e}")))?;

        let token_cache = Arc::new(TokenCache::new(
            config.credentials.clone(),
            config.resolved_token_url(),
            http_client.clone(),
        ));

        Ok(Self {
            http_client,
            token_cache,
            config,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Returns the token cache.
    #[must_use]
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.token_cache
    }

    /// Returns the base URL for directory requests.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}/admin/directory/v1",
            self.config.api_base_url.trim_end_matches('/')
        )
    }

    /// Returns the member collection URL of a group.
    pub(crate) fn members_url(&self, group_id: &str) -> String {
        format!(
            "{}/groups/{}/members",
            self.base_url(),
            urlencoding::encode(group_id)
        )
    }

    /// Returns the URL of one member of a group.
    pub(crate) fn member_url(&self, group_id: &str, member_id: &str) -> String {
        format!(
            "{}/{}",
            self.members_url(group_id),
            urlencoding::encode(member_id)
        )
    }

    /// Performs a GET request, retrying throttled and transient failures.
    #[instrument(skip(self, query))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> DirectoryResult<T> {
        let mut retries = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms).min(MAX_RETRY_DELAY);

        loop {
            let token = self.token_cache.get_token().await?;

            let response = self
                .http_client
                .get(url)
                .query(query)
                .bearer_auth(&token)
                .send()
                .await?;

            let status = response.status();

            if status.is_success() {
                return response.json().await.map_err(DirectoryError::from);
            }

            let retryable = matches!(
                status,
                reqwest::StatusCode::TOO_MANY_REQUESTS
                    | reqwest::StatusCode::BAD_GATEWAY
                    | reqwest::StatusCode::SERVICE_UNAVAILABLE
                    | reqwest::StatusCode::GATEWAY_TIMEOUT
            );

            if retryable && retries < self.config.max_retries {
                retries += 1;
                warn!(
                    "Transient error {}, retry {}/{} after {:?}",
                    status, retries, self.config.max_retries, delay
                );
                tokio::time::sleep(delay).await;
                delay = next_retry_delay(delay);
                continue;
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(DirectoryError::MaxRetriesExceeded { attempts: retries });
            }

            return Err(Self::error_from_response(response).await);
        }
    }

    /// Performs a POST request. Never retried.
    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> DirectoryResult<T> {
        let token = self.token_cache.get_token().await?;

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            return response.json().await.map_err(DirectoryError::from);
        }

        Err(Self::error_from_response(response).await)
    }

    /// Performs a DELETE request. Never retried.
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> DirectoryResult<()> {
        let token = self.token_cache.get_token().await?;

        let response = self
            .http_client
            .delete(url)
            .bearer_auth(&token)
            .send()
            .await?;

        // Success is usually 204 No Content
        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::error_from_response(response).await)
    }

    /// Maps a failed response to a typed error.
    async fn error_from_response(response: reqwest::Response) -> DirectoryError {
        let status = response.status();
        let error_body = response.text().await.unwrap_or_default();

        let (message, reason) = match serde_json::from_str::<ApiErrorResponse>(&error_body) {
            Ok(parsed) => {
                let reason = parsed
                    .error
                    .errors
                    .into_iter()
                    .find_map(|detail| detail.reason);
                (parsed.error.message, reason)
            }
            Err(_) => (error_body, None),
        };

        classify_error(status.as_u16(), message, reason)
    }
}

/// Picks the error variant for a status code and API reason.
fn classify_error(code: u16, message: String, reason: Option<String>) -> DirectoryError {
    if reason.as_deref() == Some("duplicate") {
        return DirectoryError::Duplicate(message);
    }

    match code {
        401 => DirectoryError::Auth(message),
        403 => DirectoryError::PermissionDenied(message),
        404 => DirectoryError::NotFound(message),
        409 => DirectoryError::Duplicate(message),
        _ => DirectoryError::Api {
            code,
            message,
            reason,
        },
    }
}

/// Doubles `delay`, capped at [`MAX_RETRY_DELAY`].
fn next_retry_delay(delay: Duration) -> Duration {
    delay.saturating_mul(2).min(MAX_RETRY_DELAY)
}
