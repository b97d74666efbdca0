//! OAuth2 authentication for the Admin Directory API.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{Credentials, DirectoryError, DirectoryResult};

/// Scope needed to list, insert and delete group members.
pub const DIRECTORY_MEMBER_SCOPE: &str =
    "https://www.googleapis.com/auth/admin.directory.group.member";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for signed assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Service-account key, as found in a downloaded JSON key file.
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    /// Service account email, used as the assertion issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: SecretString,
    /// Key ID placed in the assertion header.
    pub private_key_id: Option<String>,
    /// Token endpoint named by the key file.
    pub token_uri: Option<String>,
}

#[derive(Deserialize)]
struct RawServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Parses a JSON key file.
    pub fn from_json(json: &str) -> DirectoryResult<Self> {
        let raw: RawServiceAccountKey = serde_json::from_str(json)?;
        if raw.client_email.is_empty() {
            return Err(DirectoryError::Config(
                "service account key has an empty client_email".into(),
            ));
        }
        Ok(Self {
            client_email: raw.client_email,
            private_key: SecretString::from(raw.private_key),
            private_key_id: raw.private_key_id,
            token_uri: raw.token_uri,
        })
    }
}

/// Claims of the signed JWT-bearer assertion.
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

/// Cached OAuth2 access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Token cache for managing OAuth2 access tokens.
#[derive(Debug)]
pub struct TokenCache {
    credentials: Credentials,
    token_url: String,
    http_client: reqwest::Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// Grace period before expiry to trigger refresh (default: 5 minutes).
    grace_period: Duration,
}

impl TokenCache {
    /// Creates a new token cache.
    pub fn new(credentials: Credentials, token_url: String, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            token_url,
            http_client,
            cached_token: Arc::new(RwLock::new(None)),
            grace_period: Duration::minutes(5),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> DirectoryResult<String> {
        let (key, subject) = match self.credentials {
            Credentials::AccessToken(ref token) => return Ok(token.expose_secret().to_string()),
            Credentials::ServiceAccount {
                ref key,
                ref subject,
            } => (key, subject.as_deref()),
        };

        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    debug!("Using cached token");
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Refreshing access token");
        let new_token = self.acquire_token(key, subject).await?;

        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    /// Exchanges a signed assertion for an access token.
    #[instrument(skip(self, key), fields(client_email = %key.client_email))]
    async fn acquire_token(
        &self,
        key: &ServiceAccountKey,
        subject: Option<&str>,
    ) -> DirectoryResult<CachedToken> {
        let assertion = build_assertion(key, subject, &self.token_url, Utc::now())?;

        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);

        debug!(
            "Acquired new token, expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }

    /// Invalidates the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }
}

/// Signs the RS256 assertion presented to the token endpoint.
fn build_assertion(
    key: &ServiceAccountKey,
    subject: Option<&str>,
    audience: &str,
    now: DateTime<Utc>,
) -> DirectoryResult<String> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
        .map_err(|e| DirectoryError::Auth(format!("Invalid private key: {e}")))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: DIRECTORY_MEMBER_SCOPE.to_string(),
        aud: audience.to_string(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
        sub: subject.map(String::from),
    };

    jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| DirectoryError::Auth(format!("Failed to sign assertion: {e}")))
}
