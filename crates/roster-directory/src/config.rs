//! Directory client configuration.

use std::time::Duration;

use secrecy::SecretString;

use crate::ServiceAccountKey;

/// Default Admin Directory API host.
pub const DEFAULT_API_BASE_URL: &str = "https://admin.googleapis.com";

/// Default `OAuth2` token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Largest page size the member listing accepts.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Most listing retries a configuration may ask for.
pub const MAX_RETRIES: u32 = 10;

/// Upper bound on the wait between listing retries.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// How the client authenticates to the directory.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Pre-issued bearer token, used as is.
    AccessToken(SecretString),
    /// Service-account key exchanged for tokens with the JWT-bearer grant.
    ServiceAccount {
        key: ServiceAccountKey,
        /// Admin user to act as (domain-wide delegation).
        subject: Option<String>,
    },
}

/// Configuration for [`crate::HttpDirectoryClient`].
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// API host, without the `/admin/directory/v1` prefix.
    pub api_base_url: String,

    /// Token endpoint override. Falls back to the key's `token_uri`, then
    /// [`DEFAULT_TOKEN_URL`].
    pub token_url: Option<String>,

    /// Credentials used to obtain bearer tokens.
    pub credentials: Credentials,

    /// `maxResults` for member listings (1-200).
    pub page_size: u32,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries for throttled or transiently failing listings.
    /// Inserts and deletes are never retried.
    pub max_retries: u32,

    /// Initial backoff between listing retries, doubled on each attempt.
    pub retry_delay_ms: u64,
}

impl DirectoryConfig {
    /// Creates a configuration with default endpoints and limits.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: None,
            credentials,
            page_size: MAX_PAGE_SIZE,
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }

    /// Sets the API host.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Sets the listing page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the listing retry policy.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Returns the request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the token endpoint to use for service-account credentials.
    #[must_use]
    pub fn resolved_token_url(&self) -> String {
        if let Some(ref url) = self.token_url {
            return url.clone();
        }
        match self.credentials {
            Credentials::ServiceAccount { ref key, .. } => key
                .token_uri
                .clone()
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            Credentials::AccessToken(_) => DEFAULT_TOKEN_URL.to_string(),
        }
    }

    /// Validates endpoint URLs and limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = url::Url::parse(&self.api_base_url).map_err(|e| {
            ConfigError::InvalidValue("ROSTER_API_BASE_URL".into(), e.to_string())
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(
                "ROSTER_API_BASE_URL".into(),
                format!("unsupported scheme: {}", base.scheme()),
            ));
        }

        if let Some(ref token_url) = self.token_url {
            url::Url::parse(token_url).map_err(|e| {
                ConfigError::InvalidValue("ROSTER_TOKEN_URL".into(), e.to_string())
            })?;
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue(
                "ROSTER_PAGE_SIZE".into(),
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        if self.max_retries > MAX_RETRIES {
            return Err(ConfigError::InvalidValue(
                "ROSTER_MAX_RETRIES".into(),
                format!("must be at most {MAX_RETRIES}"),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "ROSTER_TIMEOUT_SECS".into(),
                "must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Tests supply variables this way without touching the process
    /// environment.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let credentials = if let Ok(token) = reader("ROSTER_ACCESS_TOKEN") {
            Credentials::AccessToken(SecretString::from(token))
        } else if let Ok(path) = reader("ROSTER_CREDENTIALS_FILE") {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                ConfigError::Credentials(format!("failed to read {path}: {e}"))
            })?;
            let key = ServiceAccountKey::from_json(&contents)
                .map_err(|e| ConfigError::Credentials(format!("{path}: {e}")))?;
            Credentials::ServiceAccount {
                key,
                subject: reader("ROSTER_IMPERSONATED_USER").ok(),
            }
        } else {
            return Err(ConfigError::MissingVar(
                "ROSTER_ACCESS_TOKEN or ROSTER_CREDENTIALS_FILE".into(),
            ));
        };

        let mut config = Self::new(credentials);

        if let Ok(url) = reader("ROSTER_API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        config.token_url = reader("ROSTER_TOKEN_URL").ok();

        config.page_size = reader("ROSTER_PAGE_SIZE")
            .unwrap_or_else(|_| MAX_PAGE_SIZE.to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("ROSTER_PAGE_SIZE".into(), e.to_string()))?;

        config.timeout_secs = reader("ROSTER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue("ROSTER_TIMEOUT_SECS".into(), e.to_string()))?;

        config.max_retries = reader("ROSTER_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("ROSTER_MAX_RETRIES".into(), e.to_string()))?;

        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("invalid credentials: {0}")]
    Credentials(String),
}
