use std::fmt;

use dotenv::dotenv;

use crate::error::CtpError;

/// Environment keys that must all be present (and non-empty) before a client
/// can be built.
pub const REQUIRED_ENV: [&str; 6] = [
    "CTP_PROJECT_KEY",
    "CTP_CLIENT_ID",
    "CTP_CLIENT_SECRET",
    "CTP_API_URL",
    "CTP_AUTH_URL",
    "CTP_SCOPES",
];

/// Transparent retry policy for transient HTTP failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub backoff: bool,
    pub retry_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 200,
            backoff: true,
            retry_codes: vec![500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn should_retry(&self, status: u16) -> bool {
        self.retry_codes.contains(&status)
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        if self.backoff {
            self.retry_delay_ms.saturating_mul(1u64 << attempt.min(16))
        } else {
            self.retry_delay_ms
        }
    }
}

#[derive(Clone)]
pub struct CtpConfig {
    pub project_key: String,
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub auth_url: String,
    pub scopes: Vec<String>,
    pub retry: RetryConfig,
}

impl fmt::Debug for CtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtpConfig")
            .field("project_key", &self.project_key)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("scopes", &self.scopes)
            .field("retry", &self.retry)
            .finish()
    }
}

impl CtpConfig {
    /// Load `.env` (if present) and read the `CTP_*` variables.
    pub fn from_env() -> Result<Self, CtpError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Every key in [`REQUIRED_ENV`] must
    /// resolve to a non-blank value; the error lists all of the missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CtpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&str> = REQUIRED_ENV
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(CtpError::Config(format!(
                "missing required env: {}",
                missing.join(", ")
            )));
        }

        let scopes: Vec<String> = get("CTP_SCOPES")
            .unwrap_or_default()
            .split_whitespace()
            .map(ToOwned::to_owned)
            .collect();

        Ok(Self {
            project_key: get("CTP_PROJECT_KEY").unwrap_or_default(),
            client_id: get("CTP_CLIENT_ID").unwrap_or_default(),
            client_secret: get("CTP_CLIENT_SECRET").unwrap_or_default(),
            api_url: get("CTP_API_URL").unwrap_or_default(),
            auth_url: get("CTP_AUTH_URL").unwrap_or_default(),
            scopes,
            retry: RetryConfig::default(),
        })
    }
}
