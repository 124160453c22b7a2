use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtpError {
    #[error("client configuration is not provided: {0}")]
    Config(String),
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network: {0}")]
    Net(#[from] reqwest::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("url: {0}")]
    Url(#[from] url::ParseError),
}

impl CtpError {
    /// Build an `Http` error from a non-success response body. The platform
    /// answers with `{"statusCode":..,"message":..,"errors":[..]}`; fall back to
    /// the raw body when it is not JSON.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or_else(|| body.trim().to_string());
        CtpError::Http { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            CtpError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stale `version` on an update (ConcurrentModification).
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}
