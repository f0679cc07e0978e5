//! Client configuration.
//!
//! Authentication belongs to the transport: whatever `Auth` is configured is
//! attached to every request the `UreqTransport` sends.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;

pub const ENV_URL: &str = "PIWEBAPI_URL";
pub const ENV_USERNAME: &str = "PIWEBAPI_USERNAME";
pub const ENV_PASSWORD: &str = "PIWEBAPI_PASSWORD";
pub const ENV_TOKEN: &str = "PIWEBAPI_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "PIWEBAPI_TIMEOUT_SECS";

/// Credentials attached to every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Auth {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer(String),
}

impl Auth {
    /// Value for the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Auth::None => None,
            Auth::Basic { username, password } => {
                Some(format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))))
            }
            Auth::Bearer(token) => Some(format!("Bearer {token}")),
        }
    }
}

// Secrets never reach logs.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::None => f.write_str("None"),
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Auth::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// Where the PI Web API lives and how to reach it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://pi.example.com/piwebapi`.
    pub base_url: String,
    pub auth: Auth,
    /// Overall per-call timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: Auth::None,
            timeout: None,
        }
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Auth::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Bearer(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Expects:
    /// - `PIWEBAPI_URL`: API root (required)
    /// - `PIWEBAPI_TOKEN`: bearer token, takes precedence over basic credentials
    /// - `PIWEBAPI_USERNAME` / `PIWEBAPI_PASSWORD`: basic credentials, both or neither
    /// - `PIWEBAPI_TIMEOUT_SECS`: per-call timeout in whole seconds
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = non_empty_var(ENV_URL)
            .ok_or_else(|| ApiError::ConfigError(format!("{ENV_URL} not set")))?;
        let mut config = ClientConfig::new(base_url);

        if let Some(token) = non_empty_var(ENV_TOKEN) {
            config = config.with_bearer_token(token);
        } else {
            match (non_empty_var(ENV_USERNAME), non_empty_var(ENV_PASSWORD)) {
                (Some(username), Some(password)) => {
                    config = config.with_basic_auth(username, password);
                }
                (None, None) => {}
                _ => {
                    return Err(ApiError::ConfigError(format!(
                        "{ENV_USERNAME} and {ENV_PASSWORD} must be set together"
                    )))
                }
            }
        }

        if let Some(raw) = non_empty_var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| {
                ApiError::ConfigError(format!("{ENV_TIMEOUT_SECS} is not a number of seconds: {raw}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
