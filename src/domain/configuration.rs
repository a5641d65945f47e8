//! Client configuration loaded from `collabflow.toml`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::AppError;
use crate::domain::contract::SignerRole;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "collabflow.toml";
/// Overrides the config file path.
pub const CONFIG_PATH_ENV: &str = "COLLABFLOW_CONFIG";
/// Bearer token for the marketplace API.
pub const API_TOKEN_ENV: &str = "COLLABFLOW_API_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Marketplace API configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Who is acting in this session.
    #[serde(default)]
    pub session: SessionConfig,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.api.validate()?;
        self.session.validate()?;
        Ok(())
    }
}

/// Marketplace API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are joined onto it.
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum attempts for read-only calls.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between read retries in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout_secs == 0 {
            return Err(AppError::InvalidConfig("timeout_secs must be greater than 0".to_string()));
        }
        if self.max_retries == 0 {
            return Err(AppError::InvalidConfig("max_retries must be greater than 0".to_string()));
        }
        if self.retry_delay_ms == 0 {
            return Err(AppError::InvalidConfig(
                "retry_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.api_url.cannot_be_a_base() {
            return Err(AppError::InvalidConfig(format!(
                "api_url '{}' cannot be used as a base URL",
                self.api_url
            )));
        }
        Ok(())
    }
}

fn default_api_url() -> Url {
    Url::parse("http://localhost:5000/api/").expect("Default API URL must be valid")
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

/// Identity of the acting user, passed into workflows at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// `merchant` or `influencer`.
    #[serde(default = "default_role")]
    pub role: String,
    /// Opaque id of the acting user, for logging only.
    #[serde(default)]
    pub actor_id: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { role: default_role(), actor_id: None }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.signer_role().map(|_| ())
    }

    pub fn signer_role(&self) -> Result<SignerRole, AppError> {
        SignerRole::from_str_opt(&self.role).ok_or_else(|| {
            AppError::InvalidConfig(format!(
                "session.role must be 'merchant' or 'influencer' (got '{}')",
                self.role
            ))
        })
    }
}

fn default_role() -> String {
    "influencer".to_string()
}
