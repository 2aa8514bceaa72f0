use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::coordinator::RefreshPolicy;

/// Environment variable that overrides [`GatewayConfig::base_url`].
pub const BASE_URL_ENV: &str = "ARENA_API_BASE_URL";

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub refresh_wait_timeout_secs: u64,
    pub require_credential_rotation: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/api/v1".into(),
            request_timeout_secs: 30,
            refresh_wait_timeout_secs: 30,
            require_credential_rotation: false,
        }
    }
}

impl GatewayConfig {
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn with_base_url(mut self, baseUrl: impl Into<String>) -> Self {
        self.base_url = baseUrl.into();
        self
    }

    pub fn with_env_overrides(self) -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(baseUrl) if !baseUrl.trim().is_empty() => {
                info!("{BASE_URL_ENV} overrides api base url: {baseUrl}");
                self.with_base_url(baseUrl)
            }
            _ => self,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            wait_timeout: Duration::from_secs(self.refresh_wait_timeout_secs),
            require_credential_rotation: self.require_credential_rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = GatewayConfig::from_toml(r#"base_url = "https://api.arena.test""#).unwrap();
        assert_eq!(config.base_url, "https://api.arena.test");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.require_credential_rotation);
    }

    #[test]
    fn refresh_policy_mirrors_settings() {
        let config = GatewayConfig::from_toml(
            "refresh_wait_timeout_secs = 5\nrequire_credential_rotation = true",
        )
        .unwrap();
        let policy = config.refresh_policy();
        assert_eq!(policy.wait_timeout, Duration::from_secs(5));
        assert!(policy.require_credential_rotation);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(GatewayConfig::from_toml("request_timeout_secs = \"soon\"").is_err());
    }
}
