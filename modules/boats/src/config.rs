use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the boats module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoatsConfig {
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
    /// Root of the web app; invitees are sent to `{app_base_url}/sign-in`.
    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,
    #[serde(default = "default_identity_base_url")]
    pub identity_base_url: String,
    #[serde(default)]
    pub identity_api_key: String,
    #[serde(default = "default_identity_timeout", with = "humantime_serde")]
    pub identity_timeout: Duration,
}

impl Default for BoatsConfig {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name_length(),
            max_description_length: default_max_description_length(),
            app_base_url: default_app_base_url(),
            identity_base_url: default_identity_base_url(),
            identity_api_key: String::new(),
            identity_timeout: default_identity_timeout(),
        }
    }
}

fn default_max_name_length() -> usize {
    100
}

fn default_max_description_length() -> usize {
    2000
}

fn default_app_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_identity_base_url() -> String {
    "https://api.clerk.com".to_string()
}

fn default_identity_timeout() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: BoatsConfig =
            serde_json::from_value(serde_json::json!({ "identity_timeout": "3s" })).unwrap();
        assert_eq!(cfg.max_name_length, 100);
        assert_eq!(cfg.identity_timeout, Duration::from_secs(3));
        assert_eq!(cfg.app_base_url, "http://localhost:3000");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<BoatsConfig, _> =
            serde_json::from_value(serde_json::json!({ "max_page_size": 10 }));
        assert!(res.is_err());
    }
}
