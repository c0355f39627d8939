use std::env;
use std::time::Duration;

/// Hard ceiling for gallery images per product.
pub const MAX_GALLERY_IMAGES: usize = 3;

/// Client configuration for the catalog admin
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the product API, always ending in `/` (default: "http://127.0.0.1:3000/api/")
    pub api_base_url: String,

    /// Value sent in the `key` header on protected product calls
    pub api_key: Option<String>,

    /// Operator username accepted at login
    pub admin_username: Option<String>,

    /// Argon2 PHC hash of the operator password
    pub admin_password_hash: Option<String>,

    /// Per-request timeout in seconds (default: 30)
    pub http_timeout_secs: u64,

    /// Gallery capacity, clamped to 1..=3 (default: 3)
    pub gallery_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000/api/".to_string(),
            api_key: None,
            admin_username: None,
            admin_password_hash: None,
            http_timeout_secs: 30,
            gallery_limit: MAX_GALLERY_IMAGES,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_base_url: normalize_base_url(
                &non_empty("CATALOG_API_URL").unwrap_or(default.api_base_url),
            ),

            api_key: non_empty("CATALOG_API_KEY"),

            admin_username: non_empty("CATALOG_ADMIN_USERNAME"),

            admin_password_hash: non_empty("CATALOG_ADMIN_PASSWORD_HASH"),

            http_timeout_secs: lookup("CATALOG_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(default.http_timeout_secs),

            gallery_limit: lookup("CATALOG_GALLERY_LIMIT")
                .and_then(|v| v.parse::<usize>().ok())
                .map(|limit| limit.clamp(1, MAX_GALLERY_IMAGES))
                .unwrap_or(default.gallery_limit),
        }
    }

    /// Config pointing at a local API, used by tests and demos
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ClientConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:3000/api/");
        assert_eq!(config.gallery_limit, 3);
        assert_eq!(config.http_timeout_secs, 30);
        assert!(config.api_key.is_none());
        assert!(config.admin_password_hash.is_none());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = config_from(&[
            ("CATALOG_API_URL", "https://catalog.example.com/api"),
            ("CATALOG_API_KEY", "k-123"),
            ("CATALOG_ADMIN_USERNAME", "operator"),
            ("CATALOG_HTTP_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(config.api_base_url, "https://catalog.example.com/api/");
        assert_eq!(config.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.admin_username.as_deref(), Some("operator"));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_gallery_limit_is_clamped() {
        let config = config_from(&[("CATALOG_GALLERY_LIMIT", "10")]);
        assert_eq!(config.gallery_limit, 3);

        let config = config_from(&[("CATALOG_GALLERY_LIMIT", "0")]);
        assert_eq!(config.gallery_limit, 1);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = config_from(&[
            ("CATALOG_API_KEY", "  "),
            ("CATALOG_HTTP_TIMEOUT_SECS", "not-a-number"),
        ]);
        assert!(config.api_key.is_none());
        assert_eq!(config.http_timeout_secs, 30);
    }
}
