use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use tagforge_core::validation::rules_payload::DEFAULT_MAX_PAYLOAD_BYTES;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    /// URL the tag payload is appended to, e.g. `https://host/app/index.html`.
    pub base_url: String,
    /// Origin (and base path) relative document and asset URLs resolve against.
    pub app_origin: String,
    pub tenant: Option<String>,
    pub brand_dir: PathBuf,
    pub max_payload: usize,
    pub cache_version: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env if present

        let base_url = env::var("TAGFORGE_BASE_URL").unwrap_or_else(|_| "https://example.com/index.html".to_string());

        Ok(Config {
            database_url: env::var("TAGFORGE_DATABASE_URL").unwrap_or_else(|_| "sqlite://tagforge.db".to_string()),

            app_origin: env::var("TAGFORGE_APP_ORIGIN").unwrap_or_else(|_| base_url.clone()),

            base_url,

            tenant: env::var("TAGFORGE_TENANT").ok().filter(|t| !t.trim().is_empty()),

            brand_dir: env::var("TAGFORGE_BRAND_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("branding")),

            max_payload: match env::var("TAGFORGE_MAX_PAYLOAD") {
                Ok(raw) => raw.parse().context("TAGFORGE_MAX_PAYLOAD must be a byte count")?,
                Err(_) => DEFAULT_MAX_PAYLOAD_BYTES,
            },

            cache_version: match env::var("TAGFORGE_CACHE_VERSION") {
                Ok(raw) => raw.parse().context("TAGFORGE_CACHE_VERSION must be a positive integer")?,
                Err(_) => 1,
            },
        })
    }

    /// Directory part of the base URL path, e.g. `/app/` for
    /// `https://host/app/index.html`. Tenant segments follow it.
    pub fn app_scope(&self) -> String {
        let path = url::Url::parse(&self.base_url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| "/".to_string());
        match path.rfind('/') {
            Some(idx) => path[..=idx].to_string(),
            None => "/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            base_url: base_url.to_string(),
            app_origin: base_url.to_string(),
            tenant: None,
            brand_dir: PathBuf::from("branding"),
            max_payload: DEFAULT_MAX_PAYLOAD_BYTES,
            cache_version: 1,
        }
    }

    #[test]
    fn test_app_scope() {
        assert_eq!(config("https://example.com/tagforge/index.html").app_scope(), "/tagforge/");
        assert_eq!(config("https://example.com/tagforge/").app_scope(), "/tagforge/");
        assert_eq!(config("https://example.com").app_scope(), "/");
    }
}
