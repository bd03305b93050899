use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::conversation::{CacheSettings, DEFAULT_MAX_ITEMS};
use crate::sentiment::DEFAULT_CONCURRENCY;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Scraping
    pub apify_token: String,
    pub max_items: u32,

    // AI (optional: analysis is skipped without a key)
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub concurrency: usize,

    // Fetch cache
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            apify_token: get("APIFY_TOKEN")
                .ok_or_else(|| anyhow!("APIFY_TOKEN environment variable is required"))?,
            max_items: parse_or(get("REPLYSCOPE_MAX_ITEMS"), "REPLYSCOPE_MAX_ITEMS", DEFAULT_MAX_ITEMS)?,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            concurrency: parse_or(
                get("REPLYSCOPE_CONCURRENCY"),
                "REPLYSCOPE_CONCURRENCY",
                DEFAULT_CONCURRENCY,
            )?,
            cache_ttl: Duration::from_secs(parse_or(
                get("REPLYSCOPE_CACHE_TTL_SECS"),
                "REPLYSCOPE_CACHE_TTL_SECS",
                3600,
            )?),
            cache_max_entries: parse_or(
                get("REPLYSCOPE_CACHE_MAX_ENTRIES"),
                "REPLYSCOPE_CACHE_MAX_ENTRIES",
                64,
            )?,
        })
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            ttl: self.cache_ttl,
            max_entries: self.cache_max_entries,
        }
    }

    pub fn log_redacted(&self) {
        info!(
            apify_token = %redact(&self.apify_token),
            gemini_api_key = %self.gemini_api_key.as_deref().map(redact).unwrap_or_else(|| "unset".into()),
            gemini_model = %self.gemini_model,
            max_items = self.max_items,
            concurrency = self.concurrency,
            cache_ttl_secs = self.cache_ttl.as_secs(),
            cache_max_entries = self.cache_max_entries,
            "Configuration loaded"
        );
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}

/// Keep the first four characters of a secret.
fn redact(secret: &str) -> String {
    let shown: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{shown}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = Config::from_lookup(lookup(&[("APIFY_TOKEN", "apify_abc")])).unwrap();

        assert_eq!(config.apify_token, "apify_abc");
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.max_items, 3000);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.cache_settings(), CacheSettings::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("APIFY_TOKEN", "t"),
            ("GEMINI_API_KEY", "gm"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("REPLYSCOPE_MAX_ITEMS", " 200 "),
            ("REPLYSCOPE_CONCURRENCY", "8"),
            ("REPLYSCOPE_CACHE_TTL_SECS", "60"),
            ("REPLYSCOPE_CACHE_MAX_ENTRIES", "10"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_api_key.as_deref(), Some("gm"));
        assert_eq!(config.gemini_model, "gemini-2.5-pro");
        assert_eq!(config.max_items, 200);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_max_entries, 10);
    }

    #[test]
    fn missing_or_blank_token_is_an_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("APIFY_TOKEN"));

        assert!(Config::from_lookup(lookup(&[("APIFY_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn blank_gemini_key_counts_as_unset() {
        let config =
            Config::from_lookup(lookup(&[("APIFY_TOKEN", "t"), ("GEMINI_API_KEY", "")])).unwrap();
        assert_eq!(config.gemini_api_key, None);
    }

    #[test]
    fn bad_number_names_the_variable() {
        let err = Config::from_lookup(lookup(&[
            ("APIFY_TOKEN", "t"),
            ("REPLYSCOPE_CONCURRENCY", "five"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("REPLYSCOPE_CONCURRENCY"));
    }

    #[test]
    fn redact_keeps_a_short_prefix() {
        assert_eq!(redact("apify_api_123"), "apif****");
        assert_eq!(redact("abc"), "****");
    }
}
