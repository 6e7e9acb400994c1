use crate::routes::Route;
use anyhow::{Context, Result, bail};
use reqwest::Url;
use std::collections::HashMap;

/// Bundled config for mobile and web builds, where no `.env` file is around.
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const API_URL_KEY: &str = "KB_API_URL";
pub const START_VIEW_KEY: &str = "KB_START_VIEW";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Startup configuration. Built once in `main` and handed to the UI root.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub start_route: Route,
}

impl AppConfig {
    /// Process environment first (after loading `.env` on native targets),
    /// then the bundled defaults.
    pub fn load() -> Result<Self> {
        load_dotenv();
        let bundled = parse_env_lines(BUNDLED_CONFIG);
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| bundled.get(key).cloned())
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_url = lookup(API_URL_KEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = normalize_api_url(&raw_url)
            .with_context(|| format!("invalid {API_URL_KEY} value {raw_url:?}"))?;

        let start_route = lookup(START_VIEW_KEY)
            .map(|path| Route::from_path(&path))
            .unwrap_or_default();

        Ok(Self {
            api_url,
            start_route,
        })
    }
}

fn normalize_api_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("unsupported scheme {:?}, expected http or https", url.scheme());
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

#[cfg(target_arch = "wasm32")]
fn load_dotenv() {}

/// Parses `KEY=VALUE` lines, skipping blanks and `#` comments.
pub fn parse_env_lines(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.start_route, Route::Chat);
    }

    #[test]
    fn trims_trailing_slash_and_reads_start_view() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (API_URL_KEY, "https://kb.example.com/api/"),
            (START_VIEW_KEY, "/knowledge-base"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://kb.example.com/api");
        assert_eq!(config.start_route, Route::KnowledgeBase);
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(AppConfig::from_lookup(lookup_from(&[(API_URL_KEY, "ftp://files")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[(API_URL_KEY, "not a url")])).is_err());
    }

    #[test]
    fn parses_bundled_lines() {
        let parsed = parse_env_lines("# comment\n\nKB_API_URL = http://x:1\nbroken line\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("KB_API_URL").map(String::as_str), Some("http://x:1"));
    }

    #[test]
    fn bundled_config_is_valid() {
        let bundled = parse_env_lines(BUNDLED_CONFIG);
        assert!(AppConfig::from_lookup(|key| bundled.get(key).cloned()).is_ok());
    }
}
