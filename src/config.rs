// src/config.rs
// =============================================================================
// Runtime configuration, read once from the environment at startup.
//
// Recognized variables:
//   NEXT_PUBLIC_GITHUB_TOKEN / GITHUB_TOKEN   GitHub token (optional)
//   GEMINI_API_KEY / NEXT_PUBLIC_GEMINI_API_KEY  language model key (optional)
//   REPO_LENS_GEMINI_MODEL                    model name
//   REPO_LENS_GITHUB_API                      GitHub API base URL
//   REPO_LENS_GEMINI_API                      Gemini API base URL
//   REPO_LENS_DEBOUNCE_MS                     URL field settle delay
//
// A `.env` file in the working directory is loaded first, if present.
// Missing tokens are not errors: GitHub falls back to anonymous access and
// analysis reports its fixed failure message.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;
use url::Url;

use crate::debounce::DEFAULT_DELAY;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GEMINI_API: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub github_api: Url,
    pub gemini_api_key: Option<String>,
    pub gemini_api: Url,
    pub gemini_model: String,
    pub debounce: Duration,
}

impl Config {
    // Loads `.env` (if any) and then reads the process environment
    pub fn load() -> Result<Self> {
        // A missing .env file is the normal case
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Builds a config from any key lookup; `load` passes the real environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let github_token = var(&["NEXT_PUBLIC_GITHUB_TOKEN", "GITHUB_TOKEN"]);
        if github_token.is_none() {
            warn!("no GitHub token configured; using anonymous access with lower rate limits");
        }

        let github_api = parse_base(
            "REPO_LENS_GITHUB_API",
            var(&["REPO_LENS_GITHUB_API"]).as_deref().unwrap_or(DEFAULT_GITHUB_API),
        )?;
        let gemini_api = parse_base(
            "REPO_LENS_GEMINI_API",
            var(&["REPO_LENS_GEMINI_API"]).as_deref().unwrap_or(DEFAULT_GEMINI_API),
        )?;

        let debounce = match var(&["REPO_LENS_DEBOUNCE_MS"]) {
            Some(ms) => Duration::from_millis(
                ms.parse()
                    .with_context(|| format!("REPO_LENS_DEBOUNCE_MS is not a number: {ms}"))?,
            ),
            None => DEFAULT_DELAY,
        };

        Ok(Self {
            github_token,
            github_api,
            gemini_api_key: var(&["GEMINI_API_KEY", "NEXT_PUBLIC_GEMINI_API_KEY"]),
            gemini_api,
            gemini_model: var(&["REPO_LENS_GEMINI_MODEL"])
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            debounce,
        })
    }
}

fn parse_base(name: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).with_context(|| format!("{name} is not a valid URL: {value}"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("{name} cannot be used as a base URL: {value}");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.github_token, None);
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.github_api.as_str(), "https://api.github.com/");
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.debounce, Duration::from_millis(1000));
    }

    #[test]
    fn test_public_token_wins_over_fallback() {
        let config = config_from(&[
            ("NEXT_PUBLIC_GITHUB_TOKEN", "public"),
            ("GITHUB_TOKEN", "fallback"),
        ])
        .unwrap();
        assert_eq!(config.github_token.as_deref(), Some("public"));

        let config = config_from(&[("NEXT_PUBLIC_GITHUB_TOKEN", "  "), ("GITHUB_TOKEN", "fallback")])
            .unwrap();
        assert_eq!(config.github_token.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("REPO_LENS_GITHUB_API", "http://localhost:8080"),
            ("REPO_LENS_DEBOUNCE_MS", "250"),
            ("REPO_LENS_GEMINI_MODEL", "gemini-pro"),
            ("GEMINI_API_KEY", "key"),
        ])
        .unwrap();
        assert_eq!(config.github_api.as_str(), "http://localhost:8080/");
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.gemini_model, "gemini-pro");
        assert_eq!(config.gemini_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("REPO_LENS_GITHUB_API", "not a url")]).is_err());
        assert!(config_from(&[("REPO_LENS_GEMINI_API", "mailto:x@y")]).is_err());
        assert!(config_from(&[("REPO_LENS_DEBOUNCE_MS", "soon")]).is_err());
    }
}
