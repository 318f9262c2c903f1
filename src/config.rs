use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_ATTEMPT_STORE_PATH: &str = ".assessment_attempts.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub attempt_store_path: PathBuf,
    pub http_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = get_env_or(&lookup, "ASSESSMENT_API_URL", DEFAULT_API_URL);
        url::Url::parse(&api_base_url).map_err(|e| {
            Error::Config(format!("Invalid value for ASSESSMENT_API_URL: {}", e))
        })?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_token: lookup("ASSESSMENT_API_TOKEN").filter(|t| !t.trim().is_empty()),
            attempt_store_path: PathBuf::from(get_env_or(
                &lookup,
                "ATTEMPT_STORE_PATH",
                DEFAULT_ATTEMPT_STORE_PATH,
            )),
            http_timeout_secs: get_env_parse_or(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
        })
    }
}

fn get_env_or<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api_token, None);
        assert_eq!(
            config.attempt_store_path,
            PathBuf::from(".assessment_attempts.json")
        );
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn trailing_slash_is_trimmed_and_blank_token_ignored() {
        let config = Config::from_lookup(lookup_from(&[
            ("ASSESSMENT_API_URL", "https://lms.example.edu/"),
            ("ASSESSMENT_API_TOKEN", "  "),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://lms.example.edu");
        assert_eq!(config.api_token, None);
        assert_eq!(config.http_timeout_secs, 5);
    }

    #[test]
    fn rejects_bad_url_and_bad_timeout() {
        let err = Config::from_lookup(lookup_from(&[("ASSESSMENT_API_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("HTTP_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("HTTP_TIMEOUT_SECS")));
    }
}
