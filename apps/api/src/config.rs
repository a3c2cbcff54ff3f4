use anyhow::{Context, Result};

const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL_NAME: &str = "llama3-70b-8192";

/// Application configuration loaded from environment variables.
/// Read once at startup and passed around as an immutable value.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub llm_api_url: String,
    pub model_name: String,
    pub model_temperature: f32,
    pub data_dir: String,
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: usize,
    /// Seconds.
    pub rate_limit_period: u64,
    pub log_level: String,
    pub log_file: Option<String>,
    pub retention_days: i64,
    /// Minutes a session may sit idle before it is discarded.
    pub session_idle_timeout_mins: u64,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Missing optional keys
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            groq_api_key: lookup("GROQ_API_KEY")
                .filter(|v| !v.trim().is_empty())
                .context("Required environment variable 'GROQ_API_KEY' is not set")?,
            llm_api_url: var_or("LLM_API_URL", DEFAULT_LLM_API_URL),
            model_name: var_or("MODEL_NAME", DEFAULT_MODEL_NAME),
            model_temperature: var_or("MODEL_TEMPERATURE", "0.2")
                .parse::<f32>()
                .context("MODEL_TEMPERATURE must be a number")?,
            data_dir: var_or("DATA_DIR", "data"),
            enable_rate_limiting: parse_bool(&var_or("ENABLE_RATE_LIMITING", "true"))
                .context("ENABLE_RATE_LIMITING must be true or false")?,
            rate_limit_requests: var_or("RATE_LIMIT_REQUESTS", "10")
                .parse::<usize>()
                .context("RATE_LIMIT_REQUESTS must be a non-negative integer")?,
            rate_limit_period: var_or("RATE_LIMIT_PERIOD", "60")
                .parse::<u64>()
                .context("RATE_LIMIT_PERIOD must be a number of seconds")?,
            log_level: var_or("LOG_LEVEL", "info").to_lowercase(),
            log_file: lookup("LOG_FILE").filter(|v| !v.trim().is_empty()),
            retention_days: var_or("RETENTION_DAYS", "90")
                .parse::<i64>()
                .context("RETENTION_DAYS must be an integer")?,
            session_idle_timeout_mins: var_or("SESSION_IDLE_TIMEOUT_MINS", "30")
                .parse::<u64>()
                .ok()
                .filter(|m| *m > 0)
                .context("SESSION_IDLE_TIMEOUT_MINS must be a positive number of minutes")?,
            port: var_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied_when_only_api_key_set() {
        let config = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "gsk-test")])).unwrap();
        assert_eq!(config.model_name, "llama3-70b-8192");
        assert!((config.model_temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.data_dir, "data");
        assert!(config.enable_rate_limiting);
        assert_eq!(config.rate_limit_requests, 10);
        assert_eq!(config.rate_limit_period, 60);
        assert_eq!(config.retention_days, 90);
        assert_eq!(config.session_idle_timeout_mins, 30);
        assert_eq!(config.port, 8080);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk-test"),
            ("MODEL_TEMPERATURE", "0.7"),
            ("ENABLE_RATE_LIMITING", "false"),
            ("RETENTION_DAYS", "30"),
            ("LOG_LEVEL", "DEBUG"),
            ("LOG_FILE", "logs/talentscout.log"),
        ]))
        .unwrap();
        assert!(!config.enable_rate_limiting);
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file.as_deref(), Some("logs/talentscout.log"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "k"), ("PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_idle_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "k"),
            ("SESSION_IDLE_TIMEOUT_MINS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SESSION_IDLE_TIMEOUT_MINS"));
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "k"),
            ("ENABLE_RATE_LIMITING", "sometimes"),
        ]))
        .is_err());
    }
}
