use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider_url: Option<String>,
    pub api_key: Option<String>,
    pub bind_addr: String,
    pub provider_timeout: Duration,
    pub max_image_bytes: usize,
    pub include_raw: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_url: None,
            api_key: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            provider_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            include_raw: true,
        }
    }
}

impl Config {
    /// Load from the process environment (call `dotenv()` first).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let provider_timeout = match non_empty("PROVIDER_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .with_context(|| format!("PROVIDER_TIMEOUT_SECS must be a number of seconds, got '{}'", v))?,
            ),
            None => defaults.provider_timeout,
        };

        let max_image_bytes = match non_empty("MAX_IMAGE_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("MAX_IMAGE_BYTES must be a byte count, got '{}'", v))?,
            None => defaults.max_image_bytes,
        };

        let include_raw = match non_empty("INCLUDE_RAW_RESPONSE") {
            Some(v) => parse_bool(&v)
                .with_context(|| format!("INCLUDE_RAW_RESPONSE must be true/false, got '{}'", v))?,
            None => defaults.include_raw,
        };

        Ok(Self {
            provider_url: non_empty("FOOD_VISION_URL"),
            api_key: non_empty("FOOD_VISION_API_KEY"),
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            provider_timeout,
            max_image_bytes,
            include_raw,
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
