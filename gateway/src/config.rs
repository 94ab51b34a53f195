//! Configuration module for environment variable parsing.
//!
//! Everything the gateway needs is read once at startup from the process
//! environment. Only the public key is mandatory.

use std::env;

use anyhow::{bail, Context, Result};
use tracing::warn;
use url::Url;

/// Default base URL of the platform's REST API.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api";

/// Default route the interaction endpoint is mounted on.
pub const DEFAULT_INTERACTIONS_PATH: &str = "/interactions";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hex-encoded Ed25519 public key of the application
    pub public_key: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Base URL the webhook messaging endpoint hangs off, without a trailing slash
    pub api_base: String,

    /// Route for inbound interaction webhooks
    pub interactions_path: String,

    /// Upper bound on the buffered raw request body
    pub max_body_bytes: usize,
}

impl Config {
    /// Build a config with defaults for everything but the public key.
    pub fn new(public_key: impl Into<String>) -> Self {
        Config {
            public_key: public_key.into(),
            port: 8080,
            api_base: DEFAULT_API_BASE.to_string(),
            interactions_path: DEFAULT_INTERACTIONS_PATH.to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let public_key = match env::var("DISCORD_PUBLIC_KEY") {
            Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => bail!("DISCORD_PUBLIC_KEY must be set"),
        };

        let mut config = Config::new(public_key);

        config.port = parse_or("PORT", config.port);
        config.max_body_bytes = parse_or("MAX_BODY_BYTES", config.max_body_bytes);

        if let Ok(raw) = env::var("DISCORD_API_BASE") {
            let parsed = Url::parse(raw.trim())
                .with_context(|| format!("DISCORD_API_BASE is not a valid url: {raw}"))?;
            config.api_base = parsed.as_str().trim_end_matches('/').to_string();
        }

        if let Ok(raw) = env::var("INTERACTIONS_PATH") {
            config.interactions_path = normalize_path(&raw);
        }

        Ok(config)
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Make sure a route starts with exactly one slash and has no trailing one.
fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        warn!(value = %raw, "Empty interactions path, using default");
        return DEFAULT_INTERACTIONS_PATH.to_string();
    }
    format!("/{trimmed}")
}
