//! Configuration for scribe
//!
//! Loaded once at process start from (in increasing precedence) an optional
//! TOML file, a `.env` file, and the process environment. The resulting
//! [`Config`] is immutable and handed to each adapter by reference.

use crate::error::{Result, ScribeError};
use crate::services::LlmConfig;
use secrecy::SecretString;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default Anthropic API base URL
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.anthropic.com";

/// Default model for content generation
pub const DEFAULT_LLM_MODEL: &str = "claude-3-5-sonnet-20241022";

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_HOST: &str = "0.0.0.0";

/// WordPress connection settings
#[derive(Debug)]
pub struct WordPressConfig {
    /// Site root, e.g. `https://example.com` (no `/wp-json` suffix)
    pub base_url: Url,
    pub username: String,
    pub application_password: SecretString,
    /// Timeout for JSON requests
    pub timeout: Duration,
    /// Timeout for media uploads
    pub media_timeout: Duration,
}

/// HTTP façade settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ScribeError::Other(format!("invalid listen address: {}", e)))
    }
}

/// Process-wide configuration
#[derive(Debug)]
pub struct Config {
    pub wordpress: WordPressConfig,
    /// `None` when no API key is configured; AI operations are then unavailable
    pub llm: Option<LlmConfig>,
    pub server: ServerConfig,
}

/// Flat key set as read from file and environment
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    wp_url: Option<String>,
    wp_username: Option<String>,
    wp_user: Option<String>,
    wp_password: Option<String>,
    wp_app_password: Option<String>,
    anthropic_api_key: Option<String>,
    anthropic_base_url: Option<String>,
    llm_model: Option<String>,
    llm_max_tokens: Option<u32>,
    llm_temperature: Option<f32>,
    host: Option<String>,
    port: Option<u16>,
}

impl Config {
    /// Load configuration from an optional file, `.env`, and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env file: {}", e),
        }

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Reading configuration file {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }
        let source = builder
            .add_source(config::Environment::default())
            .build()?;

        Self::from_source(source)
    }

    /// Build configuration from an already-assembled source
    pub fn from_source(source: config::Config) -> Result<Self> {
        let raw: RawSettings = source.try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let wp_url = required(raw.wp_url, "WP_URL")?;
        let base_url = parse_site_url(&wp_url)?;
        let username = required(raw.wp_username.or(raw.wp_user), "WP_USERNAME (or WP_USER)")?;
        let password = required(
            raw.wp_password.or(raw.wp_app_password),
            "WP_PASSWORD (or WP_APP_PASSWORD)",
        )?;

        let llm = match non_blank(raw.anthropic_api_key) {
            Some(api_key) => {
                let temperature = raw.llm_temperature.unwrap_or(0.7);
                if !(0.0..=1.0).contains(&temperature) {
                    return Err(config_error(format!(
                        "LLM_TEMPERATURE must be between 0.0 and 1.0 (got {})",
                        temperature
                    )));
                }
                Some(LlmConfig {
                    api_key: SecretString::from(api_key),
                    base_url: non_blank(raw.anthropic_base_url)
                        .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
                    model: non_blank(raw.llm_model).unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                    max_tokens: raw.llm_max_tokens.unwrap_or(4000),
                    temperature,
                    timeout: Duration::from_secs(300),
                })
            }
            None => {
                warn!("ANTHROPIC_API_KEY not set - AI content generation disabled");
                None
            }
        };

        let config = Self {
            wordpress: WordPressConfig {
                base_url,
                username,
                application_password: SecretString::from(password),
                timeout: Duration::from_secs(30),
                media_timeout: Duration::from_secs(60),
            },
            llm,
            server: ServerConfig {
                host: non_blank(raw.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.port.unwrap_or(DEFAULT_PORT),
            },
        };

        info!(
            wordpress = %config.wordpress.base_url,
            ai_enabled = config.llm.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Whether AI generation is configured
    pub fn ai_enabled(&self) -> bool {
        self.llm.is_some()
    }
}

/// Parse and normalize the WordPress site URL
fn parse_site_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| config_error(format!("WP_URL is not a valid URL ({}): {}", e, raw)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(config_error(format!(
            "WP_URL must use http or https (got {})",
            url.scheme()
        )));
    }
    Ok(url)
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| config_error(format!("{} is not set", name)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn config_error(message: String) -> ScribeError {
    ScribeError::Config(config::ConfigError::Message(message))
}
