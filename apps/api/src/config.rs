use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::render::Locale;

const DEFAULT_RETURN_URL: &str = "https://seu-site-no-netlify.app/";

/// What to do when a submission arrives without a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Render a placeholder label in the header.
    #[default]
    FailSoft,
    /// Reject the submission with a validation error.
    Reject,
}

/// Application configuration loaded from environment variables.
/// Nothing is required; every value has a default suitable for local use.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_dir: PathBuf,
    pub artifact_ttl: Duration,
    /// Mercado Pago access token. `None` means test mode (no payment).
    pub payment_access_token: Option<String>,
    /// Where the provider sends buyers whose payment failed or is pending.
    pub checkout_return_url: String,
    /// Public origin used to build absolute download links. Derived from the
    /// request's Host header when unset.
    pub public_base_url: Option<String>,
    /// Single allowed CORS origin. `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
    pub locale: Locale,
    pub name_policy: NamePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 5000,
            rust_log: "info".to_string(),
            storage_dir: PathBuf::from("curriculos_gerados"),
            artifact_ttl: Duration::from_secs(24 * 60 * 60),
            payment_access_token: None,
            checkout_return_url: DEFAULT_RETURN_URL.to_string(),
            public_base_url: None,
            cors_allowed_origin: None,
            locale: Locale::PtBr,
            name_policy: NamePolicy::FailSoft,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: optional_env("PORT")
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("PORT must be a valid port number")?
                .unwrap_or(defaults.port),
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            storage_dir: optional_env("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            artifact_ttl: optional_env("ARTIFACT_TTL_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("ARTIFACT_TTL_SECS must be a whole number of seconds")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.artifact_ttl),
            payment_access_token: optional_env("MP_ACCESS_TOKEN"),
            checkout_return_url: optional_env("CHECKOUT_RETURN_URL")
                .unwrap_or(defaults.checkout_return_url),
            public_base_url: optional_env("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            cors_allowed_origin: optional_env("CORS_ALLOWED_ORIGIN"),
            locale: optional_env("DOCUMENT_LOCALE")
                .map(|v| v.parse::<Locale>())
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("DOCUMENT_LOCALE must be 'pt-BR' or 'en'")?
                .unwrap_or(defaults.locale),
            name_policy: match optional_env("REQUIRE_NAME") {
                Some(v) if parse_bool(&v).context("REQUIRE_NAME must be true or false")? => {
                    NamePolicy::Reject
                }
                _ => NamePolicy::FailSoft,
            },
        })
    }

    pub fn payment_enabled(&self) -> bool {
        self.payment_access_token.is_some()
    }
}

/// Reads a variable, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("'{other}' is not a boolean"),
    }
}
