//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Base URL of the hosted store/auth/functions project
//! - `SUPABASE_ANON_KEY` - Public API credential sent as `apikey` and as the
//!   default bearer token
//!
//! ## Optional
//! - `SUPABASE_FUNCTIONS_URL` - Payment functions base (default: `<SUPABASE_URL>/functions/v1`)
//! - `BREAD_IDENTITY_CACHE` - Identity cache file (default: `.bread/identity.json`)
//! - `BREAD_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_IDENTITY_CACHE: &str = ".bread/identity.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Newer projects issue `sb_publishable_...` keys; older ones a JWT.
const PUBLISHABLE_KEY_PREFIX: &str = "sb_publishable_";

/// Random key material sits well above this; hand-typed values fall below.
const MIN_KEY_BITS_PER_CHAR: f64 = 3.3;

/// Fragments of the values `.env` templates ship with (case-insensitive).
const TEMPLATE_MARKERS: &[&str] = &["your-", "anon-key", "changeme", "placeholder"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Unusable SUPABASE_ANON_KEY: {0}")]
    InvalidAnonKey(String),
}

/// Client configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClientConfig {
    /// Project base URL (store at `/rest/v1`, auth at `/auth/v1`)
    pub supabase_url: Url,
    /// Public API credential
    pub anon_key: SecretString,
    /// Base URL the payment functions live under
    pub functions_url: Url,
    /// File the signed-in identity is cached in
    pub identity_cache_path: PathBuf,
    /// Timeout applied to every remote request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("supabase_url", &self.supabase_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("functions_url", &self.functions_url.as_str())
            .field("identity_cache_path", &self.identity_cache_path)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Build a configuration from explicit values, using defaults for the
    /// optional settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the functions URL cannot be
    /// derived from `supabase_url`.
    pub fn new(supabase_url: Url, anon_key: SecretString) -> Result<Self, ConfigError> {
        let supabase_url = with_trailing_slash(supabase_url);
        let functions_url = default_functions_url(&supabase_url)?;
        Ok(Self {
            supabase_url,
            anon_key,
            functions_url,
            identity_cache_path: PathBuf::from(DEFAULT_IDENTITY_CACHE),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the anon key is a template value or not shaped like a key.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let supabase_url = get_url("SUPABASE_URL")?;
        let anon_key = get_required_env("SUPABASE_ANON_KEY")?;
        check_anon_key(&anon_key).map_err(ConfigError::InvalidAnonKey)?;
        let anon_key = SecretString::from(anon_key);

        let functions_url = match get_optional_env("SUPABASE_FUNCTIONS_URL") {
            Some(raw) => parse_url("SUPABASE_FUNCTIONS_URL", &raw)?,
            None => default_functions_url(&supabase_url)?,
        };

        let identity_cache_path = PathBuf::from(get_env_or_default(
            "BREAD_IDENTITY_CACHE",
            DEFAULT_IDENTITY_CACHE,
        ));

        let timeout_secs = get_env_or_default("BREAD_HTTP_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BREAD_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            supabase_url,
            anon_key,
            functions_url,
            identity_cache_path,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Override the identity cache location.
    #[must_use]
    pub fn with_identity_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_cache_path = path.into();
        self
    }

    /// Override the payment functions base URL.
    #[must_use]
    pub fn with_functions_url(mut self, url: Url) -> Self {
        self.functions_url = with_trailing_slash(url);
        self
    }

    /// Expose the anon key for header construction.
    pub(crate) fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn get_url(key: &str) -> Result<Url, ConfigError> {
    let raw = get_required_env(key)?;
    parse_url(key, &raw)
}

/// Parse a base URL, forcing a trailing slash so `Url::join` appends
/// instead of replacing the last path segment.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(with_trailing_slash(url))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn default_functions_url(base: &Url) -> Result<Url, ConfigError> {
    base.join("functions/v1/").map_err(|e| {
        ConfigError::InvalidEnvVar("SUPABASE_FUNCTIONS_URL".to_string(), e.to_string())
    })
}

/// Reject an anon key that still holds a template value or is not shaped
/// like a JWT or a publishable key.
fn check_anon_key(key: &str) -> Result<(), String> {
    let lower = key.to_ascii_lowercase();
    if let Some(marker) = TEMPLATE_MARKERS.iter().find(|m| lower.contains(**m)) {
        return Err(format!("still the template value (contains '{marker}')"));
    }

    // The random part: the body of a publishable key, or a JWT's signature.
    let material = match key.strip_prefix(PUBLISHABLE_KEY_PREFIX) {
        Some(body) => body,
        None => {
            let segments: Vec<&str> = key.split('.').collect();
            let [_, _, signature] = segments.as_slice() else {
                return Err(
                    "expected a JWT (three dot-separated parts) or a publishable key".to_string(),
                );
            };
            if segments.iter().any(|s| s.is_empty() || !s.bytes().all(is_base64url)) {
                return Err("JWT parts must be non-empty base64url".to_string());
            }
            *signature
        }
    };

    let bits = bits_per_char(material);
    if bits < MIN_KEY_BITS_PER_CHAR {
        return Err(format!(
            "key material looks hand-typed ({bits:.2} bits/char, need >= {MIN_KEY_BITS_PER_CHAR:.1})"
        ));
    }
    Ok(())
}

const fn is_base64url(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Shannon entropy of `s` in bits per character.
fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}
