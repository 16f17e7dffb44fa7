//! Client configuration.
//!
//! The binary builds a `ClientConfig` from clap arguments (each with an env
//! fallback); the library only ever sees the typed result. String-valued
//! options go through the `parse_*` helpers below so clap and tests share one
//! parser.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SOCKET_PATH: &str = "/socket";
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RECONNECT_DELAY_MAX_MS: u64 = 10_000;
pub const DEFAULT_RECONNECT_RANDOMIZATION: f64 = 0.5;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// How the session token is attached to the realtime connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    /// `?session=<token>` on the endpoint URL.
    Query,
    /// An `auth` event carrying `{ "token": <token> }` sent as the first frame.
    #[default]
    AuthObject,
}

/// How much of a message timestamp the renderer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampStyle {
    #[default]
    Full,
    /// Only the time-of-day part, e.g. `10:00:00` of `2024-01-01 10:00:00`.
    TimeOfDay,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of each delay applied as random jitter, in `0.0..=1.0`.
    pub randomization: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MAX_MS),
            randomization: DEFAULT_RECONNECT_RANDOMIZATION,
        }
    }
}

impl ReconnectPolicy {
    /// Default policy with its cap moved to `max_delay_ms`. The initial delay
    /// is lowered to the cap when the cap is smaller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for a zero cap, which would reconnect
    /// in a tight loop.
    pub fn capped_at(max_delay_ms: u64) -> Result<Self, ClientError> {
        if max_delay_ms == 0 {
            return Err(ClientError::Config("reconnect delay cap must be at least 1 ms".into()));
        }
        let max_delay = Duration::from_millis(max_delay_ms);
        let defaults = Self::default();
        Ok(Self { initial_delay: defaults.initial_delay.min(max_delay), max_delay, ..defaults })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// HTTP origin for `/api/login`, `/api/signup` and `/api/validate`.
    pub base_url: String,
    /// Websocket URL of the message server.
    pub endpoint: String,
    pub auth_field: AuthField,
    pub reconnect: ReconnectPolicy,
    pub timestamp_style: TimestampStyle,
    pub validate_on_start: bool,
    pub http_timeout: Duration,
    pub cookie_file: PathBuf,
}

impl ClientConfig {
    /// Config with every option at its default and the endpoint derived from
    /// `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] when `base_url` is not an
    /// `http://` or `https://` URL, and [`ClientError::Config`] when no
    /// cookie file location can be determined.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_cookie_file(base_url, default_cookie_file()?)
    }

    /// Same as [`ClientConfig::new`] with an explicit cookie jar location.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] when `base_url` is not an
    /// `http://` or `https://` URL.
    pub fn with_cookie_file(base_url: &str, cookie_file: PathBuf) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let endpoint = derive_endpoint(&base_url, None)?;
        Ok(Self {
            base_url,
            endpoint,
            auth_field: AuthField::default(),
            reconnect: ReconnectPolicy::default(),
            timestamp_style: TimestampStyle::default(),
            validate_on_start: false,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cookie_file,
        })
    }

    /// Absolute URL for an API path such as `/api/login`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Parse `query` or `auth-object` (also accepts `auth`).
///
/// # Errors
///
/// Returns [`ClientError::Config`] for any other value.
pub fn parse_auth_field(raw: &str) -> Result<AuthField, ClientError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "query" => Ok(AuthField::Query),
        "auth-object" | "auth_object" | "auth" => Ok(AuthField::AuthObject),
        other => Err(ClientError::Config(format!(
            "unknown auth field '{other}' (expected 'query' or 'auth-object')"
        ))),
    }
}

/// Parse `full` or `time`.
///
/// # Errors
///
/// Returns [`ClientError::Config`] for any other value.
pub fn parse_timestamp_style(raw: &str) -> Result<TimestampStyle, ClientError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "full" => Ok(TimestampStyle::Full),
        "time" | "time-of-day" => Ok(TimestampStyle::TimeOfDay),
        other => Err(ClientError::Config(format!(
            "unknown timestamp style '{other}' (expected 'full' or 'time')"
        ))),
    }
}

/// Log level for the stderr subscriber; anything unrecognised falls back to `warn`.
#[must_use]
pub fn parse_log_level(raw: Option<&str>) -> tracing::Level {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("error") => tracing::Level::ERROR,
        Some("info") => tracing::Level::INFO,
        Some("debug") => tracing::Level::DEBUG,
        Some("trace") => tracing::Level::TRACE,
        _ => tracing::Level::WARN,
    }
}

/// Websocket endpoint for an HTTP base URL: `http` becomes `ws`, `https`
/// becomes `wss`, the port is optionally replaced, and the socket path is
/// appended.
///
/// # Errors
///
/// Returns [`ClientError::InvalidBaseUrl`] for non-HTTP URLs.
pub fn derive_endpoint(base_url: &str, socket_port: Option<u16>) -> Result<String, ClientError> {
    let (scheme, rest) = if let Some(rest) = base_url.strip_prefix("http://") {
        ("ws", rest)
    } else if let Some(rest) = base_url.strip_prefix("https://") {
        ("wss", rest)
    } else {
        return Err(ClientError::InvalidBaseUrl(base_url.to_owned()));
    };

    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(ClientError::InvalidBaseUrl(base_url.to_owned()));
    }

    let authority = match socket_port {
        Some(port) => with_port(authority, port),
        None => authority.to_owned(),
    };
    Ok(format!("{scheme}://{authority}{DEFAULT_SOCKET_PATH}"))
}

fn with_port(authority: &str, port: u16) -> String {
    let host = match authority.rfind(':') {
        Some(idx) if !authority[idx..].contains(']') => &authority[..idx],
        _ => authority,
    };
    format!("{host}:{port}")
}

/// `chatline/cookies.json` under the platform config directory
/// (`$XDG_CONFIG_HOME` or `~/.config` on Linux).
///
/// # Errors
///
/// Returns [`ClientError::Config`] when the platform has no config directory.
pub fn default_cookie_file() -> Result<PathBuf, ClientError> {
    let base = dirs::config_dir()
        .ok_or_else(|| ClientError::Config("cannot locate a config directory; pass --cookie-file".into()))?;
    Ok(base.join("chatline").join("cookies.json"))
}
