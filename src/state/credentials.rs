//! Session token storage.
//!
//! DESIGN
//! ======
//! The token lives in a cookie jar under the name `token` with path `/`.
//! Clearing never deletes in place: it rewrites the cookie empty with an
//! expiry at the Unix epoch and lets the jar's purge drop it, the same way a
//! browser handles `expires=Thu, 01 Jan 1970`. Expired or empty cookies read
//! as absent, which is the normal state for a visitor who never logged in.
//!
//! On disk the jar is a JSON object holding each cookie in `Set-Cookie` form,
//! so path and expiry survive a round trip through [`Cookie::parse`].

#[cfg(test)]
#[path = "credentials_test.rs"]
mod credentials_test;

use std::io::Write;
use std::path::{Path, PathBuf};

use cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::ClientError;

pub const TOKEN_COOKIE: &str = "token";
pub const COOKIE_PATH: &str = "/";

/// Storage for the session token.
pub trait CredentialStore {
    /// The stored token, or `None` when absent or expired.
    ///
    /// # Errors
    ///
    /// Backing storage failures.
    fn get(&self) -> Result<Option<String>, ClientError>;

    /// # Errors
    ///
    /// Backing storage failures.
    fn set(&mut self, token: &str) -> Result<(), ClientError>;

    /// Expire the token immediately.
    ///
    /// # Errors
    ///
    /// Backing storage failures.
    fn clear(&mut self) -> Result<(), ClientError>;
}

/// The `token` cookie as the login flow writes it.
#[must_use]
pub fn token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token.to_owned())).path(COOKIE_PATH).build()
}

/// The cookie `clear` writes over `name`: empty, already expired.
#[must_use]
pub fn expired_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), ""))
        .path(COOKIE_PATH)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

#[must_use]
pub fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.expires_datetime().is_some_and(|at| at <= now)
        || cookie.max_age().is_some_and(|age| age <= time::Duration::ZERO)
}

/// Value of a live, non-empty cookie on path `/`.
#[must_use]
pub fn live_value(jar: &CookieJar, name: &str, now: OffsetDateTime) -> Option<String> {
    jar.get(name)
        .filter(|c| c.path() == Some(COOKIE_PATH) && !is_expired(c, now))
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn purge_expired(jar: &mut CookieJar, now: OffsetDateTime) {
    let expired: Vec<String> = jar
        .iter()
        .filter(|c| is_expired(c, now))
        .map(|c| c.name().to_owned())
        .collect();
    for name in expired {
        jar.remove(Cookie::new(name, ""));
    }
}

/// Overwrite `name` with an expired cookie, then purge.
pub fn expire(jar: &mut CookieJar, name: &str, now: OffsetDateTime) {
    jar.add(expired_cookie(name));
    purge_expired(jar, now);
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Jar that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    jar: CookieJar,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<String>, ClientError> {
        Ok(live_value(&self.jar, TOKEN_COOKIE, OffsetDateTime::now_utc()))
    }

    fn set(&mut self, token: &str) -> Result<(), ClientError> {
        self.jar.add(token_cookie(token));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        expire(&mut self.jar, TOKEN_COOKIE, OffsetDateTime::now_utc());
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct JarFile {
    #[serde(default)]
    cookies: Vec<String>,
}

/// JSON cookie jar on disk. Every call re-reads the file so two processes
/// sharing it observe each other's logins and logouts.
#[derive(Debug, Clone)]
pub struct CookieFileStore {
    path: PathBuf,
}

impl CookieFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CookieJar, ClientError> {
        let mut jar = CookieJar::new();
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(jar),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(jar);
        }
        let file: JarFile = serde_json::from_str(&raw)?;
        for line in file.cookies {
            jar.add(Cookie::parse(line)?);
        }
        Ok(jar)
    }

    fn save(&self, jar: &CookieJar) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = JarFile { cookies: jar.iter().map(ToString::to_string).collect() };
        let rendered = serde_json::to_string_pretty(&file)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut out = options.open(&self.path)?;
        out.write_all(rendered.as_bytes())?;
        debug!(path = %self.path.display(), cookies = file.cookies.len(), "cookie jar saved");
        Ok(())
    }
}

impl CredentialStore for CookieFileStore {
    fn get(&self) -> Result<Option<String>, ClientError> {
        Ok(live_value(&self.load()?, TOKEN_COOKIE, OffsetDateTime::now_utc()))
    }

    fn set(&mut self, token: &str) -> Result<(), ClientError> {
        let mut jar = self.load()?;
        purge_expired(&mut jar, OffsetDateTime::now_utc());
        jar.add(token_cookie(token));
        self.save(&jar)
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        let mut jar = self.load()?;
        expire(&mut jar, TOKEN_COOKIE, OffsetDateTime::now_utc());
        self.save(&jar)
    }
}
