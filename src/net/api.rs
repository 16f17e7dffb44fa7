//! REST calls: login, signup and token validation.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures surface as [`ClientError::Http`]. Non-success statuses
//! become [`ClientError::Rejected`] carrying the server's `message` field
//! (`error` is accepted from older servers). Nothing here retries; the user
//! re-submits.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;

pub const LOGIN_PATH: &str = "/api/login";
pub const SIGNUP_PATH: &str = "/api/signup";
pub const VALIDATE_PATH: &str = "/api/validate";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default, alias = "access_token")]
    session: Option<String>,
}

/// Fields posted to `/api/signup`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub username: String,
    pub displayname: String,
    /// Date of birth as entered, e.g. `2000-01-31`.
    pub dob: String,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST /api/login`; returns the session token on success.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] for any status other than 200,
    /// [`ClientError::MissingField`] when the 200 body has no token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(rejection(status, response.json::<Value>().await.unwrap_or(Value::Null)));
        }

        let body: LoginResponse = response.json().await?;
        body.session
            .filter(|token| !token.is_empty())
            .ok_or(ClientError::MissingField("session"))
    }

    /// `POST /api/signup`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] for non-success statuses.
    pub async fn signup(&self, form: &SignupForm) -> Result<(), ClientError> {
        let response = self.http.post(self.url(SIGNUP_PATH)).json(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status, response.json::<Value>().await.unwrap_or(Value::Null)));
        }
        Ok(())
    }

    /// `POST /api/validate` with the token as a bearer credential.
    ///
    /// `Ok(false)` means the server rejected the token (401).
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] for statuses other than success and 401.
    pub async fn validate(&self, token: &str) -> Result<bool, ClientError> {
        let response = self.http.post(self.url(VALIDATE_PATH)).bearer_auth(token).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(rejection(status, response.json::<Value>().await.unwrap_or(Value::Null)));
        }
        Ok(true)
    }
}

fn rejection(status: StatusCode, body: Value) -> ClientError {
    let message = ["message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map_or_else(|| format!("HTTP {}", status.as_u16()), ToOwned::to_owned);
    ClientError::Rejected { status: status.as_u16(), message }
}
