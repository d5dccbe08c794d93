//! Redfish HTTP session
//!
//! Owns the HTTP client and whatever credentials the run authenticates
//! with. Suites borrow it through their context instead of keeping their
//! own token state.

use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::common::config::{AuthMode, Config};
use crate::common::{join_url, Error, Result};

use super::types::{SessionInfo, SessionRequest};
use super::SESSIONS;

/// Header carrying a Redfish session token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// How requests from this session are authenticated
#[derive(Debug, Clone)]
enum Credentials {
    Anonymous,
    Basic {
        username: String,
        password: String,
    },
    Token {
        token: String,
        /// Session resource to delete on logout
        location: Option<String>,
    },
}

/// HTTP session against one BMC
#[derive(Debug, Clone)]
pub struct RedfishSession {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    credentials: Credentials,
}

impl RedfishSession {
    /// Create a session using Basic credentials
    ///
    /// Certificate validation is disabled; BMCs under test usually serve
    /// self-signed certificates.
    pub fn new(base_url: &str, username: &str, password: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            credentials: Credentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
        })
    }

    /// Create a session from the target section of the config
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.base_url(),
            &config.target.username,
            &config.target.password,
            Duration::from_secs(config.target.request_timeout_secs),
        )
    }

    /// Same client, no credentials
    pub fn anonymous(&self) -> Self {
        Self {
            credentials: Credentials::Anonymous,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry a session token rather than Basic credentials
    pub fn has_token(&self) -> bool {
        matches!(self.credentials, Credentials::Token { .. })
    }

    /// Authenticate according to `mode`
    ///
    /// Basic mode needs no round trip. Session mode posts the credentials
    /// to `SessionService/Sessions` and keeps the returned token.
    pub async fn authenticate(&mut self, mode: AuthMode) -> Result<()> {
        match mode {
            AuthMode::Basic => Ok(()),
            AuthMode::Session => self.login().await,
        }
    }

    /// Create a Redfish session and switch to token authentication
    pub async fn login(&mut self) -> Result<()> {
        let url = join_url(&self.base_url, SESSIONS);
        let response = self
            .client
            .post(&url)
            .json(&SessionRequest {
                user_name: &self.username,
                password: &self.password,
            })
            .send()
            .await
            .map_err(|e| Error::http(SESSIONS, e))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(Error::SessionLogin(format!(
                "{} returned {}",
                SESSIONS,
                status.as_u16()
            )));
        }

        let token = response
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::SessionLogin(format!("no {} header", AUTH_TOKEN_HEADER)))?;

        let header_location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body: SessionInfo = response.json().await.unwrap_or_default();
        let location = header_location.or(body.odata_id).or_else(|| {
            body.id
                .map(|id| format!("{}/{}", SESSIONS.trim_end_matches('/'), id))
        });

        tracing::info!(session = location.as_deref().unwrap_or("?"), "Redfish session created");
        self.credentials = Credentials::Token { token, location };
        Ok(())
    }

    /// Delete the Redfish session, if one was created
    ///
    /// Falls back to Basic credentials afterwards.
    pub async fn logout(&mut self) -> Result<()> {
        let Credentials::Token { location, .. } = &self.credentials else {
            return Ok(());
        };

        if let Some(location) = location.clone() {
            // Location may be absolute
            let path = location
                .strip_prefix(&self.base_url)
                .unwrap_or(&location)
                .to_string();
            let response = self
                .request(reqwest::Method::DELETE, &path)
                .send()
                .await
                .map_err(|e| Error::http(&path, e))?;
            tracing::debug!(status = response.status().as_u16(), "Session deleted");
        }

        self.credentials = Credentials::Basic {
            username: self.username.clone(),
            password: self.password.clone(),
        };
        Ok(())
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, join_url(&self.base_url, path));
        match &self.credentials {
            Credentials::Anonymous => builder,
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
            Credentials::Token { token, .. } => match HeaderValue::from_str(token) {
                Ok(value) => builder.header(AUTH_TOKEN_HEADER, value),
                Err(_) => builder,
            },
        }
    }

    /// GET a path relative to the base URL
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.request(reqwest::Method::GET, path)
            .send()
            .await
            .map_err(|e| Error::http(path, e))
    }

    /// GET with a per-request timeout overriding the client default
    pub async fn get_with_timeout(&self, path: &str, timeout: Duration) -> Result<Response> {
        self.request(reqwest::Method::GET, path)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::http(path, e))
    }

    /// GET a path and return only the status code
    pub async fn status(&self, path: &str) -> Result<StatusCode> {
        Ok(self.get(path).await?.status())
    }

    /// GET a path expecting 200 and decode the body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path).await?;
        decode_json(path, response).await
    }
}

/// Decode a 200 response into a typed record
pub async fn decode_json<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::unexpected_status(path, status.as_u16()));
    }
    response.json::<T>().await.map_err(|e| Error::InvalidPayload {
        path: path.to_string(),
        message: e.to_string(),
    })
}
