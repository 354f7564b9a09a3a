//! Authenticated API session
//!
//! One `reqwest::Client` is built per suite run with the bearer token in its
//! default headers, reused by every step, and released by [`Session::close`].

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, info};

use crate::common::{Error, Result, Settings};

use super::auth::authenticate;
use super::types::{ApiReply, ApiRequest, Credentials};

/// Authenticated client bound to one base URL
pub struct Session {
    settings: Settings,
    client: reqwest::Client,
    requests_sent: usize,
}

impl Session {
    /// Authenticate and build the client used for the rest of the suite
    ///
    /// Fails only with `Error::Authentication` or `Error::ClientBuild`.
    pub async fn open(settings: &Settings) -> Result<Self> {
        let auth_client = build_client(settings, HeaderMap::new())?;
        let credentials = Credentials {
            email: settings.email.clone(),
            password: settings.password.clone(),
        };
        let token = authenticate(&auth_client, settings, &credentials).await?;
        Self::with_token(settings, &token)
    }

    /// Build a session from an already issued token
    pub fn with_token(settings: &Settings, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::Authentication("accessToken contains invalid header characters".to_string())
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        Ok(Self {
            settings: settings.clone(),
            client: build_client(settings, headers)?,
            requests_sent: 0,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    /// Send one request; no retries
    ///
    /// Non-2xx statuses are not errors here: negative-path steps assert on them.
    pub async fn execute(&mut self, request: &ApiRequest) -> Result<ApiReply> {
        let url = self.settings.endpoint(&request.path);
        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        self.requests_sent += 1;
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(
            method = %request.method,
            path = %request.path,
            status,
            bytes = body.len(),
            "HTTP exchange"
        );

        Ok(ApiReply { status, body })
    }

    /// Release the client; consumes the session and returns the number of
    /// requests it sent
    pub fn close(self) -> usize {
        info!(
            base_url = %self.settings.base_url,
            requests = self.requests_sent,
            "Session closed"
        );
        drop(self.client);
        self.requests_sent
    }
}

fn build_client(settings: &Settings, headers: HeaderMap) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(settings.user_agent.clone())
        .default_headers(headers);
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(Error::ClientBuild)
}
