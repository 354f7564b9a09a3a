//! Token acquisition against `/User/Authentication`

use reqwest::StatusCode;
use tracing::{debug, info};

use crate::common::error::excerpt;
use crate::common::{Error, Result, Settings};

use super::types::{AuthResponse, Credentials};

pub const AUTH_PATH: &str = "/User/Authentication";

/// Exchange credentials for a bearer token
///
/// Any status other than 200, an unreadable body, or a missing or blank
/// `accessToken` is an `Error::Authentication`.
pub async fn authenticate(
    http: &reqwest::Client,
    settings: &Settings,
    credentials: &Credentials,
) -> Result<String> {
    let url = settings.endpoint(AUTH_PATH);
    debug!(%url, email = %credentials.email, "Requesting access token");

    let response = http
        .post(&url)
        .json(credentials)
        .send()
        .await
        .map_err(|e| Error::Authentication(format!("request to {url} failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Authentication(format!("failed to read response: {e}")))?;

    if status != StatusCode::OK {
        return Err(Error::Authentication(format!(
            "{} - {}",
            status,
            excerpt(&body)
        )));
    }

    let parsed: AuthResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Authentication(format!("unexpected response body: {e}")))?;

    match parsed.access_token {
        Some(token) if !token.trim().is_empty() => {
            info!(email = %credentials.email, "Authenticated");
            Ok(token)
        }
        _ => Err(Error::Authentication(
            "accessToken is missing or empty".to_string(),
        )),
    }
}
