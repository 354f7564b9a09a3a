//! Response body decoding
//!
//! Bodies that are not JSON of the expected shape become `Error::Decode`
//! so the failure is attributed to the step that received them.

use serde::de::DeserializeOwned;

use crate::common::{Error, Result};

use super::types::ApiResponse;

/// Decode a single acknowledgement envelope
pub fn decode_response(body: &str) -> Result<ApiResponse> {
    decode(body, "API response")
}

/// Decode the array returned by the list endpoint
pub fn decode_response_list(body: &str) -> Result<Vec<ApiResponse>> {
    decode(body, "API response list")
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::decode(context, e.to_string(), body))
}
