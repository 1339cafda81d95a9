//! Binary-mode response handling.
//!
//! The transcription endpoint answers with either a JSON pending envelope or
//! a raw text payload, distinguished only by content type. `RawResponse`
//! carries the body undecoded so the caller can branch on the header first.

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

/// An undecoded response body plus its content type.
#[derive(Debug, Clone)]
pub struct RawResponse {
    content_type: String,
    bytes: Vec<u8>,
}

impl RawResponse {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn is_json(&self) -> bool {
        self.content_type.contains("application/json")
    }

    pub fn is_text(&self) -> bool {
        self.content_type.contains("text/plain")
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the raw body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decode the body as UTF-8 text (lossy; transcripts are plain text).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.bytes).map_err(ApiError::Json)
    }
}
