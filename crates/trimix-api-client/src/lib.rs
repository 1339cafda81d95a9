//! HTTP client for the Trimix processing backend.
//!
//! This crate is the single point of outbound REST communication. It wraps
//! every request with the configured base address, the fixed caller-identity
//! header, and timeouts sized for video-scale server operations. Endpoints
//! that may answer with either JSON or a raw file go through the binary
//! response mode.

pub mod client;
pub mod error;
pub mod response;

pub use client::{ApiClient, ApiClientConfig};
pub use error::{ApiError, ApiResult};
pub use response::RawResponse;
