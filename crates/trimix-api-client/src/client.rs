//! Backend HTTP client.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::response::RawResponse;

/// Header carrying the fixed caller identity on every request.
const USER_ID_HEADER: &str = "X-User-ID";

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the processing backend.
    pub base_url: String,
    /// Public base URL that relative clip paths resolve against.
    pub media_base_url: String,
    /// Caller identity attached to every request.
    pub user_id: String,
    /// Request timeout. Server-side operations run at video scale, so this
    /// is tens of minutes, not seconds.
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trimix-api.trimix.site".to_string(),
            media_base_url: "https://trimix-api.trimix.site".to_string(),
            user_id: "johndoe@example.com".to_string(),
            timeout: Duration::from_secs(2400), // 40 minutes
        }
    }
}

impl ApiClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("TRIMIX_API_URL").unwrap_or(defaults.base_url);
        Self {
            media_base_url: std::env::var("TRIMIX_MEDIA_URL").unwrap_or_else(|_| base_url.clone()),
            base_url,
            user_id: std::env::var("TRIMIX_USER_ID").unwrap_or(defaults.user_id),
            timeout: Duration::from_secs(
                std::env::var("TRIMIX_API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2400),
            ),
        }
    }
}

/// Client for the Trimix processing backend.
pub struct ApiClient {
    http: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new backend client.
    pub fn new(config: ApiClientConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&config.user_id)
                .map_err(|_| ApiError::InvalidUrl(format!("bad user id: {}", config.user_id)))?,
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(ApiClientConfig::from_env())
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "POST");

        let response = self.http.post(&url).json(body).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body and return the raw response (endpoints that answer
    /// with a file rather than JSON).
    pub async fn post_raw<B>(&self, path: &str, body: &B) -> ApiResult<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path);
        debug!(%url, "POST (binary mode)");

        let response = self.http.post(&url).json(body).send().await?;
        Self::raw_from(response).await
    }

    /// GET with optional query pairs and decode a JSON response.
    pub async fn get_json<R>(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "GET");

        let response = self.http.get(&url).query(query).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// GET in binary mode: the body is returned undecoded together with its
    /// content type, for endpoints that answer with either JSON or raw text.
    pub async fn get_raw(&self, path: &str) -> ApiResult<RawResponse> {
        let url = self.endpoint(path);
        debug!(%url, "GET (binary mode)");

        let response = self.http.get(&url).send().await?;
        Self::raw_from(response).await
    }

    /// Resolve a relative clip path against the public media base.
    pub fn resolve_media_url(&self, relative: &str) -> ApiResult<Url> {
        let base = Url::parse(&self.config.media_base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.config.media_base_url, e)))?;
        base.join(relative)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", relative, e)))
    }

    /// Fetch a full clip body from an absolute URL (share flow).
    pub async fn download(&self, url: &Url) -> ApiResult<Vec<u8>> {
        debug!(%url, "Downloading clip");

        let response = self.http.get(url.clone()).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn raw_from(response: reqwest::Response) -> ApiResult<RawResponse> {
        let response = Self::check_status(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        Ok(RawResponse::new(content_type, bytes))
    }

    /// Map non-2xx responses to a typed failure carrying the server's
    /// `detail` message when one is present.
    async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(String::from)))
            .unwrap_or_default();

        warn!(status = status.as_u16(), %detail, "Backend request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ApiClient {
        ApiClient::new(ApiClientConfig {
            base_url: server.uri(),
            media_base_url: server.uri(),
            user_id: "johndoe@example.com".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = ApiClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(2400));
        assert_eq!(config.base_url, config.media_base_url);
    }

    #[test]
    fn test_resolve_media_url() {
        let client = ApiClient::new(ApiClientConfig {
            media_base_url: "https://media.example.com".into(),
            ..Default::default()
        })
        .unwrap();
        let url = client.resolve_media_url("/clips/a.mp4").unwrap();
        assert_eq!(url.as_str(), "https://media.example.com/clips/a.mp4");
    }

    #[tokio::test]
    async fn test_identity_header_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/generate-videos/status/"))
            .and(header("X-User-ID", "johndoe@example.com"))
            .and(query_param("transcript_id", "combined"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "video_paths": [],
                "status": "not_started"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let resp: trimix_models::GeneratedVideosResponse = client
            .get_json("/generate-videos/status/", &[("transcript_id", "combined")])
            .await
            .unwrap();
        assert!(resp.video_paths.is_empty());
    }

    #[tokio::test]
    async fn test_detail_extracted_from_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos/"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({"detail": "Invalid source URL"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .post_json::<_, trimix_models::StartJobResponse>(
                "/videos/",
                &serde_json::json!({"source_url": "bad", "title": "t"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.detail(), Some("Invalid source URL"));
    }

    #[tokio::test]
    async fn test_get_raw_preserves_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transcription-status/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("hello world")
                    .insert_header("content-type", "text/plain; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let raw = client.get_raw("/transcription-status/").await.unwrap();
        assert!(raw.is_text());
        assert_eq!(raw.text(), "hello world");
    }
}
