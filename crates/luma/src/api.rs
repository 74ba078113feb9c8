//! REST API client for the Luma Dream Machine HTTP endpoints.
//!
//! Wraps generation submission (video, image, upscale, audio) and
//! status retrieval using [`reqwest`]. The client is configured
//! explicitly through [`LumaApiConfig`]; nothing is read from the
//! process environment here.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use luma_core::options::Resolution;

use crate::error::LumaError;
use crate::messages::{
    AudioRequest, Generation, ImageGenerationRequest, UpscaleRequest, VideoGenerationRequest,
};
use crate::poller::GenerationSource;

/// Public Dream Machine endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.lumalabs.ai/dream-machine/v1";

/// HTTP timeout for a single API request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`LumaApi`].
#[derive(Clone)]
pub struct LumaApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl LumaApiConfig {
    /// Settings for the public endpoint with the default timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl fmt::Debug for LumaApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LumaApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// HTTP client for the generation service.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct LumaApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for LumaApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LumaApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl LumaApi {
    /// Create a client from explicit settings.
    ///
    /// Fails with [`LumaError::MissingApiKey`] when the key is blank.
    pub fn new(config: LumaApiConfig) -> Result<Self, LumaError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Self::with_client(client, config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: LumaApiConfig) -> Result<Self, LumaError> {
        let api_key = config.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(LumaError::MissingApiKey);
        }
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a video generation.
    ///
    /// Sends `POST /generations`. The returned record is normally still
    /// pending; poll it with [`crate::poller::wait_for_generation`].
    pub async fn create_generation(
        &self,
        request: &VideoGenerationRequest,
    ) -> Result<Generation, LumaError> {
        let response = self
            .client
            .post(format!("{}/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let generation: Generation = parse_response(response).await?;
        tracing::info!(
            generation_id = %generation.id,
            model = %request.model,
            "Submitted video generation",
        );
        Ok(generation)
    }

    /// Submit an image generation or modification.
    ///
    /// Sends `POST /generations/image`.
    pub async fn create_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<Generation, LumaError> {
        let response = self
            .client
            .post(format!("{}/generations/image", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let generation: Generation = parse_response(response).await?;
        tracing::info!(
            generation_id = %generation.id,
            model = %request.model,
            "Submitted image generation",
        );
        Ok(generation)
    }

    /// Request a higher-resolution version of a completed video.
    ///
    /// Sends `POST /generations/{id}/upscale`.
    pub async fn upscale_generation(
        &self,
        generation_id: &str,
        resolution: Resolution,
    ) -> Result<Generation, LumaError> {
        let response = self
            .client
            .post(format!("{}/generations/{}/upscale", self.base_url, generation_id))
            .bearer_auth(&self.api_key)
            .json(&UpscaleRequest::new(resolution))
            .send()
            .await?;

        let generation: Generation = parse_response(response).await?;
        tracing::info!(
            source_generation_id = generation_id,
            generation_id = %generation.id,
            %resolution,
            "Submitted upscale",
        );
        Ok(generation)
    }

    /// Add a generated soundtrack to a completed video.
    ///
    /// Sends `POST /generations/{id}/audio`.
    pub async fn add_audio(
        &self,
        generation_id: &str,
        request: &AudioRequest,
    ) -> Result<Generation, LumaError> {
        let response = self
            .client
            .post(format!("{}/generations/{}/audio", self.base_url, generation_id))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let generation: Generation = parse_response(response).await?;
        tracing::info!(
            source_generation_id = generation_id,
            generation_id = %generation.id,
            "Submitted audio generation",
        );
        Ok(generation)
    }

    /// Retrieve the current record of a generation.
    ///
    /// Sends `GET /generations/{id}`.
    pub async fn get_generation(&self, generation_id: &str) -> Result<Generation, LumaError> {
        let response = self
            .client
            .get(format!("{}/generations/{}", self.base_url, generation_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Download an asset URL into memory.
    pub async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, LumaError> {
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl GenerationSource for LumaApi {
    async fn fetch_generation(&self, generation_id: &str) -> Result<Generation, LumaError> {
        self.get_generation(generation_id).await
    }
}

// ---- private helpers ----

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or a [`LumaError::Api`] containing the status and
/// body text on failure.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LumaError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(LumaError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, LumaError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
