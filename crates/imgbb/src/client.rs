//! Upload to the ImgBB hosting API.
//!
//! [`ImgbbClient`] posts a base64-encoded PNG to the upload endpoint with
//! the API key (and optional expiration) in the query string, and returns
//! the hosted image URL.

use std::time::Duration;

use serde::Deserialize;

use crate::encode;

/// Public upload endpoint.
pub const UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

/// Shortest expiration the service accepts, in seconds.
pub const MIN_EXPIRATION_SECS: u32 = 60;
/// Longest expiration the service accepts (180 days), in seconds.
pub const MAX_EXPIRATION_SECS: u32 = 15_552_000;

/// HTTP request timeout for a single upload.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for upload failures.
#[derive(Debug, thiserror::Error)]
pub enum ImgbbError {
    /// No API key was supplied.
    #[error("API Key is required")]
    MissingApiKey,

    /// The request parameters are out of range.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The image could not be decoded or re-encoded as PNG.
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service rejected the upload.
    #[error("Error: {0}")]
    Upload(String),
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// One image to upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Encoded image bytes (PNG, JPEG or WebP).
    pub image: Vec<u8>,
    pub api_key: String,
    /// Seconds until the hosted image is deleted; `None` keeps it.
    pub expiration: Option<u32>,
}

impl UploadRequest {
    /// Check the request before any encoding or network work.
    pub fn validate(&self) -> Result<(), ImgbbError> {
        if self.api_key.trim().is_empty() {
            return Err(ImgbbError::MissingApiKey);
        }
        if let Some(secs) = self.expiration {
            if !(MIN_EXPIRATION_SECS..=MAX_EXPIRATION_SECS).contains(&secs) {
                return Err(ImgbbError::Validation(format!(
                    "Expiration must be between {MIN_EXPIRATION_SECS} and {MAX_EXPIRATION_SECS} seconds, got {secs}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: Option<String>,
}

/// Extract the hosted URL from an upload response body.
///
/// `{success: true, data: {url}}` yields the URL. Anything else is an
/// [`ImgbbError::Upload`] carrying the service's message, or
/// `"Unknown error"` when it gave none.
pub fn parse_upload_response(body: &str) -> Result<String, ImgbbError> {
    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|e| ImgbbError::Upload(format!("Unreadable upload response: {e}")))?;

    match response {
        UploadResponse {
            success: true,
            data: Some(data),
            ..
        } => Ok(data.url),
        UploadResponse { success: true, .. } => Err(ImgbbError::Upload(
            "Upload response is missing the image URL".to_string(),
        )),
        UploadResponse { error, .. } => Err(ImgbbError::Upload(
            error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string()),
        )),
    }
}

// ---------------------------------------------------------------------------
// ImgbbClient
// ---------------------------------------------------------------------------

/// Uploads images to ImgBB.
pub struct ImgbbClient {
    client: reqwest::Client,
    upload_url: String,
}

impl ImgbbClient {
    /// Create a client for the public endpoint.
    pub fn new() -> Result<Self, ImgbbError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, UPLOAD_URL.to_string()))
    }

    /// Create a client reusing an existing [`reqwest::Client`] and endpoint.
    pub fn with_client(client: reqwest::Client, upload_url: String) -> Self {
        Self { client, upload_url }
    }

    /// Upload one image and return its hosted URL.
    pub async fn upload(&self, request: &UploadRequest) -> Result<String, ImgbbError> {
        request.validate()?;

        let png = encode::to_png(&request.image)?;
        let payload = encode::to_base64(&png);

        let mut query: Vec<(&str, String)> = vec![("key", request.api_key.trim().to_string())];
        if let Some(secs) = request.expiration {
            query.push(("expiration", secs.to_string()));
        }

        tracing::debug!(
            png_bytes = png.len(),
            expiration = ?request.expiration,
            "Uploading image to ImgBB",
        );

        let response = self
            .client
            .post(&self.upload_url)
            .query(&query)
            .form(&[("image", payload)])
            .send()
            .await?;

        // Error responses still carry a JSON body with the reason.
        let status = response.status();
        let body = response.text().await?;
        let result = parse_upload_response(&body);

        match &result {
            Ok(url) => tracing::info!(%url, "Image uploaded"),
            Err(e) => tracing::warn!(status = status.as_u16(), error = %e, "Image upload rejected"),
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
