//! ImgBB upload node.

use std::path::PathBuf;

use luma_imgbb::{ImgbbError, UploadRequest};
use serde::{Deserialize, Serialize};

use crate::context::NodeContext;
use crate::error::{NodeError, NodeResult};

fn default_expiration_time() -> u32 {
    luma_imgbb::client::MIN_EXPIRATION_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImgbbUploadParams {
    pub image_path: PathBuf,
    /// Explicit key; empty falls back to `IMGBB_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    /// Delete the hosted image after `expiration_time` seconds.
    #[serde(default)]
    pub expire: bool,
    #[serde(default = "default_expiration_time")]
    pub expiration_time: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutput {
    pub image_url: String,
}

/// Upload a local image file and return its public URL.
pub async fn imgbb_upload<S>(
    ctx: &NodeContext<S>,
    params: ImgbbUploadParams,
) -> NodeResult<UploadOutput> {
    let api_key = ctx
        .settings
        .resolve_imgbb_api_key(&params.api_key)
        .ok_or(ImgbbError::MissingApiKey)?;

    let mut request = UploadRequest {
        image: Vec::new(),
        api_key,
        expiration: params.expire.then_some(params.expiration_time),
    };
    request.validate()?;

    request.image = tokio::fs::read(&params.image_path)
        .await
        .map_err(|source| NodeError::Read {
            path: params.image_path.clone(),
            source,
        })?;

    let image_url = ctx.imgbb().upload(&request).await?;
    Ok(UploadOutput { image_url })
}
