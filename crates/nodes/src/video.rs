//! Video generation nodes.
//!
//! Every node validates its inputs, submits one job, waits for it with the
//! video poll preset and, when `save` is set, writes the clip as `.mp4`
//! under the output directory.

use std::path::PathBuf;

use luma_api::download::persist_asset;
use luma_api::messages::{AudioRequest, VideoGenerationRequest};
use luma_api::{wait_for_asset, GenerationService};
use luma_core::error::CoreError;
use luma_core::keyframes::Keyframes;
use luma_core::options::{AspectRatio, Resolution, VideoDuration, VideoModel};
use luma_core::output_path::{AssetKind, DownloadTarget};
use serde::{Deserialize, Serialize};

use crate::context::NodeContext;
use crate::error::NodeResult;

// ---------------------------------------------------------------------------
// Shared parameters and output
// ---------------------------------------------------------------------------

fn default_save() -> bool {
    true
}

/// Whether and where to persist the produced asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaveOptions {
    #[serde(default = "default_save")]
    pub save: bool,
    /// Path-like name relative to the output directory. Empty uses the
    /// generation id; a trailing separator names a directory.
    #[serde(default)]
    pub filename: String,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            save: true,
            filename: String::new(),
        }
    }
}

impl SaveOptions {
    /// Parse the target up front so a bad name fails before submission.
    pub fn target(&self) -> NodeResult<Option<DownloadTarget>> {
        if !self.save {
            return Ok(None);
        }
        Ok(Some(DownloadTarget::parse(&self.filename)?))
    }
}

/// Result of every video node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoOutput {
    pub video_url: String,
    pub generation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(value: &str, message: &str) -> Result<String, CoreError> {
    non_empty(value).ok_or_else(|| CoreError::Validation(message.to_string()))
}

// ---------------------------------------------------------------------------
// Text to video
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextToVideoParams {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, rename = "loop")]
    pub loop_video: bool,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub model: Option<VideoModel>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub duration: Option<VideoDuration>,
    #[serde(flatten)]
    pub save: SaveOptions,
}

pub async fn text_to_video<S>(
    ctx: &NodeContext<S>,
    params: TextToVideoParams,
) -> NodeResult<VideoOutput>
where
    S: GenerationService,
{
    let prompt = required(&params.prompt, "Prompt is required")?;
    let target = params.save.target()?;
    let service = ctx.service()?;

    let request = VideoGenerationRequest {
        prompt: Some(prompt),
        model: params.model.unwrap_or_default(),
        aspect_ratio: Some(params.aspect_ratio),
        loop_video: params.loop_video,
        keyframes: Keyframes::default(),
        resolution: params.resolution,
        duration: params.duration,
    };
    submit(ctx, service, request, target).await
}

// ---------------------------------------------------------------------------
// Image to video
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageToVideoParams {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, rename = "loop")]
    pub loop_video: bool,
    #[serde(default)]
    pub init_image_url: String,
    #[serde(default)]
    pub final_image_url: String,
    #[serde(default)]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default)]
    pub model: Option<VideoModel>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub duration: Option<VideoDuration>,
    #[serde(flatten)]
    pub save: SaveOptions,
}

pub async fn image_to_video<S>(
    ctx: &NodeContext<S>,
    params: ImageToVideoParams,
) -> NodeResult<VideoOutput>
where
    S: GenerationService,
{
    let keyframes = Keyframes::for_image_to_video(
        Some(params.init_image_url.as_str()),
        Some(params.final_image_url.as_str()),
    )?;
    let target = params.save.target()?;
    let service = ctx.service()?;

    let request = VideoGenerationRequest {
        prompt: non_empty(&params.prompt),
        model: params.model.unwrap_or_default(),
        aspect_ratio: params.aspect_ratio,
        loop_video: params.loop_video,
        keyframes,
        resolution: params.resolution,
        duration: params.duration,
    };
    submit(ctx, service, request, target).await
}

// ---------------------------------------------------------------------------
// Interpolate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterpolateParams {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub generation_id_1: String,
    #[serde(default)]
    pub generation_id_2: String,
    #[serde(default)]
    pub model: Option<VideoModel>,
    #[serde(flatten)]
    pub save: SaveOptions,
}

/// Generate a clip that bridges two earlier generations.
pub async fn interpolate<S>(
    ctx: &NodeContext<S>,
    params: InterpolateParams,
) -> NodeResult<VideoOutput>
where
    S: GenerationService,
{
    let keyframes = Keyframes::for_interpolation(
        Some(params.generation_id_1.as_str()),
        Some(params.generation_id_2.as_str()),
    )?;
    let target = params.save.target()?;
    let service = ctx.service()?;

    let request = VideoGenerationRequest {
        prompt: non_empty(&params.prompt),
        model: params.model.unwrap_or_default(),
        keyframes,
        ..Default::default()
    };
    submit(ctx, service, request, target).await
}

// ---------------------------------------------------------------------------
// Extend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtendParams {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub init_image_url: String,
    #[serde(default)]
    pub final_image_url: String,
    #[serde(default)]
    pub init_generation_id: String,
    #[serde(default)]
    pub final_generation_id: String,
    #[serde(default)]
    pub model: Option<VideoModel>,
    #[serde(flatten)]
    pub save: SaveOptions,
}

/// Continue (or lead into) an earlier generation.
pub async fn extend<S>(ctx: &NodeContext<S>, params: ExtendParams) -> NodeResult<VideoOutput>
where
    S: GenerationService,
{
    let keyframes = Keyframes::for_extension(
        Some(params.init_image_url.as_str()),
        Some(params.final_image_url.as_str()),
        Some(params.init_generation_id.as_str()),
        Some(params.final_generation_id.as_str()),
    )?;
    let target = params.save.target()?;
    let service = ctx.service()?;

    let request = VideoGenerationRequest {
        prompt: non_empty(&params.prompt),
        model: params.model.unwrap_or_default(),
        keyframes,
        ..Default::default()
    };
    submit(ctx, service, request, target).await
}

// ---------------------------------------------------------------------------
// Upscale / audio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct UpscaleParams {
    #[serde(default)]
    pub generation_id: String,
    pub resolution: Resolution,
    #[serde(flatten)]
    pub save: SaveOptions,
}

pub async fn upscale<S>(ctx: &NodeContext<S>, params: UpscaleParams) -> NodeResult<VideoOutput>
where
    S: GenerationService,
{
    let generation_id = required(&params.generation_id, "Generation ID is required")?;
    let target = params.save.target()?;
    let service = ctx.service()?;

    let created = service
        .upscale_generation(&generation_id, params.resolution)
        .await?;
    tracing::info!(
        source_id = %generation_id,
        generation_id = %created.id,
        resolution = %params.resolution,
        "Upscale submitted",
    );
    complete(ctx, service, &created.id, target).await
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddAudioParams {
    #[serde(default)]
    pub generation_id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    #[serde(flatten)]
    pub save: SaveOptions,
}

pub async fn add_audio<S>(ctx: &NodeContext<S>, params: AddAudioParams) -> NodeResult<VideoOutput>
where
    S: GenerationService,
{
    let generation_id = required(&params.generation_id, "Generation ID is required")?;
    let prompt = required(&params.prompt, "Prompt is required")?;
    let target = params.save.target()?;
    let service = ctx.service()?;

    let request = AudioRequest::new(prompt, non_empty(&params.negative_prompt));
    let created = service.add_audio(&generation_id, &request).await?;
    tracing::info!(
        source_id = %generation_id,
        generation_id = %created.id,
        "Audio generation submitted",
    );
    complete(ctx, service, &created.id, target).await
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewVideoParams {
    #[serde(default)]
    pub video_url: String,
}

/// UI marker for the host; carries no data outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewOutput {
    pub video_url: String,
}

pub fn preview_video(params: PreviewVideoParams) -> PreviewOutput {
    PreviewOutput {
        video_url: params.video_url,
    }
}

// ---------------------------------------------------------------------------
// Submission and completion
// ---------------------------------------------------------------------------

async fn submit<S>(
    ctx: &NodeContext<S>,
    service: &S,
    request: VideoGenerationRequest,
    target: Option<DownloadTarget>,
) -> NodeResult<VideoOutput>
where
    S: GenerationService,
{
    let created = service.create_generation(&request).await?;
    tracing::info!(
        generation_id = %created.id,
        model = %request.model,
        "Video generation submitted",
    );
    complete(ctx, service, &created.id, target).await
}

async fn complete<S>(
    ctx: &NodeContext<S>,
    service: &S,
    generation_id: &str,
    target: Option<DownloadTarget>,
) -> NodeResult<VideoOutput>
where
    S: GenerationService,
{
    let (generation, video_url) = wait_for_asset(
        service,
        generation_id,
        AssetKind::Video,
        ctx.video_poll(),
        Some(ctx.cancel_token()),
    )
    .await?;

    let saved_to = match target {
        Some(target) => Some(
            persist_asset(
                service,
                &video_url,
                &target,
                ctx.output_dir(),
                &generation.id,
                AssetKind::Video,
            )
            .await?,
        ),
        None => None,
    };

    Ok(VideoOutput {
        video_url,
        generation_id: generation.id,
        saved_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_defaults_to_true() {
        let params: TextToVideoParams = serde_json::from_str(r#"{"prompt":"a cat"}"#).unwrap();
        assert!(params.save.save);
        assert!(params.save.filename.is_empty());
        assert_eq!(params.aspect_ratio, AspectRatio::Landscape16x9);
    }

    #[test]
    fn disabled_save_has_no_target() {
        let opts = SaveOptions {
            save: false,
            filename: "../escape".into(),
        };
        assert!(opts.target().unwrap().is_none());
    }

    #[test]
    fn escaping_filename_fails_when_saving() {
        let opts = SaveOptions {
            save: true,
            filename: "../escape".into(),
        };
        assert!(opts.target().is_err());
    }

    #[test]
    fn loop_is_read_from_wire_name() {
        let params: ImageToVideoParams = serde_json::from_str(
            r#"{"loop":true,"init_image_url":"https://x/a.png","save":false}"#,
        )
        .unwrap();
        assert!(params.loop_video);
        assert!(!params.save.save);
    }

    #[test]
    fn preview_passes_url_through() {
        let out = preview_video(PreviewVideoParams {
            video_url: "https://x/v.mp4".into(),
        });
        assert_eq!(out.video_url, "https://x/v.mp4");
    }
}
