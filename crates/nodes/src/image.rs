//! Image generation nodes.
//!
//! Unlike the video nodes, the produced image is always fetched: its bytes
//! feed the decoded dimensions in [`ImageOutput`], and are written as
//! `.jpg` only when `save` is set.

use std::path::PathBuf;

use luma_api::download::write_asset;
use luma_api::messages::ImageGenerationRequest;
use luma_api::{wait_for_asset, GenerationService};
use luma_core::error::CoreError;
use luma_core::options::{AspectRatio, ImageModel};
use luma_core::output_path::{AssetKind, DownloadTarget};
use luma_core::references::{
    CharacterRef, ImageRef, ModifyImageRef, ReferenceList, DEFAULT_MODIFY_WEIGHT,
};
use serde::{Deserialize, Serialize};

use crate::context::NodeContext;
use crate::error::NodeResult;
use crate::video::SaveOptions;

/// Result of every image node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOutput {
    pub image_url: String,
    pub generation_id: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Image generation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageGenerationParams {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub model: ImageModel,
    /// Output of a `reference` or `concat_references` node.
    #[serde(default)]
    pub image_refs: Option<ReferenceList>,
    /// Output of a `reference` node; only its single entry is used.
    #[serde(default)]
    pub style_ref: Option<ReferenceList>,
    #[serde(default)]
    pub character_ref: Option<CharacterRef>,
    #[serde(flatten)]
    pub save: SaveOptions,
}

pub async fn image_generation<S>(
    ctx: &NodeContext<S>,
    params: ImageGenerationParams,
) -> NodeResult<ImageOutput>
where
    S: GenerationService,
{
    let prompt = require_prompt(&params.prompt)?;
    let style_ref = params.style_ref.as_ref().map(single_style).transpose()?;
    let target = params.save.target()?;
    let service = ctx.service()?;

    let request = ImageGenerationRequest {
        prompt,
        model: params.model,
        aspect_ratio: params.aspect_ratio,
        image_ref: params.image_refs.filter(|refs| !refs.is_empty()),
        style_ref,
        character_ref: params.character_ref,
        modify_image_ref: None,
    };
    submit(ctx, service, request, target).await
}

fn single_style(list: &ReferenceList) -> Result<ImageRef, CoreError> {
    match list.as_slice() {
        [only] => Ok(only.clone()),
        [] => Err(CoreError::Validation(
            "Style reference is empty".to_string(),
        )),
        refs => Err(CoreError::Validation(format!(
            "Only one style reference is allowed, got {}",
            refs.len()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Modify image
// ---------------------------------------------------------------------------

fn default_modify_weight() -> f64 {
    DEFAULT_MODIFY_WEIGHT
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModifyImageParams {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_modify_weight")]
    pub weight: f64,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub model: ImageModel,
    #[serde(flatten)]
    pub save: SaveOptions,
}

/// Restyle an existing image according to the prompt.
pub async fn modify_image<S>(
    ctx: &NodeContext<S>,
    params: ModifyImageParams,
) -> NodeResult<ImageOutput>
where
    S: GenerationService,
{
    let prompt = require_prompt(&params.prompt)?;
    let source = ModifyImageRef::new(&params.image_url, params.weight)?;
    let target = params.save.target()?;
    let service = ctx.service()?;

    let request = ImageGenerationRequest {
        prompt,
        model: params.model,
        aspect_ratio: params.aspect_ratio,
        modify_image_ref: Some(source),
        ..Default::default()
    };
    submit(ctx, service, request, target).await
}

// ---------------------------------------------------------------------------
// Submission and completion
// ---------------------------------------------------------------------------

fn require_prompt(prompt: &str) -> Result<String, CoreError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(CoreError::Validation("Prompt is required".to_string()));
    }
    Ok(prompt.to_string())
}

async fn submit<S>(
    ctx: &NodeContext<S>,
    service: &S,
    request: ImageGenerationRequest,
    target: Option<DownloadTarget>,
) -> NodeResult<ImageOutput>
where
    S: GenerationService,
{
    let created = service.create_image(&request).await?;
    tracing::info!(
        generation_id = %created.id,
        model = %request.model,
        refs = request.image_ref.as_ref().map_or(0, ReferenceList::len),
        "Image generation submitted",
    );

    let (generation, image_url) = wait_for_asset(
        service,
        &created.id,
        AssetKind::Image,
        ctx.image_poll(),
        Some(ctx.cancel_token()),
    )
    .await?;

    let bytes = service.fetch_asset(&image_url).await?;
    let decoded = image::load_from_memory(&bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    tracing::debug!(generation_id = %generation.id, width, height, "Image decoded");

    let saved_to = match target {
        Some(target) => Some(
            write_asset(
                &bytes,
                &target,
                ctx.output_dir(),
                &generation.id,
                AssetKind::Image,
            )
            .await?,
        ),
        None => None,
    };

    Ok(ImageOutput {
        image_url,
        generation_id: generation.id,
        width,
        height,
        saved_to,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use luma_core::references::DEFAULT_REF_WEIGHT;

    use super::*;

    fn r(url: &str) -> ImageRef {
        ImageRef::new(url, DEFAULT_REF_WEIGHT).unwrap()
    }

    #[test]
    fn style_reference_must_hold_one_entry() {
        let one = ReferenceList::single(r("https://x/s.png"));
        assert_eq!(single_style(&one).unwrap().url, "https://x/s.png");

        let two = ReferenceList::try_from(vec![r("https://x/a.png"), r("https://x/b.png")]).unwrap();
        assert_matches!(single_style(&two), Err(CoreError::Validation(_)));
    }

    #[test]
    fn modify_weight_defaults_to_one() {
        let params: ModifyImageParams =
            serde_json::from_str(r#"{"prompt":"p","image_url":"https://x/a.png"}"#).unwrap();
        assert_eq!(params.weight, 1.0);
        assert_eq!(params.model, ImageModel::Photon1);
    }

    #[test]
    fn references_deserialize_from_node_output() {
        let params: ImageGenerationParams = serde_json::from_str(
            r#"{"prompt":"p","image_refs":[{"url":"https://x/a.png","weight":0.5}],"save":false}"#,
        )
        .unwrap();
        assert_eq!(params.image_refs.unwrap().len(), 1);
    }

    #[test]
    fn blank_prompt_is_rejected() {
        assert_matches!(require_prompt("   "), Err(CoreError::Validation(_)));
    }
}
