//! JSON-addressable node invocations.
//!
//! A request names its node in the `node` field; the remaining fields are
//! that node's parameters:
//!
//! ```json
//! { "node": "text_to_video", "prompt": "a cat", "aspect_ratio": "16:9" }
//! ```

use luma_api::GenerationService;
use serde::{Deserialize, Serialize};

use crate::context::{create_client, ClientOutput, ClientParams, NodeContext};
use crate::error::NodeResult;
use crate::image::{self, ImageGenerationParams, ModifyImageParams};
use crate::references::{
    self, CharacterReferenceParams, ConcatReferencesParams, ReferenceParams,
};
use crate::upload::{self, ImgbbUploadParams};
use crate::video::{
    self, AddAudioParams, ExtendParams, ImageToVideoParams, InterpolateParams,
    PreviewVideoParams, TextToVideoParams, UpscaleParams,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeRequest {
    Client(ClientParams),
    TextToVideo(TextToVideoParams),
    ImageToVideo(ImageToVideoParams),
    Interpolate(InterpolateParams),
    Extend(ExtendParams),
    Upscale(UpscaleParams),
    AddAudio(AddAudioParams),
    PreviewVideo(PreviewVideoParams),
    Reference(ReferenceParams),
    ConcatReferences(ConcatReferencesParams),
    CharacterReference(CharacterReferenceParams),
    ImageGeneration(ImageGenerationParams),
    ModifyImage(ModifyImageParams),
    ImgbbUpload(ImgbbUploadParams),
}

impl NodeRequest {
    /// Wire name of the node, as used in the `node` field.
    pub fn name(&self) -> &'static str {
        match self {
            NodeRequest::Client(_) => "client",
            NodeRequest::TextToVideo(_) => "text_to_video",
            NodeRequest::ImageToVideo(_) => "image_to_video",
            NodeRequest::Interpolate(_) => "interpolate",
            NodeRequest::Extend(_) => "extend",
            NodeRequest::Upscale(_) => "upscale",
            NodeRequest::AddAudio(_) => "add_audio",
            NodeRequest::PreviewVideo(_) => "preview_video",
            NodeRequest::Reference(_) => "reference",
            NodeRequest::ConcatReferences(_) => "concat_references",
            NodeRequest::CharacterReference(_) => "character_reference",
            NodeRequest::ImageGeneration(_) => "image_generation",
            NodeRequest::ModifyImage(_) => "modify_image",
            NodeRequest::ImgbbUpload(_) => "imgbb_upload",
        }
    }

    pub fn from_json(text: &str) -> NodeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Run one node and return its output as JSON.
pub async fn dispatch<S>(ctx: &NodeContext<S>, request: NodeRequest) -> NodeResult<serde_json::Value>
where
    S: GenerationService,
{
    let node = request.name();
    tracing::info!(node, "Running node");

    let output = match request {
        NodeRequest::Client(params) => {
            let api = create_client(&ctx.settings, &params)?;
            json(ClientOutput {
                base_url: api.base_url().to_string(),
            })
        }
        NodeRequest::TextToVideo(params) => json(video::text_to_video(ctx, params).await?),
        NodeRequest::ImageToVideo(params) => json(video::image_to_video(ctx, params).await?),
        NodeRequest::Interpolate(params) => json(video::interpolate(ctx, params).await?),
        NodeRequest::Extend(params) => json(video::extend(ctx, params).await?),
        NodeRequest::Upscale(params) => json(video::upscale(ctx, params).await?),
        NodeRequest::AddAudio(params) => json(video::add_audio(ctx, params).await?),
        NodeRequest::PreviewVideo(params) => json(video::preview_video(params)),
        NodeRequest::Reference(params) => json(references::reference(params)?),
        NodeRequest::ConcatReferences(params) => json(references::concat_references(params)?),
        NodeRequest::CharacterReference(params) => {
            json(references::character_reference(params)?)
        }
        NodeRequest::ImageGeneration(params) => json(image::image_generation(ctx, params).await?),
        NodeRequest::ModifyImage(params) => json(image::modify_image(ctx, params).await?),
        NodeRequest::ImgbbUpload(params) => json(upload::imgbb_upload(ctx, params).await?),
    }?;

    tracing::debug!(node, "Node finished");
    Ok(output)
}

fn json<T: Serialize>(value: T) -> NodeResult<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}
