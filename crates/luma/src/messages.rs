//! Luma REST request and response bodies.
//!
//! Responses are deserialized leniently: fields the service adds over
//! time are ignored, and optional fields default to `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use luma_core::keyframes::Keyframes;
use luma_core::options::{AspectRatio, ImageModel, Resolution, VideoDuration, VideoModel};
use luma_core::output_path::AssetKind;
use luma_core::references::{CharacterRef, ImageRef, ModifyImageRef, ReferenceList};

// ---------------------------------------------------------------------------
// Generation (response)
// ---------------------------------------------------------------------------

/// Lifecycle state of a generation.
///
/// The service reports `queued` and `dreaming` while work is outstanding;
/// both collapse into [`GenerationState::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    #[serde(alias = "queued", alias = "dreaming")]
    Pending,
    Completed,
    Failed,
}

/// What a generation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    Video,
    Image,
    UpscaleVideo,
    AddAudio,
    #[serde(other)]
    Other,
}

/// Output URLs of a completed generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A server-side generation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub id: String,
    pub state: GenerationState,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub assets: Option<Assets>,
    #[serde(default)]
    pub generation_type: Option<GenerationType>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Generation {
    /// URL of the produced asset of `kind`, if any.
    pub fn asset_url(&self, kind: AssetKind) -> Option<&str> {
        let assets = self.assets.as_ref()?;
        match kind {
            AssetKind::Video => assets.video.as_deref(),
            AssetKind::Image => assets.image.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /generations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoGenerationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub model: VideoModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(rename = "loop")]
    pub loop_video: bool,
    #[serde(skip_serializing_if = "Keyframes::is_empty")]
    pub keyframes: Keyframes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<VideoDuration>,
}

/// Body of `POST /generations/image`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model: ImageModel,
    pub aspect_ratio: AspectRatio,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ReferenceList>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "single_item_list"
    )]
    pub style_ref: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_ref: Option<CharacterRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modify_image_ref: Option<ModifyImageRef>,
}

/// The service takes `style_ref` as a list even though only one is used.
fn single_item_list<S: Serializer>(value: &Option<ImageRef>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(reference) => [reference].serialize(s),
        None => s.serialize_none(),
    }
}

/// Body of `POST /generations/{id}/upscale`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpscaleRequest {
    pub generation_type: GenerationType,
    pub resolution: Resolution,
}

impl UpscaleRequest {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            generation_type: GenerationType::UpscaleVideo,
            resolution,
        }
    }
}

/// Body of `POST /generations/{id}/audio`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioRequest {
    pub generation_type: GenerationType,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

impl AudioRequest {
    pub fn new(prompt: String, negative_prompt: Option<String>) -> Self {
        Self {
            generation_type: GenerationType::AddAudio,
            prompt,
            negative_prompt,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
