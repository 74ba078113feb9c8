//! Shared helpers for node integration tests.
//!
//! [`FakeService`] stands in for the Luma API: submissions are recorded
//! and answered with a pending record, status queries replay a script,
//! and asset downloads are served from an in-memory map.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use luma_api::messages::{
    Assets, AudioRequest, Generation, GenerationState, ImageGenerationRequest,
    VideoGenerationRequest,
};
use luma_api::{GenerationService, GenerationSource, LumaError};
use luma_core::options::Resolution;
use luma_core::polling::PollConfig;
use luma_imgbb::ImgbbClient;
use luma_nodes::{NodeContext, Settings};

/// One recorded call against the fake service.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateVideo(VideoGenerationRequest),
    CreateImage(ImageGenerationRequest),
    Upscale(String, Resolution),
    AddAudio(String, AudioRequest),
    Status(String),
    Fetch(String),
}

pub struct FakeService {
    id: String,
    script: Mutex<VecDeque<Generation>>,
    assets: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeService {
    /// Every submission returns a pending record with `id`; status queries
    /// pop `script` in order.
    pub fn new(id: &str, script: Vec<Generation>) -> Self {
        Self {
            id: id.to_string(),
            script: Mutex::new(script.into()),
            assets: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_asset(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.assets.insert(url.to_string(), bytes);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_queries(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Status(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GenerationSource for FakeService {
    async fn fetch_generation(&self, id: &str) -> Result<Generation, LumaError> {
        self.record(Call::Status(id.to_string()));
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| panic!("generation {id} queried after its script ended")))
    }
}

#[async_trait]
impl GenerationService for FakeService {
    async fn create_generation(
        &self,
        request: &VideoGenerationRequest,
    ) -> Result<Generation, LumaError> {
        self.record(Call::CreateVideo(request.clone()));
        Ok(pending(&self.id))
    }

    async fn create_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<Generation, LumaError> {
        self.record(Call::CreateImage(request.clone()));
        Ok(pending(&self.id))
    }

    async fn upscale_generation(
        &self,
        generation_id: &str,
        resolution: Resolution,
    ) -> Result<Generation, LumaError> {
        self.record(Call::Upscale(generation_id.to_string(), resolution));
        Ok(pending(&self.id))
    }

    async fn add_audio(
        &self,
        generation_id: &str,
        request: &AudioRequest,
    ) -> Result<Generation, LumaError> {
        self.record(Call::AddAudio(generation_id.to_string(), request.clone()));
        Ok(pending(&self.id))
    }

    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, LumaError> {
        self.record(Call::Fetch(url.to_string()));
        self.assets.get(url).cloned().ok_or_else(|| LumaError::Api {
            status: 404,
            body: format!("no asset at {url}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Generation records
// ---------------------------------------------------------------------------

pub fn pending(id: &str) -> Generation {
    Generation {
        id: id.to_string(),
        state: GenerationState::Pending,
        failure_reason: None,
        assets: None,
        generation_type: None,
        model: None,
        created_at: None,
    }
}

pub fn completed_video(id: &str, url: &str) -> Generation {
    Generation {
        state: GenerationState::Completed,
        assets: Some(Assets {
            video: Some(url.to_string()),
            image: None,
        }),
        ..pending(id)
    }
}

pub fn completed_image(id: &str, url: &str) -> Generation {
    Generation {
        state: GenerationState::Completed,
        assets: Some(Assets {
            video: None,
            image: Some(url.to_string()),
        }),
        ..pending(id)
    }
}

pub fn failed(id: &str, reason: &str) -> Generation {
    Generation {
        state: GenerationState::Failed,
        failure_reason: Some(reason.to_string()),
        ..pending(id)
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Settings with fixed, unbounded polling (3 s video, 1 s image) and the
/// given output root.
pub fn settings(output_dir: &Path) -> Settings {
    let mut settings = Settings::from_sources(&HashMap::new(), |_| None).unwrap();
    settings.output_dir = output_dir.to_path_buf();
    settings.video_poll = PollConfig::fixed(Duration::from_secs(3));
    settings.image_poll = PollConfig::fixed(Duration::from_secs(1));
    settings
}

fn offline_imgbb() -> ImgbbClient {
    ImgbbClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9".into())
}

pub fn context(service: FakeService, output_dir: &Path) -> NodeContext<FakeService> {
    NodeContext::new(settings(output_dir), Some(service), offline_imgbb())
}

pub fn context_without_service(output_dir: &Path) -> NodeContext<FakeService> {
    NodeContext::new(settings(output_dir), None, offline_imgbb())
}

/// A small encoded JPEG of the given size.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([10, 120, 200]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
    out.into_inner()
}
