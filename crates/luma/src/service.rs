//! The full set of remote operations the nodes depend on.
//!
//! [`LumaApi`] is the production implementation; tests substitute a
//! scripted one so node logic can be exercised without a network.

use async_trait::async_trait;

use luma_core::options::Resolution;

use crate::api::LumaApi;
use crate::error::LumaError;
use crate::messages::{AudioRequest, Generation, ImageGenerationRequest, VideoGenerationRequest};
use crate::poller::GenerationSource;

#[async_trait]
pub trait GenerationService: GenerationSource {
    async fn create_generation(
        &self,
        request: &VideoGenerationRequest,
    ) -> Result<Generation, LumaError>;

    async fn create_image(&self, request: &ImageGenerationRequest)
        -> Result<Generation, LumaError>;

    async fn upscale_generation(
        &self,
        generation_id: &str,
        resolution: Resolution,
    ) -> Result<Generation, LumaError>;

    async fn add_audio(
        &self,
        generation_id: &str,
        request: &AudioRequest,
    ) -> Result<Generation, LumaError>;

    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, LumaError>;
}

#[async_trait]
impl GenerationService for LumaApi {
    async fn create_generation(
        &self,
        request: &VideoGenerationRequest,
    ) -> Result<Generation, LumaError> {
        LumaApi::create_generation(self, request).await
    }

    async fn create_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<Generation, LumaError> {
        LumaApi::create_image(self, request).await
    }

    async fn upscale_generation(
        &self,
        generation_id: &str,
        resolution: Resolution,
    ) -> Result<Generation, LumaError> {
        LumaApi::upscale_generation(self, generation_id, resolution).await
    }

    async fn add_audio(
        &self,
        generation_id: &str,
        request: &AudioRequest,
    ) -> Result<Generation, LumaError> {
        LumaApi::add_audio(self, generation_id, request).await
    }

    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, LumaError> {
        LumaApi::fetch_asset(self, url).await
    }
}
