//! Shared state handed to every node invocation.

use std::path::Path;

use luma_api::{LumaApi, LumaApiConfig};
use luma_core::polling::PollConfig;
use luma_imgbb::ImgbbClient;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::error::{NodeError, NodeResult};

/// Everything a node needs besides its own parameters.
///
/// `S` is the generation service; production code uses [`LumaApi`].
/// The service is optional so nodes that never talk to Luma (references,
/// uploads) still run without a key; the ones that do fail with
/// [`NodeError::MissingApiKey`] before any request is sent.
pub struct NodeContext<S = LumaApi> {
    pub settings: Settings,
    service: Option<S>,
    imgbb: ImgbbClient,
    cancel: CancellationToken,
}

impl<S> NodeContext<S> {
    pub fn new(settings: Settings, service: Option<S>, imgbb: ImgbbClient) -> Self {
        Self {
            settings,
            service,
            imgbb,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token, e.g. with one wired to Ctrl-C.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The generation service, or [`NodeError::MissingApiKey`].
    pub fn service(&self) -> NodeResult<&S> {
        self.service.as_ref().ok_or(NodeError::MissingApiKey)
    }

    pub fn imgbb(&self) -> &ImgbbClient {
        &self.imgbb
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }

    pub fn video_poll(&self) -> &PollConfig {
        &self.settings.video_poll
    }

    pub fn image_poll(&self) -> &PollConfig {
        &self.settings.image_poll
    }
}

impl NodeContext<LumaApi> {
    /// Build the production context.
    ///
    /// A Luma client is created when a key is available from `api_key`,
    /// the config file or the environment.
    pub fn from_settings(settings: Settings, api_key: &str) -> NodeResult<Self> {
        let service = match settings.resolve_api_key(api_key) {
            Ok(key) => Some(connect(&settings, key)?),
            Err(NodeError::MissingApiKey) => {
                tracing::warn!("No Luma API key configured; generation nodes will fail");
                None
            }
            Err(e) => return Err(e),
        };
        let imgbb = ImgbbClient::new()?;
        Ok(Self::new(settings, service, imgbb))
    }
}

// ---------------------------------------------------------------------------
// Client node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientParams {
    /// Explicit key; empty falls back to the config file, then environment.
    #[serde(default)]
    pub api_key: String,
}

/// What the client node reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientOutput {
    pub base_url: String,
}

/// Construct a Luma client from an explicit key or configuration.
pub fn create_client(settings: &Settings, params: &ClientParams) -> NodeResult<LumaApi> {
    let key = settings.resolve_api_key(&params.api_key)?;
    let api = connect(settings, key)?;
    tracing::info!(base_url = api.base_url(), "Luma client ready");
    Ok(api)
}

fn connect(settings: &Settings, api_key: String) -> NodeResult<LumaApi> {
    Ok(LumaApi::new(LumaApiConfig {
        api_key,
        base_url: settings.base_url.clone(),
        request_timeout: settings.request_timeout,
    })?)
}
