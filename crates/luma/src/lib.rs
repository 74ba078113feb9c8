//! Luma Dream Machine REST client.
//!
//! Provides typed request/response messages, an HTTP API wrapper,
//! the generation status poller, and asset persistence for
//! completed generations.

pub mod api;
pub mod download;
pub mod error;
pub mod messages;
pub mod poller;
pub mod service;

pub use api::{LumaApi, LumaApiConfig};
pub use error::LumaError;
pub use poller::{wait_for_asset, wait_for_generation, GenerationSource};
pub use service::GenerationService;
