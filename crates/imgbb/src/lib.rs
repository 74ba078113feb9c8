//! ImgBB image hosting upload client.
//!
//! Images are re-encoded as PNG and posted base64-encoded; the hosted
//! URL is returned so it can feed image-to-video keyframes or image
//! references.

pub mod client;
pub mod encode;

pub use client::{ImgbbClient, ImgbbError, UploadRequest};
