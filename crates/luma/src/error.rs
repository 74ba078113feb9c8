use std::path::PathBuf;
use std::time::Duration;

use luma_core::error::CoreError;
use luma_core::output_path::AssetKind;

/// Errors from the Luma client layer.
#[derive(Debug, thiserror::Error)]
pub enum LumaError {
    /// The HTTP request itself failed (network, DNS, TLS, decode, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Luma API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// No API key was configured for the client.
    #[error("API Key is required")]
    MissingApiKey,

    /// The service reported the generation as failed.
    #[error("Generation failed: {reason}")]
    GenerationFailed { id: String, reason: String },

    /// The generation did not reach a terminal state within the wait bound.
    #[error("Generation {id} did not finish within {waited:?}")]
    TimedOut { id: String, waited: Duration },

    /// Waiting was cancelled by the caller.
    #[error("Waiting for generation {id} was cancelled")]
    Cancelled { id: String },

    /// A completed generation carried no asset of the expected kind.
    #[error("Generation {id} completed without a {kind:?} asset")]
    MissingAsset { id: String, kind: AssetKind },

    /// Writing a downloaded asset failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl LumaError {
    /// Whether retrying the same request later could succeed.
    ///
    /// Transport failures, `429` and `5xx` responses qualify; malformed
    /// requests, undecodable bodies and other `4xx` responses do not.
    pub fn is_transient(&self) -> bool {
        match self {
            LumaError::Request(e) => !(e.is_builder() || e.is_decode()),
            LumaError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
