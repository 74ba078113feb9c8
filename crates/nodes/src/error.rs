use std::path::PathBuf;

use luma_api::LumaError;
use luma_core::error::CoreError;
use luma_imgbb::ImgbbError;

/// Error type for node invocations.
///
/// Wraps the errors of each layer and adds the node-level variants.
/// Any error aborts the whole invocation; no partial outputs are returned.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// No Luma API key in the node input, config file or environment.
    #[error("API Key is required")]
    MissingApiKey,

    /// A domain-level validation error from `luma_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A generation service error, including remote job failures.
    #[error(transparent)]
    Luma(#[from] LumaError),

    /// An image hosting error.
    #[error(transparent)]
    Imgbb(#[from] ImgbbError),

    /// A generated image could not be decoded.
    #[error("Image decoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// A local input file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file or an environment value is malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A node request document could not be decoded.
    #[error("Invalid node request: {0}")]
    Request(#[from] serde_json::Error),
}

/// Convenience type alias for node return values.
pub type NodeResult<T> = Result<T, NodeError>;

impl NodeError {
    /// Stable machine-readable code for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            NodeError::MissingApiKey => "MISSING_API_KEY",
            NodeError::Core(_) | NodeError::Request(_) => "VALIDATION_ERROR",
            NodeError::Luma(luma) => match luma {
                LumaError::MissingApiKey => "MISSING_API_KEY",
                LumaError::GenerationFailed { .. } => "GENERATION_FAILED",
                LumaError::TimedOut { .. } => "TIMED_OUT",
                LumaError::Cancelled { .. } => "CANCELLED",
                LumaError::MissingAsset { .. } => "MISSING_ASSET",
                LumaError::Core(_) => "VALIDATION_ERROR",
                LumaError::Request(_) | LumaError::Api { .. } => "SERVICE_ERROR",
                LumaError::Write { .. } => "IO_ERROR",
            },
            NodeError::Imgbb(imgbb) => match imgbb {
                ImgbbError::MissingApiKey => "MISSING_API_KEY",
                ImgbbError::Validation(_) | ImgbbError::Image(_) => "VALIDATION_ERROR",
                ImgbbError::Request(_) | ImgbbError::Upload(_) => "UPLOAD_FAILED",
            },
            NodeError::Image(_) => "INVALID_IMAGE",
            NodeError::Read { .. } => "IO_ERROR",
            NodeError::Config(_) => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_by_class() {
        assert_eq!(NodeError::MissingApiKey.code(), "MISSING_API_KEY");
        assert_eq!(
            NodeError::from(CoreError::Validation("x".into())).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            NodeError::from(LumaError::GenerationFailed {
                id: "g".into(),
                reason: "r".into()
            })
            .code(),
            "GENERATION_FAILED"
        );
        assert_eq!(
            NodeError::from(ImgbbError::Upload("invalid api key".into())).code(),
            "UPLOAD_FAILED"
        );
    }

    #[test]
    fn wrapped_messages_pass_through() {
        let err = NodeError::from(LumaError::GenerationFailed {
            id: "g".into(),
            reason: "NSFW content detected".into(),
        });
        assert_eq!(err.to_string(), "Generation failed: NSFW content detected");
    }
}
