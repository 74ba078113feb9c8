//! Keyframe anchors for video generation requests.
//!
//! A generation may be anchored at its start (`frame0`) and/or end
//! (`frame1`) by either an external image or the output of a prior
//! generation. The builders here encode the input rules of each video
//! node and reject contradictory combinations before anything is sent.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single keyframe anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Keyframe {
    /// An externally hosted image.
    Image { url: String },
    /// The output of an earlier generation.
    Generation { id: String },
}

/// The start and end anchors of a video generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame0: Option<Keyframe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame1: Option<Keyframe>,
}

/// Treat empty and whitespace-only inputs as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn image(url: &str) -> Keyframe {
    Keyframe::Image {
        url: url.to_string(),
    }
}

fn generation(id: &str) -> Keyframe {
    Keyframe::Generation { id: id.to_string() }
}

impl Keyframes {
    /// `true` when neither anchor is set.
    pub fn is_empty(&self) -> bool {
        self.frame0.is_none() && self.frame1.is_none()
    }

    /// Anchors for image-to-video: at least one image URL is required.
    pub fn for_image_to_video(
        init_image_url: Option<&str>,
        final_image_url: Option<&str>,
    ) -> Result<Self, CoreError> {
        let init = present(init_image_url);
        let fin = present(final_image_url);

        if init.is_none() && fin.is_none() {
            return Err(CoreError::Validation(
                "At least one image URL is required".to_string(),
            ));
        }

        Ok(Self {
            frame0: init.map(image),
            frame1: fin.map(image),
        })
    }

    /// Anchors for interpolating between two prior generations.
    pub fn for_interpolation(
        generation_id_1: Option<&str>,
        generation_id_2: Option<&str>,
    ) -> Result<Self, CoreError> {
        match (present(generation_id_1), present(generation_id_2)) {
            (Some(first), Some(second)) => Ok(Self {
                frame0: Some(generation(first)),
                frame1: Some(generation(second)),
            }),
            _ => Err(CoreError::Validation(
                "Both generation IDs are required".to_string(),
            )),
        }
    }

    /// Anchors for extending a prior generation.
    ///
    /// At least one generation id is required, and each slot accepts an
    /// image or a generation but never both.
    pub fn for_extension(
        init_image_url: Option<&str>,
        final_image_url: Option<&str>,
        init_generation_id: Option<&str>,
        final_generation_id: Option<&str>,
    ) -> Result<Self, CoreError> {
        let init_image = present(init_image_url);
        let final_image = present(final_image_url);
        let init_gen = present(init_generation_id);
        let final_gen = present(final_generation_id);

        if init_gen.is_none() && final_gen.is_none() {
            return Err(CoreError::Validation(
                "You must provide at least one generation id".to_string(),
            ));
        }
        if init_image.is_some() && init_gen.is_some() {
            return Err(CoreError::Validation(
                "You cannot provide both an init image and an init generation".to_string(),
            ));
        }
        if final_image.is_some() && final_gen.is_some() {
            return Err(CoreError::Validation(
                "You cannot provide both a final image and a final generation".to_string(),
            ));
        }

        Ok(Self {
            frame0: init_gen.map(generation).or(init_image.map(image)),
            frame1: final_gen.map(generation).or(final_image.map(image)),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn keyframe_wire_format() {
        let frames = Keyframes {
            frame0: Some(image("https://x/a.png")),
            frame1: Some(generation("gen-1")),
        };
        let json = serde_json::to_value(&frames).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "frame0": {"type": "image", "url": "https://x/a.png"},
                "frame1": {"type": "generation", "id": "gen-1"},
            })
        );
    }

    #[test]
    fn absent_frames_are_omitted() {
        let frames = Keyframes {
            frame0: None,
            frame1: Some(image("https://x/b.png")),
        };
        let json = serde_json::to_value(&frames).unwrap();
        assert!(json.get("frame0").is_none());
    }

    // -- image to video ------------------------------------------------------

    #[test]
    fn image_to_video_requires_an_image() {
        let err = Keyframes::for_image_to_video(None, Some("  ")).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("At least one image URL"));
    }

    #[test]
    fn image_to_video_final_only() {
        let frames = Keyframes::for_image_to_video(Some(""), Some("https://x/end.png")).unwrap();
        assert!(frames.frame0.is_none());
        assert_eq!(frames.frame1, Some(image("https://x/end.png")));
    }

    // -- interpolation -------------------------------------------------------

    #[test]
    fn interpolation_needs_both_ids() {
        assert!(Keyframes::for_interpolation(Some("a"), None).is_err());
        assert!(Keyframes::for_interpolation(Some(""), Some("b")).is_err());

        let frames = Keyframes::for_interpolation(Some("a"), Some("b")).unwrap();
        assert_eq!(frames.frame0, Some(generation("a")));
        assert_eq!(frames.frame1, Some(generation("b")));
    }

    // -- extension -----------------------------------------------------------

    #[test]
    fn extension_requires_a_generation() {
        let err = Keyframes::for_extension(Some("https://x/a.png"), None, None, None).unwrap_err();
        assert!(err.to_string().contains("at least one generation id"));
    }

    #[test]
    fn extension_rejects_image_and_generation_in_same_slot() {
        let err = Keyframes::for_extension(Some("https://x/a.png"), None, Some("gen-1"), None)
            .unwrap_err();
        assert!(err.to_string().contains("init image"));

        let err = Keyframes::for_extension(None, Some("https://x/b.png"), None, Some("gen-2"))
            .unwrap_err();
        assert!(err.to_string().contains("final image"));
    }

    #[test]
    fn extension_mixes_image_and_generation_across_slots() {
        let frames =
            Keyframes::for_extension(Some("https://x/a.png"), None, None, Some("gen-2")).unwrap();
        assert_eq!(frames.frame0, Some(image("https://x/a.png")));
        assert_eq!(frames.frame1, Some(generation("gen-2")));
    }
}
