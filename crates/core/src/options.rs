//! Closed option sets accepted by the generation service.
//!
//! Each enum serializes to the exact wire string the service expects and
//! parses from the same string, so node inputs can be taken as plain text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Generate `as_str`, `Display`, `FromStr` and a list of valid values for a
/// wire-string enum.
macro_rules! wire_enum {
    ($name:ident, $label:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Every accepted wire value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        $label,
                        $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Aspect ratio
// ---------------------------------------------------------------------------

/// Output frame aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[default]
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "21:9")]
    Ultrawide21x9,
    #[serde(rename = "9:21")]
    Tall9x21,
}

wire_enum!(AspectRatio, "aspect ratio", {
    Portrait9x16 => "9:16",
    Portrait3x4 => "3:4",
    Square => "1:1",
    Landscape4x3 => "4:3",
    Landscape16x9 => "16:9",
    Ultrawide21x9 => "21:9",
    Tall9x21 => "9:21",
});

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// Video generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoModel {
    #[serde(rename = "ray-1-6")]
    Ray16,
    #[default]
    #[serde(rename = "ray-2")]
    Ray2,
    #[serde(rename = "ray-flash-2")]
    RayFlash2,
}

wire_enum!(VideoModel, "video model", {
    Ray16 => "ray-1-6",
    Ray2 => "ray-2",
    RayFlash2 => "ray-flash-2",
});

/// Image generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageModel {
    #[default]
    #[serde(rename = "photon-1")]
    Photon1,
    #[serde(rename = "photon-flash-1")]
    PhotonFlash1,
}

wire_enum!(ImageModel, "image model", {
    Photon1 => "photon-1",
    PhotonFlash1 => "photon-flash-1",
});

// ---------------------------------------------------------------------------
// Resolution / duration
// ---------------------------------------------------------------------------

/// Video output resolution. Also the target of an upscale request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "540p")]
    P540,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "4k")]
    K4,
}

wire_enum!(Resolution, "resolution", {
    P540 => "540p",
    P720 => "720p",
    P1080 => "1080p",
    K4 => "4k",
});

/// Clip length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoDuration {
    #[serde(rename = "5s")]
    Secs5,
    #[serde(rename = "9s")]
    Secs9,
}

wire_enum!(VideoDuration, "duration", {
    Secs5 => "5s",
    Secs9 => "9s",
});

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_parses_wire_strings() {
        assert_eq!("21:9".parse::<AspectRatio>().unwrap(), AspectRatio::Ultrawide21x9);
        assert_eq!(" 1:1 ".parse::<AspectRatio>().unwrap(), AspectRatio::Square);
    }

    #[test]
    fn aspect_ratio_rejects_unknown() {
        let err = "2:1".parse::<AspectRatio>().unwrap_err();
        assert!(err.to_string().contains("Invalid aspect ratio '2:1'"));
        assert!(err.to_string().contains("16:9"));
    }

    #[test]
    fn serde_matches_as_str() {
        for ratio in AspectRatio::ALL {
            let json = serde_json::to_value(ratio).unwrap();
            assert_eq!(json, ratio.as_str());
        }
        for model in VideoModel::ALL {
            assert_eq!(serde_json::to_value(model).unwrap(), model.as_str());
        }
        for res in Resolution::ALL {
            assert_eq!(serde_json::to_value(res).unwrap(), res.as_str());
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(AspectRatio::default().as_str(), "16:9");
        assert_eq!(VideoModel::default().as_str(), "ray-2");
        assert_eq!(ImageModel::default().as_str(), "photon-1");
    }

    #[test]
    fn model_and_duration_parse() {
        assert_eq!("ray-flash-2".parse::<VideoModel>().unwrap(), VideoModel::RayFlash2);
        assert_eq!("photon-flash-1".parse::<ImageModel>().unwrap(), ImageModel::PhotonFlash1);
        assert_eq!("9s".parse::<VideoDuration>().unwrap(), VideoDuration::Secs9);
        assert!("10s".parse::<VideoDuration>().is_err());
        assert_eq!("4k".parse::<Resolution>().unwrap(), Resolution::K4);
    }
}
