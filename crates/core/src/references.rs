//! Weighted image references that steer image generation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Most image references a single request accepts.
pub const MAX_IMAGE_REFS: usize = 4;

/// Most images that may describe one character identity.
pub const MAX_CHARACTER_IMAGES: usize = 4;

/// Default weight for content and style references.
pub const DEFAULT_REF_WEIGHT: f64 = 0.85;

/// Default weight for the source image of a modify request.
pub const DEFAULT_MODIFY_WEIGHT: f64 = 1.0;

/// Ensure a reference weight lies in `[0.0, 1.0]`.
pub fn validate_weight(weight: f64) -> Result<(), CoreError> {
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Reference weight must be between 0.0 and 1.0, got {weight}"
        )))
    }
}

fn require_url(url: &str) -> Result<String, CoreError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Image URL must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Image references
// ---------------------------------------------------------------------------

/// Wire shape shared by [`ImageRef`] and [`ModifyImageRef`] before
/// validation.
#[derive(Deserialize)]
struct WeightedUrl {
    url: String,
    weight: f64,
}

/// An image URL with a steering weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightedUrl")]
pub struct ImageRef {
    pub url: String,
    pub weight: f64,
}

impl ImageRef {
    pub fn new(url: &str, weight: f64) -> Result<Self, CoreError> {
        validate_weight(weight)?;
        Ok(Self {
            url: require_url(url)?,
            weight,
        })
    }
}

impl TryFrom<WeightedUrl> for ImageRef {
    type Error = CoreError;

    fn try_from(raw: WeightedUrl) -> Result<Self, Self::Error> {
        Self::new(&raw.url, raw.weight)
    }
}

/// An ordered list of at most [`MAX_IMAGE_REFS`] image references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ImageRef>", into = "Vec<ImageRef>")]
pub struct ReferenceList(Vec<ImageRef>);

impl ReferenceList {
    /// A list holding exactly one reference.
    pub fn single(reference: ImageRef) -> Self {
        Self(vec![reference])
    }

    /// Concatenate lists in order, skipping `None` slots.
    pub fn concat<'a, I>(lists: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = Option<&'a ReferenceList>>,
    {
        let merged: Vec<ImageRef> = lists
            .into_iter()
            .flatten()
            .flat_map(|list| list.0.iter().cloned())
            .collect();
        Self::try_from(merged)
    }

    pub fn as_slice(&self) -> &[ImageRef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<ImageRef>> for ReferenceList {
    type Error = CoreError;

    fn try_from(refs: Vec<ImageRef>) -> Result<Self, Self::Error> {
        if refs.len() > MAX_IMAGE_REFS {
            return Err(CoreError::Validation(format!(
                "At most {MAX_IMAGE_REFS} image references are allowed, got {}",
                refs.len()
            )));
        }
        let refs = refs
            .iter()
            .map(|r| ImageRef::new(&r.url, r.weight))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(refs))
    }
}

impl From<ReferenceList> for Vec<ImageRef> {
    fn from(list: ReferenceList) -> Self {
        list.0
    }
}

// ---------------------------------------------------------------------------
// Character reference
// ---------------------------------------------------------------------------

/// Images of one character, sent as identity `identity0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CharacterImagesWire")]
pub struct CharacterRef {
    pub identity0: CharacterImages,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterImages {
    pub images: Vec<String>,
}

#[derive(Deserialize)]
struct CharacterImagesWire {
    identity0: CharacterImages,
}

impl TryFrom<CharacterImagesWire> for CharacterRef {
    type Error = CoreError;

    fn try_from(raw: CharacterImagesWire) -> Result<Self, Self::Error> {
        Self::from_urls(raw.identity0.images.iter().map(|u| Some(u.as_str())))
    }
}

impl CharacterRef {
    /// Build from up to [`MAX_CHARACTER_IMAGES`] URLs, skipping blanks.
    pub fn from_urls<'a, I>(urls: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let images: Vec<String> = urls
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();

        if images.is_empty() {
            return Err(CoreError::Validation(
                "A character reference needs at least one image URL".to_string(),
            ));
        }
        if images.len() > MAX_CHARACTER_IMAGES {
            return Err(CoreError::Validation(format!(
                "At most {MAX_CHARACTER_IMAGES} character images are allowed, got {}",
                images.len()
            )));
        }

        Ok(Self {
            identity0: CharacterImages { images },
        })
    }
}

// ---------------------------------------------------------------------------
// Modify reference
// ---------------------------------------------------------------------------

/// Source image of an image-modification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightedUrl")]
pub struct ModifyImageRef {
    pub url: String,
    pub weight: f64,
}

impl ModifyImageRef {
    pub fn new(url: &str, weight: f64) -> Result<Self, CoreError> {
        validate_weight(weight)?;
        Ok(Self {
            url: require_url(url)?,
            weight,
        })
    }
}

impl TryFrom<WeightedUrl> for ModifyImageRef {
    type Error = CoreError;

    fn try_from(raw: WeightedUrl) -> Result<Self, Self::Error> {
        Self::new(&raw.url, raw.weight)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
