//! Reference-building nodes. These never contact the service.

use luma_core::references::{
    CharacterRef, ImageRef, ReferenceList, DEFAULT_REF_WEIGHT,
};
use serde::Deserialize;

use crate::error::NodeResult;

fn default_weight() -> f64 {
    DEFAULT_REF_WEIGHT
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceParams {
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// One weighted image reference, as a single-item list.
pub fn reference(params: ReferenceParams) -> NodeResult<ReferenceList> {
    let reference = ImageRef::new(&params.image_url, params.weight)?;
    Ok(ReferenceList::single(reference))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConcatReferencesParams {
    #[serde(default)]
    pub ref_1: Option<ReferenceList>,
    #[serde(default)]
    pub ref_2: Option<ReferenceList>,
    #[serde(default)]
    pub ref_3: Option<ReferenceList>,
    #[serde(default)]
    pub ref_4: Option<ReferenceList>,
}

/// Join up to four lists in slot order.
pub fn concat_references(params: ConcatReferencesParams) -> NodeResult<ReferenceList> {
    let merged = ReferenceList::concat([
        params.ref_1.as_ref(),
        params.ref_2.as_ref(),
        params.ref_3.as_ref(),
        params.ref_4.as_ref(),
    ])?;
    tracing::debug!(count = merged.len(), "References concatenated");
    Ok(merged)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterReferenceParams {
    #[serde(default)]
    pub image_url_1: Option<String>,
    #[serde(default)]
    pub image_url_2: Option<String>,
    #[serde(default)]
    pub image_url_3: Option<String>,
    #[serde(default)]
    pub image_url_4: Option<String>,
}

pub fn character_reference(params: CharacterReferenceParams) -> NodeResult<CharacterRef> {
    Ok(CharacterRef::from_urls([
        params.image_url_1.as_deref(),
        params.image_url_2.as_deref(),
        params.image_url_3.as_deref(),
        params.image_url_4.as_deref(),
    ])?)
}
