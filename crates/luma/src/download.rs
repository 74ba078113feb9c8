//! Persisting generated assets to local storage.
//!
//! The file name comes from a [`DownloadTarget`]; the extension is fixed
//! by [`AssetKind`]. Existing files with the same name are overwritten.

use std::path::{Path, PathBuf};

use luma_core::output_path::{AssetKind, DownloadTarget};

use crate::error::LumaError;
use crate::service::GenerationService;

/// Fetch `url` and write it under `root` as described by `target`.
///
/// Returns the written path.
pub async fn persist_asset<S>(
    service: &S,
    url: &str,
    target: &DownloadTarget,
    root: &Path,
    generation_id: &str,
    kind: AssetKind,
) -> Result<PathBuf, LumaError>
where
    S: GenerationService + ?Sized,
{
    let bytes = service.fetch_asset(url).await?;
    write_asset(&bytes, target, root, generation_id, kind).await
}

/// Write already-fetched asset bytes under `root`.
pub async fn write_asset(
    bytes: &[u8],
    target: &DownloadTarget,
    root: &Path,
    generation_id: &str,
    kind: AssetKind,
) -> Result<PathBuf, LumaError> {
    let path = target.file_path(root, generation_id, kind);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| LumaError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| LumaError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(
        generation_id,
        path = %path.display(),
        bytes = bytes.len(),
        "Saved generation asset",
    );
    Ok(path)
}
