//! Download-target resolution for persisted generation assets.
//!
//! A caller supplies a path-like string relative to the output root. It
//! may be empty, name a directory (trailing separator), or name a file.
//! Any extension is dropped; the asset kind decides the real one.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Asset kinds
// ---------------------------------------------------------------------------

/// Kind of media a generation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Video,
    Image,
}

impl AssetKind {
    /// File extension used when persisting this kind, regardless of the
    /// content type the server reports.
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Video => "mp4",
            AssetKind::Image => "jpg",
        }
    }
}

// ---------------------------------------------------------------------------
// Download target
// ---------------------------------------------------------------------------

/// A `(directory, base name)` pair relative to the output root.
///
/// An empty `name` means "use the generation id".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub directory: PathBuf,
    pub name: String,
}

fn is_separator(c: char) -> bool {
    c == '/' || std::path::is_separator(c)
}

/// Drop the extension of the last path component.
///
/// A dot only starts an extension when a non-dot character precedes it
/// inside the component, so `.hidden` and `..` are left untouched.
pub fn strip_extension(path: &str) -> &str {
    let base_start = path.rfind(is_separator).map(|i| i + 1).unwrap_or(0);
    let base = &path[base_start..];

    match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => &path[..base_start + dot],
        _ => path,
    }
}

impl DownloadTarget {
    /// Parse a caller-supplied path-like string.
    ///
    /// Rejects absolute paths and `..` components so the result always
    /// stays under the output root.
    pub fn parse(filename: &str) -> Result<Self, CoreError> {
        let stripped = strip_extension(filename.trim());

        let (directory, name) = if stripped.ends_with(is_separator) {
            (stripped, "")
        } else {
            match stripped.rfind(is_separator) {
                Some(i) => (&stripped[..i], &stripped[i + 1..]),
                None => ("", stripped),
            }
        };

        let directory = PathBuf::from(directory);
        for component in directory.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(CoreError::Validation(format!(
                        "Output path must be relative to the output directory, got '{filename}'"
                    )));
                }
            }
        }
        if name == ".." {
            return Err(CoreError::Validation(format!(
                "Output path must name a file, got '{filename}'"
            )));
        }

        Ok(Self {
            directory,
            name: name.to_string(),
        })
    }

    /// Final file path under `root` for the given generation and asset kind.
    pub fn file_path(&self, root: &Path, generation_id: &str, kind: AssetKind) -> PathBuf {
        let name = if self.name.is_empty() {
            generation_id
        } else {
            self.name.as_str()
        };
        root.join(&self.directory)
            .join(format!("{name}.{}", kind.extension()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
