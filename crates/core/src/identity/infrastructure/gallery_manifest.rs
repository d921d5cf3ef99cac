use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryManifestError {
    #[error("failed to read gallery manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid gallery manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Name → reference image mapping, loaded from a JSON object such as
/// `{"renjie": "faces/renjie.jpg"}`.
///
/// Relative image paths resolve against the manifest's directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GalleryManifest {
    entries: BTreeMap<String, PathBuf>,
}

impl GalleryManifest {
    pub fn new(entries: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, GalleryManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| GalleryManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: BTreeMap<String, PathBuf> =
            serde_json::from_str(&text).map_err(|source| GalleryManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let entries = raw
            .into_iter()
            .map(|(name, image)| {
                let resolved = if image.is_relative() {
                    base.join(image)
                } else {
                    image
                };
                (name, resolved)
            })
            .collect();
        Ok(Self { entries })
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
