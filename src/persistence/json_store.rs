//! One JSON file per image in a directory.

use super::MarkerStore;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use crate::constants::MARKER_FILE_EXTENSION;
use crate::error::StorageResult;
use crate::types::{ImageId, Marker};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Stores each image's markers as one JSON file under `dir`.
///
/// Files are replaced atomically: the list is written to a temp file in the
/// same directory and renamed over the old one, so a crash mid-write never
/// leaves a truncated list behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/occlude/markers`, if the platform has a data dir.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("occlude").join("markers")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `image`: `image-<id>.json` with the id in URL-safe
    /// Base64, so every id gets its own file and none can leave the directory.
    pub fn path_for(&self, image: &ImageId) -> PathBuf {
        let encoded = URL_SAFE_NO_PAD.encode(image.as_str());
        self.dir.join(format!("image-{encoded}.{MARKER_FILE_EXTENSION}"))
    }
}

impl MarkerStore for JsonFileStore {
    fn load_markers(&self, image: &ImageId) -> StorageResult<Vec<Marker>> {
        let path = self.path_for(image);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_markers(&self, image: &ImageId, markers: &[Marker]) -> StorageResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(image);
        let mut file = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut file, markers)?;
        file.flush()?;
        file.persist(&path).map_err(|e| e.error)?;
        debug!(image = %image, count = markers.len(), "markers written to {}", path.display());
        Ok(())
    }
}
