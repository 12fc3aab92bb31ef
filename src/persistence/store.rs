//! Storage collaborator trait and the in-memory store.

use crate::error::StorageResult;
use crate::types::{ImageId, Marker};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Loads and saves the marker list of an image.
///
/// Implementations are called from the write queue's worker thread.
pub trait MarkerStore: Send + Sync {
    /// Markers stored for `image`; an image never written has none.
    fn load_markers(&self, image: &ImageId) -> StorageResult<Vec<Marker>>;

    /// Replace the stored list for `image`.
    fn save_markers(&self, image: &ImageId, markers: &[Marker]) -> StorageResult<()>;
}

/// Marker lists kept in a map. Counts writes per image.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    markers: HashMap<ImageId, Vec<Marker>>,
    writes: HashMap<ImageId, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing lists.
    pub fn with_markers(lists: impl IntoIterator<Item = (ImageId, Vec<Marker>)>) -> Self {
        Self {
            inner: Mutex::new(MemoryState {
                markers: lists.into_iter().collect(),
                writes: HashMap::new(),
            }),
        }
    }

    /// Number of successful saves for `image`.
    pub fn write_count(&self, image: &ImageId) -> usize {
        self.inner.lock().writes.get(image).copied().unwrap_or(0)
    }

    /// Current stored list, if `image` was ever written or seeded.
    pub fn stored(&self, image: &ImageId) -> Option<Vec<Marker>> {
        self.inner.lock().markers.get(image).cloned()
    }
}

impl MarkerStore for MemoryStore {
    fn load_markers(&self, image: &ImageId) -> StorageResult<Vec<Marker>> {
        Ok(self.inner.lock().markers.get(image).cloned().unwrap_or_default())
    }

    fn save_markers(&self, image: &ImageId, markers: &[Marker]) -> StorageResult<()> {
        let mut state = self.inner.lock();
        state.markers.insert(image.clone(), markers.to_vec());
        *state.writes.entry(image.clone()).or_default() += 1;
        Ok(())
    }
}
