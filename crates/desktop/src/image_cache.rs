use std::collections::{HashMap, HashSet};

use iced::widget::image::Handle;

/// Download state of an annotated image, keyed by its absolute URL.
#[derive(Debug, Clone)]
pub enum ImageState {
    Loading,
    Ready(Handle),
    Failed(String),
}

/// Images for whatever is on screen. Entries not in view are evicted, and
/// a fetch that finishes after its entry was evicted is dropped.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, ImageState>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as loading. Returns `true` if the caller should fetch it;
    /// failed entries are retried.
    pub fn begin(&mut self, key: &str) -> bool {
        if matches!(
            self.entries.get(key),
            Some(ImageState::Loading | ImageState::Ready(_))
        ) {
            return false;
        }
        self.entries.insert(key.to_string(), ImageState::Loading);
        true
    }

    /// Stores a finished fetch. Returns `false` if the entry was evicted
    /// while the fetch was running.
    pub fn finish(&mut self, key: &str, state: ImageState) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                *entry = state;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ImageState> {
        self.entries.get(key)
    }

    pub fn evict(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops every entry whose key is not in `keep`.
    pub fn retain_only(&mut self, keep: &HashSet<String>) {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep.contains(key));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("Evicted {evicted} cached image(s)");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
