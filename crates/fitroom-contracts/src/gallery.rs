use crate::storage::PersistentStore;

pub const GALLERY_STORAGE_KEY: &str = "ai-try-on-gallery";

/// Saved results as `data:` URLs, most recent first and without duplicates.
///
/// Every mutation writes the full list back to the store. Write failures are
/// logged and otherwise ignored.
pub struct Gallery {
    entries: Vec<String>,
    store: Box<dyn PersistentStore<Vec<String>>>,
}

impl Gallery {
    pub fn load(store: Box<dyn PersistentStore<Vec<String>>>) -> Self {
        let mut entries: Vec<String> = Vec::new();
        for entry in store.load() {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        Self { entries, store }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, image: &str) -> bool {
        self.entries.iter().any(|entry| entry == image)
    }

    /// Returns `false` when the image was already saved.
    pub fn save(&mut self, image: &str) -> bool {
        if self.contains(image) {
            return false;
        }
        self.entries.insert(0, image.to_string());
        self.persist();
        true
    }

    pub fn delete(&mut self, index: usize) -> Option<String> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.persist();
        Some(removed)
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.entries) {
            tracing::warn!(error = %err, entries = self.entries.len(), "failed to persist gallery");
        }
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("entries", &self.entries.len())
            .finish()
    }
}
