use crate::session_error::StoreError;
use mindweave_core::Document;
use mindweave_core::model::storage_key;
use rustc_hash::FxHashMap;

/// Where module documents are persisted.
pub trait DocumentStore {
    fn load(&self, id: &str) -> Result<Option<Document>, StoreError>;
    fn save(&mut self, document: &Document) -> Result<(), StoreError>;
}

/// In-memory key/value store holding serialized documents under `mindmap-module-<id>`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw serialized value stored under `key`.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, json: impl Into<String>) {
        self.entries.insert(key.into(), json.into());
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(&storage_key(id)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successful `save` calls since creation.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let Some(json) = self.entries.get(&storage_key(id)) else {
            return Ok(None);
        };
        Ok(Some(Document::from_json_str(json)?))
    }

    fn save(&mut self, document: &Document) -> Result<(), StoreError> {
        let json = document.to_json_string()?;
        self.entries.insert(document.storage_key(), json);
        self.saves += 1;
        Ok(())
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for &mut T {
    fn load(&self, id: &str) -> Result<Option<Document>, StoreError> {
        (**self).load(id)
    }

    fn save(&mut self, document: &Document) -> Result<(), StoreError> {
        (**self).save(document)
    }
}
