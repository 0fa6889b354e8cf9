use serde_json::Value;
use std::collections::HashMap;

/// Durable roster collection. Rows are returned as stored; their shape is
/// not guaranteed and callers run them through `normalize`.
pub trait RecordStore {
    fn list(&self) -> anyhow::Result<Vec<Value>>;

    /// Persists `record` and returns the stored row, which may carry
    /// store-assigned fields.
    fn create(&mut self, record: &Value) -> anyhow::Result<Value>;

    /// Returns whether a row was removed.
    fn remove(&mut self, id: &str) -> anyhow::Result<bool>;
}

/// Session-scoped keyed note store. `put` overwrites the whole sequence.
pub trait NoteStore {
    fn get(&self, key: &str) -> Vec<String>;
    fn put(&mut self, key: &str, notes: Vec<String>);
}

#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    entries: HashMap<String, Vec<String>>,
}

impl NoteStore for MemoryNoteStore {
    fn get(&self, key: &str) -> Vec<String> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    fn put(&mut self, key: &str, notes: Vec<String>) {
        if notes.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_string(), notes);
        }
    }
}
