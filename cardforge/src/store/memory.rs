//! Capped in-memory record store.

use std::sync::Mutex;

use tracing::debug;

use super::{RecordStore, StoreError};
use crate::config::StoreSettings;
use crate::generation::{GenerationRecord, RecordId, RecordPatch};

/// In-memory [`RecordStore`] holding at most `max_records` entries.
///
/// Records are kept newest first; inserting into a full store evicts the
/// oldest entry. All operations lock a single mutex, which is fine for the
/// small capacities this store is used at.
pub struct MemoryRecordStore {
    records: Mutex<Vec<GenerationRecord>>,
    max_records: usize,
}

impl MemoryRecordStore {
    /// Creates a store with the given capacity.
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            max_records,
        }
    }

    /// Creates a store from settings.
    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.max_records)
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Returns true when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::from_settings(&StoreSettings::default())
    }
}

impl RecordStore for MemoryRecordStore {
    async fn create(&self, record: GenerationRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        records.insert(0, record);
        while records.len() > self.max_records {
            if let Some(evicted) = records.pop() {
                debug!(record_id = %evicted.id, "evicted oldest record");
            }
        }
        Ok(())
    }

    async fn get(&self, id: &RecordId) -> Result<Option<GenerationRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| &r.id == id).cloned())
    }

    async fn update(
        &self,
        id: &RecordId,
        patch: RecordPatch,
    ) -> Result<GenerationRecord, StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        patch.apply(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<GenerationRecord>, StoreError> {
        Ok(self.records.lock().unwrap().clone())
    }
}
