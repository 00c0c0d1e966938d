use std::collections::BTreeMap;

use canopy_types::EntryId;

use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use crate::traits::RecordTable;

/// In-memory, BTreeMap-based record table.
///
/// Intended for tests and embedding. Records are held in id order; the id
/// counter survives deletions, so ids are never reused.
#[derive(Debug)]
pub struct InMemoryRecordTable {
    records: BTreeMap<EntryId, Record>,
    next_id: EntryId,
}

impl InMemoryRecordTable {
    /// Create a new empty record table. The first allocated id is 1.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: EntryId::ROOT_PARENT.next(),
        }
    }

    /// Returns `true` if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All ids currently stored, in ascending order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.records.keys().copied().collect()
    }

    /// Remove all records. The id counter is not reset.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for InMemoryRecordTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordTable for InMemoryRecordTable {
    fn allocate_id(&mut self) -> EntryId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    fn put(&mut self, id: EntryId, record: Record) -> StoreResult<()> {
        if id.is_sentinel() {
            return Err(StoreError::SentinelId);
        }
        self.records.insert(id, record);
        Ok(())
    }

    fn get(&self, id: EntryId) -> StoreResult<Option<&Record>> {
        Ok(self.records.get(&id))
    }

    fn delete(&mut self, id: EntryId) -> StoreResult<bool> {
        Ok(self.records.remove(&id).is_some())
    }

    fn count(&self) -> u64 {
        self.records.len() as u64
    }

    fn flush(&mut self) -> StoreResult<()> {
        // Nothing buffered; the seam exists for persistent backends.
        Ok(())
    }
}
