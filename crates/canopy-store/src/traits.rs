use canopy_types::EntryId;

use crate::error::StoreResult;
use crate::record::Record;

/// Keyed record storage with id allocation.
///
/// All implementations must satisfy these invariants:
/// - `allocate_id` returns strictly increasing ids; an id is never handed
///   out twice, even after the record it identified was deleted.
/// - The table performs no validation — consistency between records and
///   any secondary structure is the caller's responsibility.
/// - `flush` makes all prior writes durable; in-memory backends treat it
///   as a no-op but must still honor the call.
/// - All I/O errors are propagated, never silently ignored.
pub trait RecordTable: Send + Sync {
    /// Allocate a fresh entry id. Never returns the sentinel id.
    fn allocate_id(&mut self) -> EntryId;

    /// Store a record under an id, replacing any previous record.
    fn put(&mut self, id: EntryId, record: Record) -> StoreResult<()>;

    /// Read the record stored under an id.
    ///
    /// Returns `Ok(None)` if no record exists for the id.
    fn get(&self, id: EntryId) -> StoreResult<Option<&Record>>;

    /// Remove the record stored under an id. Returns `true` if a record
    /// existed.
    fn delete(&mut self, id: EntryId) -> StoreResult<bool>;

    /// Number of records currently stored.
    fn count(&self) -> u64;

    /// Make all prior writes durable.
    fn flush(&mut self) -> StoreResult<()>;
}
