use canopy_store::Record;
use canopy_types::{Entry, EntryId};

use crate::config::PartitionConfig;
use crate::error::PartitionResult;

/// How `modify` changes one attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifyOp {
    /// Add the listed values to the attribute.
    Add,
    /// Remove the listed values; an empty list removes the attribute.
    Remove,
    /// Replace the attribute's values with the listed set; an empty list
    /// removes the attribute.
    Replace,
}

/// The partition contract: one namespace of tree-structured entries with
/// index-consistent mutations.
///
/// Writers are serialized per partition instance; readers may run
/// concurrently with each other. Alias-policy failures and precondition
/// failures (missing kind marker, missing parent) abort an operation
/// before any index has been touched.
pub trait Partition: Send + Sync {
    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Bring the partition up for the configured namespace.
    fn initialize(&self, config: PartitionConfig) -> PartitionResult<()>;

    /// Tear the partition down, releasing all state. Idempotent.
    fn destroy(&self) -> PartitionResult<()>;

    /// Returns `true` between `initialize` and `destroy`.
    fn is_initialized(&self) -> bool;

    /// Flush every index and the record table. Must be called to
    /// guarantee durability with a persistent backing.
    fn sync(&self) -> PartitionResult<()>;

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    /// Add an entry at the given user-supplied path. Returns the fresh id.
    fn add(&self, user_path: &str, entry: Entry) -> PartitionResult<EntryId>;

    /// Delete an entry by id.
    ///
    /// Deleting an entry that still has children is not guarded here;
    /// callers are expected to check [`Partition::child_count`] first.
    fn delete(&self, id: EntryId) -> PartitionResult<()>;

    /// Apply one attribute modification to the entry at `path`.
    fn modify(
        &self,
        path: &str,
        op: ModifyOp,
        attribute: &str,
        values: &[String],
    ) -> PartitionResult<()>;

    /// Change the last path component of the entry at `path`. With
    /// `delete_old`, the previous component's attribute value is removed.
    fn rename(&self, path: &str, new_rdn: &str, delete_old: bool) -> PartitionResult<()>;

    /// Move the entry (and its whole subtree) under a new parent.
    fn move_entry(&self, old_path: &str, new_parent_path: &str) -> PartitionResult<()>;

    /// Move combined with a rename of the last path component.
    fn move_and_rename(
        &self,
        old_path: &str,
        new_parent_path: &str,
        new_rdn: &str,
        delete_old: bool,
    ) -> PartitionResult<()>;

    // ---------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------

    /// The stored record (path and attributes) for an id.
    fn lookup(&self, id: EntryId) -> PartitionResult<Record>;

    /// Ids of the direct children of `parent_id`, in ascending order.
    /// `EntryId::ROOT_PARENT` lists the namespace root itself.
    fn list(&self, parent_id: EntryId) -> PartitionResult<Vec<EntryId>>;

    /// Resolve a path to its entry id.
    fn get_entry_id(&self, path: &str) -> PartitionResult<Option<EntryId>>;

    /// The parent id of an entry; the namespace root reports the
    /// sentinel `EntryId::ROOT_PARENT`.
    fn get_parent_id(&self, id: EntryId) -> PartitionResult<Option<EntryId>>;

    /// Number of direct children of an entry.
    fn child_count(&self, id: EntryId) -> PartitionResult<u64>;

    /// Ids of entries carrying the given value of an indexed attribute.
    /// Fails with `IndexNotFound` if the attribute has no value index.
    fn entries_with_value(&self, attribute: &str, value: &str) -> PartitionResult<Vec<EntryId>>;

    /// Ids of entries carrying at least one value of an indexed
    /// attribute. Fails with `IndexNotFound` if the attribute has no
    /// value index.
    fn entries_with_attribute(&self, attribute: &str) -> PartitionResult<Vec<EntryId>>;

    /// Number of entries stored.
    fn count(&self) -> PartitionResult<u64>;
}
