//! The in-memory partition engine.
//!
//! All state lives in a [`PartitionState`] behind one `RwLock`: mutating
//! operations take the write lock, lookups the read lock. Precondition
//! and alias-policy checks run before any structure is touched, so a
//! typed failure never leaves a half-applied operation behind.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use canopy_index::ValueIndex;
use canopy_store::{InMemoryRecordTable, Record, RecordTable};
use canopy_types::{Dn, Entry, EntryId, Rdn};

use crate::config::PartitionConfig;
use crate::error::{PartitionError, PartitionResult};
use crate::schema::SchemaOracle;
use crate::traits::{ModifyOp, Partition};

/// Normalized form of an attribute value, used as an index key.
pub(crate) fn norm_value(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Normalized form of an attribute name.
pub(crate) fn norm_attr(attribute: &str) -> String {
    attribute.trim().to_ascii_lowercase()
}

/// Everything a live partition owns. Created by `initialize`, dropped by
/// `destroy`. The engine is the only writer of any structure in here.
pub(crate) struct PartitionState {
    pub(crate) suffix: Dn,
    pub(crate) kind_attribute: String,
    pub(crate) alias_kind_value: String,
    pub(crate) alias_target_attribute: String,
    pub(crate) schema: Arc<dyn SchemaOracle>,
    pub(crate) master: Box<dyn RecordTable>,
    /// Normalized path -> id.
    pub(crate) ndn_idx: ValueIndex<String>,
    /// User-supplied path -> id.
    pub(crate) updn_idx: ValueIndex<String>,
    /// Parent id -> child ids. The namespace root hangs off the sentinel.
    pub(crate) hierarchy_idx: ValueIndex<EntryId>,
    /// Normalized target path -> alias id.
    pub(crate) alias_idx: ValueIndex<String>,
    /// Ancestor id -> target ids visible to one-level searches below it.
    pub(crate) one_alias_idx: ValueIndex<EntryId>,
    /// Ancestor id -> target ids visible to subtree searches below it.
    pub(crate) sub_alias_idx: ValueIndex<EntryId>,
    /// Attribute name -> ids carrying at least one value of it.
    pub(crate) existence_idx: ValueIndex<String>,
    /// One value index per indexed attribute, created on first use.
    pub(crate) attr_indices: BTreeMap<String, ValueIndex<String>>,
}

impl PartitionState {
    fn new(config: &PartitionConfig, schema: Arc<dyn SchemaOracle>) -> PartitionResult<Self> {
        let suffix = Dn::parse(&config.suffix)?;
        Ok(Self {
            suffix,
            kind_attribute: norm_attr(&config.kind_attribute),
            alias_kind_value: norm_value(&config.alias_kind_value),
            alias_target_attribute: norm_attr(&config.alias_target_attribute),
            schema,
            master: Box::new(InMemoryRecordTable::new()),
            ndn_idx: ValueIndex::new("ndn"),
            updn_idx: ValueIndex::new("updn"),
            hierarchy_idx: ValueIndex::new("hierarchy"),
            alias_idx: ValueIndex::new("alias"),
            one_alias_idx: ValueIndex::new("oneAlias"),
            sub_alias_idx: ValueIndex::new("subAlias"),
            existence_idx: ValueIndex::new("existence"),
            attr_indices: BTreeMap::new(),
        })
    }

    // ---------------------------------------------------------------
    // Shared helpers
    // ---------------------------------------------------------------

    pub(crate) fn entry_id(&self, ndn: &str) -> Option<EntryId> {
        self.ndn_idx.forward_first(&ndn.to_string())
    }

    fn require_entry_id(&self, dn: &Dn) -> PartitionResult<EntryId> {
        self.entry_id(dn.normalized())
            .ok_or_else(|| PartitionError::EntryNotFound(dn.user().to_string()))
    }

    pub(crate) fn record(&self, id: EntryId) -> PartitionResult<Record> {
        self.master
            .get(id)?
            .cloned()
            .ok_or_else(|| PartitionError::EntryNotFound(id.to_string()))
    }

    fn is_alias_entry(&self, entry: &Entry) -> bool {
        entry.has_value_ignore_case(&self.kind_attribute, &self.alias_kind_value)
    }

    fn attr_index_mut(&mut self, attribute: &str) -> &mut ValueIndex<String> {
        self.attr_indices
            .entry(attribute.to_string())
            .or_insert_with(|| ValueIndex::new(attribute))
    }

    // ---------------------------------------------------------------
    // Add
    // ---------------------------------------------------------------

    fn add_entry(&mut self, user_path: &str, entry: Entry) -> PartitionResult<EntryId> {
        let dn = Dn::parse(user_path)?;

        if !entry.contains_attribute(&self.kind_attribute) {
            return Err(PartitionError::SchemaViolation {
                attribute: self.kind_attribute.clone(),
            });
        }

        let parent_id = if dn == self.suffix {
            EntryId::ROOT_PARENT
        } else {
            let parent = dn
                .parent()
                .ok_or_else(|| PartitionError::ParentNotFound(dn.user().to_string()))?;
            self.entry_id(parent.normalized())
                .ok_or_else(|| PartitionError::ParentNotFound(parent.user().to_string()))?
        };

        let id = self.master.allocate_id();

        // Alias policy runs before any index mutation: a rejected alias
        // leaves every structure untouched.
        if self.is_alias_entry(&entry) {
            let target = entry
                .first_value(&self.alias_target_attribute)
                .map(str::to_string)
                .ok_or_else(|| PartitionError::SchemaViolation {
                    attribute: self.alias_target_attribute.clone(),
                })?;
            self.add_alias_indices(id, &dn, &target)?;
        }

        self.ndn_idx.add(dn.normalized().to_string(), id);
        self.updn_idx.add(dn.user().to_string(), id);
        self.hierarchy_idx.add(parent_id, id);

        for (attr, values) in entry.attributes() {
            if self.schema.is_indexed(attr) {
                let idx = self
                    .attr_indices
                    .entry(attr.to_string())
                    .or_insert_with(|| ValueIndex::new(attr));
                for value in values {
                    idx.add(norm_value(value), id);
                }
                self.existence_idx.add(attr.to_string(), id);
            }
        }

        self.master.put(id, Record::new(dn.clone(), entry))?;
        debug!(id = %id, dn = %dn, "entry added");
        Ok(id)
    }

    // ---------------------------------------------------------------
    // Delete
    // ---------------------------------------------------------------

    fn delete_entry(&mut self, id: EntryId) -> PartitionResult<()> {
        let record = self.record(id)?;

        if self.alias_idx.has_id(id) {
            self.drop_alias_indices(id)?;
        }

        self.ndn_idx.drop_all(id);
        self.updn_idx.drop_all(id);
        if let Some(parent_id) = self.hierarchy_idx.reverse_first(id) {
            self.hierarchy_idx.drop(&parent_id, id);
        }

        for (attr, values) in record.entry.attributes() {
            if self.schema.is_indexed(attr) {
                if let Some(idx) = self.attr_indices.get_mut(attr) {
                    for value in values {
                        idx.drop(&norm_value(value), id);
                    }
                    if !idx.has_id(id) {
                        self.existence_idx.drop(&attr.to_string(), id);
                    }
                }
            }
        }

        self.master.delete(id)?;
        debug!(id = %id, dn = %record.dn, "entry deleted");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Modify
    // ---------------------------------------------------------------

    fn modify_entry(
        &mut self,
        path: &str,
        op: ModifyOp,
        attribute: &str,
        values: &[String],
    ) -> PartitionResult<()> {
        let dn = Dn::parse(path)?;
        let id = self.require_entry_id(&dn)?;
        let mut record = self.record(id)?;
        let attr = norm_attr(attribute);
        let is_target_attr = attr == self.alias_target_attribute;

        match op {
            ModifyOp::Add => {
                // Alias policy first, so a rejected target leaves the
                // value index untouched.
                if is_target_attr {
                    if let Some(target) = values.first() {
                        if self.alias_idx.has_id(id) {
                            return Err(PartitionError::UnsupportedOperation(
                                "entry already has an alias target; replace it instead".into(),
                            ));
                        }
                        let alias_dn = record.dn.clone();
                        self.add_alias_indices(id, &alias_dn, target)?;
                    }
                }
                if self.schema.is_indexed(&attr) {
                    let idx = self.attr_index_mut(&attr);
                    for value in values {
                        idx.add(norm_value(value), id);
                    }
                    if !values.is_empty() {
                        self.existence_idx.add(attr.clone(), id);
                    }
                }
                for value in values {
                    record.entry.add_value(&attr, value)?;
                }
            }
            ModifyOp::Remove => {
                if is_target_attr {
                    self.drop_alias_indices(id)?;
                }
                if self.schema.is_indexed(&attr) {
                    if let Some(idx) = self.attr_indices.get_mut(&attr) {
                        if values.is_empty() {
                            idx.drop_all(id);
                        } else {
                            for value in values {
                                idx.drop(&norm_value(value), id);
                            }
                        }
                        if !idx.has_id(id) {
                            self.existence_idx.drop(&attr, id);
                        }
                    }
                }
                if values.is_empty() {
                    record.entry.remove_attribute(&attr)?;
                } else {
                    for value in values {
                        record.entry.remove_value(&attr, value)?;
                    }
                }
            }
            ModifyOp::Replace => {
                if is_target_attr {
                    self.drop_alias_indices(id)?;
                    if let Some(target) = values.first() {
                        let alias_dn = record.dn.clone();
                        self.add_alias_indices(id, &alias_dn, target)?;
                    }
                }
                if self.schema.is_indexed(&attr) {
                    let idx = self.attr_index_mut(&attr);
                    idx.drop_all(id);
                    for value in values {
                        idx.add(norm_value(value), id);
                    }
                    if values.is_empty() {
                        self.existence_idx.drop(&attr, id);
                    } else {
                        self.existence_idx.add(attr.clone(), id);
                    }
                }
                record.entry.set(&attr, values.iter().cloned())?;
            }
        }

        // One write-back per modify call, whatever the attribute count.
        self.master.put(id, record)?;
        debug!(id = %id, attr = %attr, ?op, "entry modified");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Rename / Move
    // ---------------------------------------------------------------

    /// Swap an entry's leaf component value in its attribute set and the
    /// affected value index. Shared by rename and move-and-rename; does
    /// not touch the name indices (that is the propagation's job).
    fn apply_rdn_change(
        &mut self,
        id: EntryId,
        record: &mut Record,
        new_rdn: &Rdn,
        delete_old: bool,
    ) -> PartitionResult<()> {
        let old_rdn = record.dn.rdn().clone();

        record.entry.add_value(new_rdn.attr(), new_rdn.value())?;
        if self.schema.is_indexed(new_rdn.attr()) {
            let idx = self.attr_index_mut(new_rdn.attr());
            idx.add(new_rdn.value().to_string(), id);
            self.existence_idx.add(new_rdn.attr().to_string(), id);
        }

        if delete_old {
            // The stored value may differ in case from the normalized
            // component; remove whichever value normalizes to it.
            let stored = record
                .entry
                .get(old_rdn.attr())
                .and_then(|vs| vs.iter().find(|v| norm_value(v) == old_rdn.value()).cloned());
            if let Some(value) = stored {
                record.entry.remove_value(old_rdn.attr(), &value)?;
            }
            if self.schema.is_indexed(old_rdn.attr()) {
                if let Some(idx) = self.attr_indices.get_mut(old_rdn.attr()) {
                    idx.drop(&old_rdn.value().to_string(), id);
                    if !idx.has_id(id) {
                        self.existence_idx.drop(&old_rdn.attr().to_string(), id);
                    }
                }
            }
        }
        Ok(())
    }

    fn rename_entry(&mut self, path: &str, new_rdn: &str, delete_old: bool) -> PartitionResult<()> {
        let dn = Dn::parse(path)?;
        let id = self.require_entry_id(&dn)?;
        if dn == self.suffix {
            return Err(PartitionError::UnsupportedOperation(
                "cannot rename the namespace root".into(),
            ));
        }
        let new_rdn = Rdn::parse(new_rdn)?;

        let mut record = self.record(id)?;
        self.apply_rdn_change(id, &mut record, &new_rdn, delete_old)?;
        let new_dn = record.dn.with_rdn(new_rdn);
        self.master.put(id, record)?;

        debug!(id = %id, old = %dn, new = %new_dn, "entry renamed");
        self.propagate_name_change(id, new_dn, false)
    }

    fn move_subtree(
        &mut self,
        old_path: &str,
        new_parent_path: &str,
        new_rdn: Option<&str>,
        delete_old: bool,
    ) -> PartitionResult<()> {
        let dn = Dn::parse(old_path)?;
        let id = self.require_entry_id(&dn)?;
        if dn == self.suffix {
            return Err(PartitionError::UnsupportedOperation(
                "cannot move the namespace root".into(),
            ));
        }
        let new_parent_dn = Dn::parse(new_parent_path)?;
        if new_parent_dn.is_equal_or_descendant_of(&dn) {
            return Err(PartitionError::UnsupportedOperation(
                "cannot move an entry under its own subtree".into(),
            ));
        }
        let new_parent_id = self
            .entry_id(new_parent_dn.normalized())
            .ok_or_else(|| PartitionError::ParentNotFound(new_parent_dn.user().to_string()))?;

        let rdn = match new_rdn {
            Some(text) => {
                let rdn = Rdn::parse(text)?;
                let mut record = self.record(id)?;
                self.apply_rdn_change(id, &mut record, &rdn, delete_old)?;
                self.master.put(id, record)?;
                rdn
            }
            None => self.record(id)?.dn.rdn().clone(),
        };

        // Alias tuples held by ancestors above the moved base are stale
        // after the move; tuples among ancestors inside the subtree are
        // untouched by it.
        self.drop_moved_alias_indices(&dn)?;

        if let Some(old_parent_id) = self.hierarchy_idx.reverse_first(id) {
            self.hierarchy_idx.drop(&old_parent_id, id);
        }
        self.hierarchy_idx.add(new_parent_id, id);

        let parent_record = self.record(new_parent_id)?;
        let new_dn = parent_record.dn.child(rdn);
        debug!(id = %id, old = %dn, new = %new_dn, "entry moved");
        self.propagate_name_change(id, new_dn, true)
    }

    /// Rewrite the name indices (and stored paths) of an entry and every
    /// descendant. An explicit worklist bounds stack depth on deep trees.
    ///
    /// With `is_move`, every alias rediscovered along the way re-runs
    /// alias index addition, re-establishing scope tuples for the new
    /// ancestor chain.
    fn propagate_name_change(
        &mut self,
        start_id: EntryId,
        new_dn: Dn,
        is_move: bool,
    ) -> PartitionResult<()> {
        let mut pending = vec![(start_id, new_dn)];
        while let Some((id, dn)) = pending.pop() {
            self.ndn_idx.drop_all(id);
            self.ndn_idx.add(dn.normalized().to_string(), id);
            self.updn_idx.drop_all(id);
            self.updn_idx.add(dn.user().to_string(), id);

            let mut record = self.record(id)?;
            record.dn = dn.clone();
            self.master.put(id, record)?;

            if is_move {
                if let Some(target) = self.alias_idx.reverse_first(id) {
                    self.add_alias_indices(id, &dn, &target)?;
                }
            }

            for child_id in self.hierarchy_idx.forward_ids(&id) {
                let child = self.record(child_id)?;
                pending.push((child_id, dn.child(child.dn.rdn().clone())));
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------

    fn find_entry_id(&self, path: &str) -> PartitionResult<Option<EntryId>> {
        let dn = Dn::parse(path)?;
        Ok(self.entry_id(dn.normalized()))
    }

    fn entries_with_value(&self, attribute: &str, value: &str) -> PartitionResult<Vec<EntryId>> {
        let attr = norm_attr(attribute);
        if !self.schema.is_indexed(&attr) {
            return Err(PartitionError::IndexNotFound(attr));
        }
        Ok(self
            .attr_indices
            .get(&attr)
            .map(|idx| idx.forward_ids(&norm_value(value)))
            .unwrap_or_default())
    }

    fn entries_with_attribute(&self, attribute: &str) -> PartitionResult<Vec<EntryId>> {
        let attr = norm_attr(attribute);
        if !self.schema.is_indexed(&attr) {
            return Err(PartitionError::IndexNotFound(attr));
        }
        Ok(self.existence_idx.forward_ids(&attr))
    }

    fn sync_all(&mut self) -> PartitionResult<()> {
        self.master.flush()?;
        self.ndn_idx.flush()?;
        self.updn_idx.flush()?;
        self.hierarchy_idx.flush()?;
        self.alias_idx.flush()?;
        self.one_alias_idx.flush()?;
        self.sub_alias_idx.flush()?;
        self.existence_idx.flush()?;
        for idx in self.attr_indices.values_mut() {
            idx.flush()?;
        }
        debug!("partition synced");
        Ok(())
    }
}

/// The partition engine over in-memory tables.
///
/// Construct with a schema oracle, then `initialize` with a
/// [`PartitionConfig`] before use.
pub struct InMemoryPartition {
    schema: Arc<dyn SchemaOracle>,
    inner: RwLock<Option<PartitionState>>,
}

impl InMemoryPartition {
    /// Create an uninitialized partition bound to a schema oracle.
    pub fn new(schema: Arc<dyn SchemaOracle>) -> Self {
        Self {
            schema,
            inner: RwLock::new(None),
        }
    }

    pub(crate) fn with_state<R>(
        &self,
        f: impl FnOnce(&PartitionState) -> PartitionResult<R>,
    ) -> PartitionResult<R> {
        let guard = self.inner.read().map_err(|_| PartitionError::LockPoisoned)?;
        let state = guard.as_ref().ok_or(PartitionError::NotInitialized)?;
        f(state)
    }

    pub(crate) fn with_state_mut<R>(
        &self,
        f: impl FnOnce(&mut PartitionState) -> PartitionResult<R>,
    ) -> PartitionResult<R> {
        let mut guard = self.inner.write().map_err(|_| PartitionError::LockPoisoned)?;
        let state = guard.as_mut().ok_or(PartitionError::NotInitialized)?;
        f(state)
    }
}

impl Partition for InMemoryPartition {
    fn initialize(&self, config: PartitionConfig) -> PartitionResult<()> {
        let mut guard = self.inner.write().map_err(|_| PartitionError::LockPoisoned)?;
        if guard.is_some() {
            return Err(PartitionError::AlreadyInitialized);
        }
        let state = PartitionState::new(&config, Arc::clone(&self.schema))?;
        info!(suffix = %state.suffix, "partition initialized");
        *guard = Some(state);
        Ok(())
    }

    fn destroy(&self) -> PartitionResult<()> {
        let mut guard = self.inner.write().map_err(|_| PartitionError::LockPoisoned)?;
        if guard.take().is_some() {
            info!("partition destroyed");
        }
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn sync(&self) -> PartitionResult<()> {
        self.with_state_mut(|state| state.sync_all())
    }

    fn add(&self, user_path: &str, entry: Entry) -> PartitionResult<EntryId> {
        self.with_state_mut(|state| state.add_entry(user_path, entry))
    }

    fn delete(&self, id: EntryId) -> PartitionResult<()> {
        self.with_state_mut(|state| state.delete_entry(id))
    }

    fn modify(
        &self,
        path: &str,
        op: ModifyOp,
        attribute: &str,
        values: &[String],
    ) -> PartitionResult<()> {
        self.with_state_mut(|state| state.modify_entry(path, op, attribute, values))
    }

    fn rename(&self, path: &str, new_rdn: &str, delete_old: bool) -> PartitionResult<()> {
        self.with_state_mut(|state| state.rename_entry(path, new_rdn, delete_old))
    }

    fn move_entry(&self, old_path: &str, new_parent_path: &str) -> PartitionResult<()> {
        self.with_state_mut(|state| state.move_subtree(old_path, new_parent_path, None, false))
    }

    fn move_and_rename(
        &self,
        old_path: &str,
        new_parent_path: &str,
        new_rdn: &str,
        delete_old: bool,
    ) -> PartitionResult<()> {
        self.with_state_mut(|state| {
            state.move_subtree(old_path, new_parent_path, Some(new_rdn), delete_old)
        })
    }

    fn lookup(&self, id: EntryId) -> PartitionResult<Record> {
        self.with_state(|state| state.record(id))
    }

    fn list(&self, parent_id: EntryId) -> PartitionResult<Vec<EntryId>> {
        self.with_state(|state| Ok(state.hierarchy_idx.forward_ids(&parent_id)))
    }

    fn get_entry_id(&self, path: &str) -> PartitionResult<Option<EntryId>> {
        self.with_state(|state| state.find_entry_id(path))
    }

    fn get_parent_id(&self, id: EntryId) -> PartitionResult<Option<EntryId>> {
        self.with_state(|state| Ok(state.hierarchy_idx.reverse_first(id)))
    }

    fn child_count(&self, id: EntryId) -> PartitionResult<u64> {
        self.with_state(|state| Ok(state.hierarchy_idx.forward_ids(&id).len() as u64))
    }

    fn entries_with_value(&self, attribute: &str, value: &str) -> PartitionResult<Vec<EntryId>> {
        self.with_state(|state| state.entries_with_value(attribute, value))
    }

    fn entries_with_attribute(&self, attribute: &str) -> PartitionResult<Vec<EntryId>> {
        self.with_state(|state| state.entries_with_attribute(attribute))
    }

    fn count(&self) -> PartitionResult<u64> {
        self.with_state(|state| Ok(state.master.count()))
    }
}
