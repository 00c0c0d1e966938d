//! Alias index maintenance.
//!
//! Three structures track aliases. The direct index maps a normalized
//! target path to the alias ids naming it. The one-level index marks,
//! per ancestor, the targets a one-level search below that ancestor must
//! surface when dereferencing aliases. The subtree index does the same
//! for subtree searches, for every ancestor between the alias and the
//! namespace root (the root itself is excluded: everything is in its
//! scope already).
//!
//! Policy checks run in full before the first tuple is inserted, so a
//! rejected alias leaves all three structures exactly as they were.

use canopy_types::{Dn, EntryId};
use tracing::debug;

use crate::engine::PartitionState;
use crate::error::{PartitionError, PartitionResult};

impl PartitionState {
    /// Validate an alias and insert its tuples into the three alias
    /// structures.
    ///
    /// Rejected aliases: self-referencing, targeting one of the alias's
    /// own ancestors or descendants (either direction loops once
    /// dereferenced), targeting outside the namespace, targeting a path
    /// that does not resolve, or targeting another alias (chaining).
    pub(crate) fn add_alias_indices(
        &mut self,
        alias_id: EntryId,
        alias_dn: &Dn,
        target_text: &str,
    ) -> PartitionResult<()> {
        let target = Dn::parse(target_text)?;

        if target == *alias_dn {
            return Err(PartitionError::AliasSelfReference(
                alias_dn.user().to_string(),
            ));
        }
        if target.is_descendant_of(alias_dn) || alias_dn.is_descendant_of(&target) {
            return Err(PartitionError::AliasCycle {
                alias: alias_dn.user().to_string(),
                target: target.user().to_string(),
            });
        }
        if !target.is_equal_or_descendant_of(&self.suffix) {
            return Err(PartitionError::AliasExternalTarget {
                target: target.user().to_string(),
                suffix: self.suffix.user().to_string(),
            });
        }
        let target_id = self.entry_id(target.normalized()).ok_or_else(|| {
            PartitionError::AliasDanglingTarget {
                alias: alias_dn.user().to_string(),
                target: target.user().to_string(),
            }
        })?;
        if self.alias_idx.has_id(target_id) {
            return Err(PartitionError::AliasChaining {
                target: target.user().to_string(),
            });
        }

        self.alias_idx
            .add(target.normalized().to_string(), alias_id);

        let Some(parent) = alias_dn.parent() else {
            // An alias at the namespace root has no ancestors to annotate.
            return Ok(());
        };
        let Some(parent_id) = self.entry_id(parent.normalized()) else {
            return Ok(());
        };

        // A sibling target is already in the parent's one-level scope;
        // no dereference is needed to surface it there.
        if !target.is_sibling_of(alias_dn) {
            self.one_alias_idx.add(parent_id, target_id);
        }

        // Annotate each ancestor whose subtree scope does not already
        // contain the target, stopping below the namespace root.
        let mut ancestor = parent;
        let mut ancestor_id = parent_id;
        while ancestor != self.suffix {
            if !target.is_equal_or_descendant_of(&ancestor) {
                self.sub_alias_idx.add(ancestor_id, target_id);
            }
            let Some(up) = ancestor.parent() else {
                break;
            };
            let Some(up_id) = self.entry_id(up.normalized()) else {
                break;
            };
            ancestor = up;
            ancestor_id = up_id;
        }

        debug!(alias = %alias_dn, target = %target, "alias indexed");
        Ok(())
    }

    /// Remove an alias's tuples from all three alias structures. A no-op
    /// for ids with no direct tuple.
    ///
    /// Scope tuples are a set, not a refcount: when two aliases below the
    /// same ancestor name the same target, they share one
    /// `(ancestor, target)` tuple, and dropping either alias removes it.
    pub(crate) fn drop_alias_indices(&mut self, alias_id: EntryId) -> PartitionResult<()> {
        let Some(target_ndn) = self.alias_idx.reverse_first(alias_id) else {
            return Ok(());
        };
        let alias_dn = self.record(alias_id)?.dn;

        if let Some(target_id) = self.entry_id(&target_ndn) {
            if let Some(parent) = alias_dn.parent() {
                if let Some(parent_id) = self.entry_id(parent.normalized()) {
                    self.one_alias_idx.drop(&parent_id, target_id);

                    let mut ancestor = parent;
                    let mut ancestor_id = parent_id;
                    while ancestor != self.suffix {
                        self.sub_alias_idx.drop(&ancestor_id, target_id);
                        let Some(up) = ancestor.parent() else {
                            break;
                        };
                        let Some(up_id) = self.entry_id(up.normalized()) else {
                            break;
                        };
                        ancestor = up;
                        ancestor_id = up_id;
                    }
                }
            }
        }

        self.alias_idx.drop(&target_ndn, alias_id);
        debug!(alias = %alias_dn, target = %target_ndn, "alias tuples dropped");
        Ok(())
    }

    /// Remove an alias's scope tuples held by ancestors strictly above
    /// `moved_base`, keeping the direct tuple and any tuples held by
    /// ancestors travelling with the move.
    fn drop_alias_indices_above(
        &mut self,
        alias_id: EntryId,
        moved_base: &Dn,
    ) -> PartitionResult<()> {
        let Some(target_ndn) = self.alias_idx.reverse_first(alias_id) else {
            return Ok(());
        };
        let Some(target_id) = self.entry_id(&target_ndn) else {
            return Ok(());
        };
        let alias_dn = self.record(alias_id)?.dn;
        let Some(parent) = alias_dn.parent() else {
            return Ok(());
        };
        let Some(parent_id) = self.entry_id(parent.normalized()) else {
            return Ok(());
        };

        if !parent.is_equal_or_descendant_of(moved_base) {
            self.one_alias_idx.drop(&parent_id, target_id);
        }

        let mut ancestor = parent;
        let mut ancestor_id = parent_id;
        while ancestor != self.suffix {
            if !ancestor.is_equal_or_descendant_of(moved_base) {
                self.sub_alias_idx.drop(&ancestor_id, target_id);
            }
            let Some(up) = ancestor.parent() else {
                break;
            };
            let Some(up_id) = self.entry_id(up.normalized()) else {
                break;
            };
            ancestor = up;
            ancestor_id = up_id;
        }
        Ok(())
    }

    /// Before a subtree move: strip, for every alias inside the moved
    /// subtree, the scope tuples held by ancestors that stay behind.
    /// The re-addition for the new ancestor chain happens during name
    /// propagation.
    pub(crate) fn drop_moved_alias_indices(&mut self, moved_base: &Dn) -> PartitionResult<()> {
        for alias_id in self.alias_idx.ids() {
            let alias_dn = self.record(alias_id)?.dn;
            if alias_dn.is_equal_or_descendant_of(moved_base) {
                self.drop_alias_indices_above(alias_id, moved_base)?;
            }
        }
        Ok(())
    }
}
