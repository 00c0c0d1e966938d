use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a stored entry.
///
/// Ids are allocated once per entry by the master record table, strictly
/// increase, and are never reused for the lifetime of a partition. Id zero
/// is reserved as the sentinel parent of the namespace root and never
/// identifies a real entry.
///
/// The original design modeled ids as arbitrary-precision integers; a
/// `u64` cannot realistically wrap over the life of any deployment (one
/// allocation per nanosecond exhausts it after roughly 584 years).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(u64);

impl EntryId {
    /// Sentinel parent of the namespace root. Never a real entry.
    pub const ROOT_PARENT: EntryId = EntryId(0);

    /// Create an id from its raw value.
    pub const fn from_raw(raw: u64) -> Self {
        EntryId(raw)
    }

    /// The raw numeric value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is the reserved sentinel id.
    pub const fn is_sentinel(self) -> bool {
        self.0 == 0
    }

    /// The id following this one in allocation order.
    pub const fn next(self) -> Self {
        EntryId(self.0 + 1)
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntryId> for u64 {
    fn from(id: EntryId) -> u64 {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_zero() {
        assert!(EntryId::ROOT_PARENT.is_sentinel());
        assert_eq!(EntryId::ROOT_PARENT.as_u64(), 0);
        assert!(!EntryId::from_raw(1).is_sentinel());
    }

    #[test]
    fn next_increments() {
        let id = EntryId::from_raw(41);
        assert_eq!(id.next(), EntryId::from_raw(42));
    }

    #[test]
    fn ordering_follows_allocation_order() {
        assert!(EntryId::from_raw(1) < EntryId::from_raw(2));
        assert!(EntryId::ROOT_PARENT < EntryId::from_raw(1));
    }

    #[test]
    fn serde_roundtrip() {
        let id = EntryId::from_raw(7);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn display_is_plain_number() {
        assert_eq!(EntryId::from_raw(19).to_string(), "19");
    }
}
