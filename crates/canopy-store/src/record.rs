use serde::{Deserialize, Serialize};

use canopy_types::{Dn, Entry};

/// What the master table stores per entry id: the entry's position in the
/// tree and its attribute set.
///
/// The `dn` carries both the normalized and the user-supplied rendering;
/// rename and move rewrite it for every affected descendant, so a record's
/// `dn` is always current.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Current position in the tree.
    pub dn: Dn,
    /// The attribute set.
    pub entry: Entry,
}

impl Record {
    /// Create a record.
    pub fn new(dn: Dn, entry: Entry) -> Self {
        Self { dn, entry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let mut entry = Entry::new();
        entry.set("objectclass", ["top"]).unwrap();
        let record = Record::new(Dn::parse("OU=People,dc=test").unwrap(), entry);

        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.dn.user(), "OU=People,dc=test");
    }
}
