//! Schema lookups consumed by the engine.
//!
//! The partition performs no syntax or semantic validation of attribute
//! values; the only schema question it ever asks is "does this attribute
//! have a value index, and of what shape". That question is answered by a
//! [`SchemaOracle`] handle passed in at construction — there is no global
//! registry.

use std::collections::BTreeMap;

/// Expected shape of an attribute's value index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexCardinality {
    /// At most one entry per key (e.g. a unique identifier attribute).
    Single,
    /// Any number of entries per key.
    Multi,
}

/// Read-only schema lookups.
pub trait SchemaOracle: Send + Sync {
    /// The index registration for an attribute, or `None` if the
    /// attribute is not indexed. Attribute names are normalized
    /// (lowercase) by the caller.
    fn index_cardinality(&self, attribute: &str) -> Option<IndexCardinality>;

    /// Returns `true` if the attribute has a registered value index.
    fn is_indexed(&self, attribute: &str) -> bool {
        self.index_cardinality(attribute).is_some()
    }
}

/// Map-backed [`SchemaOracle`] built up front from a known attribute set.
#[derive(Clone, Debug, Default)]
pub struct StaticSchema {
    indexed: BTreeMap<String, IndexCardinality>,
}

impl StaticSchema {
    /// An oracle with no indexed attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a multi-valued index for an attribute.
    pub fn with_indexed(mut self, attribute: &str) -> Self {
        self.indexed
            .insert(attribute.trim().to_ascii_lowercase(), IndexCardinality::Multi);
        self
    }

    /// Register a single-valued index for an attribute.
    pub fn with_single_valued(mut self, attribute: &str) -> Self {
        self.indexed
            .insert(attribute.trim().to_ascii_lowercase(), IndexCardinality::Single);
        self
    }
}

impl SchemaOracle for StaticSchema {
    fn index_cardinality(&self, attribute: &str) -> Option<IndexCardinality> {
        self.indexed.get(attribute).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_schema_indexes_nothing() {
        let schema = StaticSchema::new();
        assert!(!schema.is_indexed("cn"));
        assert_eq!(schema.index_cardinality("cn"), None);
    }

    #[test]
    fn registration_is_normalized() {
        let schema = StaticSchema::new().with_indexed(" Mail ");
        assert!(schema.is_indexed("mail"));
        assert_eq!(schema.index_cardinality("mail"), Some(IndexCardinality::Multi));
    }

    #[test]
    fn single_valued_registration() {
        let schema = StaticSchema::new().with_single_valued("uidnumber");
        assert_eq!(
            schema.index_cardinality("uidnumber"),
            Some(IndexCardinality::Single)
        );
    }
}
