//! Multi-valued attribute sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An entry's attribute set: normalized attribute name to ordered values.
///
/// Values keep insertion order. A value is never stored twice under the
/// same attribute: `add_value` on an already-present value is a no-op, so
/// repeated modify-add calls are idempotent per value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    attrs: BTreeMap<String, Vec<String>>,
}

/// Normalize an attribute name: trimmed, ASCII-lowercased.
pub(crate) fn normalize_attr(name: &str) -> Result<String, TypeError> {
    let normalized = name.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(TypeError::InvalidAttributeName(name.to_string()));
    }
    Ok(normalized)
}

impl Entry {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes present.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Returns `true` if no attribute is present.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Replace an attribute's values wholesale, de-duplicating while
    /// preserving first-occurrence order. An empty value list removes the
    /// attribute.
    pub fn set<I, S>(&mut self, attr: &str, values: I) -> Result<(), TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attr = normalize_attr(attr)?;
        let mut deduped: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !deduped.contains(&value) {
                deduped.push(value);
            }
        }
        if deduped.is_empty() {
            self.attrs.remove(&attr);
        } else {
            self.attrs.insert(attr, deduped);
        }
        Ok(())
    }

    /// Add one value to an attribute. Returns `true` if the value was not
    /// already present.
    pub fn add_value(&mut self, attr: &str, value: &str) -> Result<bool, TypeError> {
        let attr = normalize_attr(attr)?;
        let values = self.attrs.entry(attr).or_default();
        if values.iter().any(|v| v == value) {
            return Ok(false);
        }
        values.push(value.to_string());
        Ok(true)
    }

    /// Remove one value. The attribute disappears with its last value.
    /// Returns `true` if the value was present.
    pub fn remove_value(&mut self, attr: &str, value: &str) -> Result<bool, TypeError> {
        let attr = normalize_attr(attr)?;
        let Some(values) = self.attrs.get_mut(&attr) else {
            return Ok(false);
        };
        let before = values.len();
        values.retain(|v| v != value);
        let removed = values.len() < before;
        if values.is_empty() {
            self.attrs.remove(&attr);
        }
        Ok(removed)
    }

    /// Remove an attribute entirely, returning its values if present.
    pub fn remove_attribute(&mut self, attr: &str) -> Result<Option<Vec<String>>, TypeError> {
        let attr = normalize_attr(attr)?;
        Ok(self.attrs.remove(&attr))
    }

    /// Values of an attribute, if present.
    pub fn get(&self, attr: &str) -> Option<&[String]> {
        let attr = normalize_attr(attr).ok()?;
        self.attrs.get(&attr).map(Vec::as_slice)
    }

    /// The first value of an attribute, if present.
    pub fn first_value(&self, attr: &str) -> Option<&str> {
        self.get(attr).and_then(|vs| vs.first()).map(String::as_str)
    }

    /// Returns `true` if the attribute holds the exact value.
    pub fn has_value(&self, attr: &str, value: &str) -> bool {
        self.get(attr)
            .map(|vs| vs.iter().any(|v| v == value))
            .unwrap_or(false)
    }

    /// Case-insensitive value membership, used for marker values such as
    /// the alias kind.
    pub fn has_value_ignore_case(&self, attr: &str, value: &str) -> bool {
        self.get(attr)
            .map(|vs| vs.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(false)
    }

    /// Returns `true` if the attribute is present with at least one value.
    pub fn contains_attribute(&self, attr: &str) -> bool {
        self.get(attr).is_some()
    }

    /// Iterate over `(normalized name, values)` pairs in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(attr: &str, values: &[&str]) -> Entry {
        let mut e = Entry::new();
        e.set(attr, values.iter().copied()).unwrap();
        e
    }

    #[test]
    fn set_and_get() {
        let e = entry_with("mail", &["a@x", "b@x"]);
        assert_eq!(e.get("mail").unwrap(), &["a@x", "b@x"]);
        assert_eq!(e.first_value("mail"), Some("a@x"));
        assert!(e.contains_attribute("mail"));
        assert!(!e.contains_attribute("cn"));
    }

    #[test]
    fn attribute_names_are_normalized() {
        let e = entry_with(" ObjectClass ", &["person"]);
        assert!(e.contains_attribute("objectclass"));
        assert!(e.contains_attribute("OBJECTCLASS"));
    }

    #[test]
    fn set_deduplicates_preserving_order() {
        let e = entry_with("cn", &["a", "b", "a", "c", "b"]);
        assert_eq!(e.get("cn").unwrap(), &["a", "b", "c"]);
    }

    #[test]
    fn set_empty_removes_attribute() {
        let mut e = entry_with("mail", &["a@x"]);
        e.set("mail", Vec::<String>::new()).unwrap();
        assert!(!e.contains_attribute("mail"));
    }

    #[test]
    fn add_value_is_idempotent() {
        let mut e = Entry::new();
        assert!(e.add_value("mail", "a@x").unwrap());
        assert!(!e.add_value("mail", "a@x").unwrap());
        assert_eq!(e.get("mail").unwrap(), &["a@x"]);
    }

    #[test]
    fn remove_value_drops_empty_attribute() {
        let mut e = entry_with("mail", &["a@x"]);
        assert!(e.remove_value("mail", "a@x").unwrap());
        assert!(!e.contains_attribute("mail"));
        // Removing again is a no-op.
        assert!(!e.remove_value("mail", "a@x").unwrap());
    }

    #[test]
    fn remove_attribute_returns_values() {
        let mut e = entry_with("cn", &["a", "b"]);
        let removed = e.remove_attribute("cn").unwrap();
        assert_eq!(removed, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(e.remove_attribute("cn").unwrap().is_none());
    }

    #[test]
    fn value_matching_is_case_sensitive_unless_asked() {
        let e = entry_with("objectclass", &["Alias"]);
        assert!(!e.has_value("objectclass", "alias"));
        assert!(e.has_value_ignore_case("objectclass", "alias"));
        assert!(e.has_value_ignore_case("objectclass", "ALIAS"));
    }

    #[test]
    fn reject_blank_attribute_name() {
        let mut e = Entry::new();
        assert!(matches!(
            e.add_value("  ", "x"),
            Err(TypeError::InvalidAttributeName(_))
        ));
    }

    #[test]
    fn attributes_iterates_in_name_order() {
        let mut e = Entry::new();
        e.set("zz", ["1"]).unwrap();
        e.set("aa", ["2"]).unwrap();
        let names: Vec<&str> = e.attributes().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["aa", "zz"]);
    }

    #[test]
    fn serde_roundtrip() {
        let e = entry_with("mail", &["a@x", "b@x"]);
        let json = serde_json::to_string(&e).unwrap();
        let parsed: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, e);
    }
}
