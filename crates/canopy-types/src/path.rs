//! Hierarchical paths.
//!
//! A [`Dn`] names an entry's position in the tree as a comma-separated,
//! leaf-first list of `attr=value` components: in `"ou=people,dc=test"`
//! the leaf is `ou=people` and `dc=test` is the topmost ancestor.
//!
//! Every path carries two renderings: the user-supplied text exactly as
//! it was given (modulo surrounding whitespace per component) and the
//! normalized text used for equality, ordering, and index keys
//! (lowercased, no whitespace around `=` or `,`).
//!
//! `,` and `=` are hard separators; escaped separators inside component
//! values are not supported at this layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A single `attr=value` path component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rdn {
    attr: String,
    value: String,
    user: String,
}

impl Rdn {
    /// Parse one component. The attribute name and value are trimmed and
    /// lowercased for the normalized form; the user form keeps the
    /// original text with surrounding whitespace removed.
    pub fn parse(text: &str) -> Result<Rdn, TypeError> {
        let user = text.trim();
        let (attr, value) = user.split_once('=').ok_or_else(|| TypeError::InvalidComponent {
            component: text.to_string(),
            reason: "missing '=' separator".into(),
        })?;

        let attr = attr.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        if attr.is_empty() {
            return Err(TypeError::InvalidComponent {
                component: text.to_string(),
                reason: "empty attribute name".into(),
            });
        }
        if value.is_empty() {
            return Err(TypeError::InvalidComponent {
                component: text.to_string(),
                reason: "empty value".into(),
            });
        }

        Ok(Rdn {
            attr,
            value,
            user: user.to_string(),
        })
    }

    /// Normalized attribute name.
    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// Normalized value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The user-supplied component text.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The normalized `attr=value` rendering.
    pub fn normalized(&self) -> String {
        format!("{}={}", self.attr, self.value)
    }

    /// Normalized equality with another component.
    pub fn matches(&self, other: &Rdn) -> bool {
        self.attr == other.attr && self.value == other.value
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user)
    }
}

/// A hierarchical path: leaf-first component list plus cached renderings.
///
/// Equality, ordering, and hashing all use the normalized rendering, so
/// `"OU = People , DC = Test"` and `"ou=people,dc=test"` name the same
/// entry.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dn {
    components: Vec<Rdn>,
    user: String,
    normalized: String,
}

impl Dn {
    /// Parse a path from its textual form.
    pub fn parse(text: &str) -> Result<Dn, TypeError> {
        if text.trim().is_empty() {
            return Err(TypeError::InvalidPath {
                path: text.to_string(),
                reason: "empty path".into(),
            });
        }
        let components = text
            .split(',')
            .map(Rdn::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TypeError::InvalidPath {
                path: text.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Dn::from_components(components))
    }

    /// Build a path from leaf-first components. Must be non-empty.
    fn from_components(components: Vec<Rdn>) -> Dn {
        debug_assert!(!components.is_empty());
        let user = components
            .iter()
            .map(Rdn::user)
            .collect::<Vec<_>>()
            .join(",");
        let normalized = components
            .iter()
            .map(|r| r.normalized())
            .collect::<Vec<_>>()
            .join(",");
        Dn {
            components,
            user,
            normalized,
        }
    }

    /// The normalized rendering (index key form).
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The user-supplied rendering.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Paths are never empty; present for clippy symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The leaf component.
    pub fn rdn(&self) -> &Rdn {
        &self.components[0]
    }

    /// The parent path, or `None` for a single-component path.
    pub fn parent(&self) -> Option<Dn> {
        if self.components.len() == 1 {
            return None;
        }
        Some(Dn::from_components(self.components[1..].to_vec()))
    }

    /// Returns `true` if `self` is strictly below `ancestor` in the tree.
    pub fn is_descendant_of(&self, ancestor: &Dn) -> bool {
        if self.components.len() <= ancestor.components.len() {
            return false;
        }
        let offset = self.components.len() - ancestor.components.len();
        self.components[offset..]
            .iter()
            .zip(&ancestor.components)
            .all(|(a, b)| a.matches(b))
    }

    /// Returns `true` if `self` equals `ancestor` or lies below it.
    pub fn is_equal_or_descendant_of(&self, ancestor: &Dn) -> bool {
        self == ancestor || self.is_descendant_of(ancestor)
    }

    /// Returns `true` if both paths share the same immediate parent.
    pub fn is_sibling_of(&self, other: &Dn) -> bool {
        match (self.parent(), other.parent()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }

    /// Replace the leaf component, keeping the rest of the path.
    pub fn with_rdn(&self, rdn: Rdn) -> Dn {
        let mut components = self.components.clone();
        components[0] = rdn;
        Dn::from_components(components)
    }

    /// The path of a child of `self` with the given leaf component.
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.push(rdn);
        components.extend(self.components.iter().cloned());
        Dn::from_components(components)
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for Dn {}

impl std::hash::Hash for Dn {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialOrd for Dn {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dn {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl fmt::Debug for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dn({})", self.normalized)
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user)
    }
}

impl std::str::FromStr for Dn {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dn::parse(s)
    }
}

impl TryFrom<String> for Dn {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Dn::parse(&s)
    }
}

impl From<Dn> for String {
    fn from(dn: Dn) -> String {
        dn.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dn(s: &str) -> Dn {
        Dn::parse(s).unwrap()
    }

    #[test]
    fn parse_single_component() {
        let d = dn("dc=test");
        assert_eq!(d.len(), 1);
        assert_eq!(d.normalized(), "dc=test");
        assert_eq!(d.rdn().attr(), "dc");
        assert_eq!(d.rdn().value(), "test");
        assert!(d.parent().is_none());
    }

    #[test]
    fn parse_nested_path_is_leaf_first() {
        let d = dn("cn=alice,ou=people,dc=test");
        assert_eq!(d.len(), 3);
        assert_eq!(d.rdn().normalized(), "cn=alice");
        assert_eq!(d.parent().unwrap().normalized(), "ou=people,dc=test");
    }

    #[test]
    fn normalization_lowercases_and_strips_whitespace() {
        let d = dn("OU = People , DC = Test");
        assert_eq!(d.normalized(), "ou=people,dc=test");
        // User form keeps the original component text.
        assert_eq!(d.user(), "OU = People,DC = Test");
    }

    #[test]
    fn equality_is_normalized() {
        assert_eq!(dn("OU=People,DC=Test"), dn("ou=people,dc=test"));
        assert_ne!(dn("ou=people,dc=test"), dn("ou=groups,dc=test"));
    }

    #[test]
    fn reject_empty_path() {
        assert!(matches!(
            Dn::parse(""),
            Err(TypeError::InvalidPath { .. })
        ));
        assert!(Dn::parse("   ").is_err());
    }

    #[test]
    fn reject_missing_separator() {
        assert!(Dn::parse("nodelimiter").is_err());
        assert!(Dn::parse("cn=ok,bad").is_err());
    }

    #[test]
    fn reject_empty_attr_or_value() {
        assert!(Dn::parse("=value").is_err());
        assert!(Dn::parse("cn=").is_err());
        assert!(Dn::parse("cn=a,,dc=test").is_err());
    }

    #[test]
    fn descendant_checks() {
        let root = dn("dc=test");
        let people = dn("ou=people,dc=test");
        let alice = dn("cn=alice,ou=people,dc=test");

        assert!(people.is_descendant_of(&root));
        assert!(alice.is_descendant_of(&root));
        assert!(alice.is_descendant_of(&people));
        assert!(!root.is_descendant_of(&people));
        assert!(!people.is_descendant_of(&people));
        assert!(people.is_equal_or_descendant_of(&people));
        // Same depth, different branch.
        assert!(!dn("ou=people,dc=other").is_descendant_of(&root));
    }

    #[test]
    fn descendant_requires_full_component_match() {
        // "dc=test" must not be treated as an ancestor of "dc=testing".
        assert!(!dn("cn=a,dc=testing").is_descendant_of(&dn("dc=test")));
    }

    #[test]
    fn sibling_checks() {
        let a = dn("cn=a,dc=test");
        let b = dn("cn=b,dc=test");
        let deep = dn("cn=c,ou=people,dc=test");
        assert!(a.is_sibling_of(&b));
        assert!(!a.is_sibling_of(&deep));
        assert!(dn("dc=x").is_sibling_of(&dn("dc=y")));
    }

    #[test]
    fn with_rdn_replaces_leaf() {
        let d = dn("cn=old,ou=people,dc=test");
        let renamed = d.with_rdn(Rdn::parse("cn=new").unwrap());
        assert_eq!(renamed.normalized(), "cn=new,ou=people,dc=test");
    }

    #[test]
    fn child_prepends_leaf() {
        let parent = dn("ou=people,dc=test");
        let child = parent.child(Rdn::parse("cn=alice").unwrap());
        assert_eq!(child.normalized(), "cn=alice,ou=people,dc=test");
        assert!(child.is_descendant_of(&parent));
    }

    #[test]
    fn serde_roundtrip_via_user_string() {
        let d = dn("CN=Alice,ou=people,dc=test");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"CN=Alice,ou=people,dc=test\"");
        let parsed: Dn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn component() -> impl Strategy<Value = String> {
            ("[a-zA-Z]{1,8}", "[a-zA-Z0-9 ]{0,6}[a-zA-Z0-9]").prop_map(|(a, v)| format!("{a}={v}"))
        }

        fn path_text() -> impl Strategy<Value = String> {
            prop::collection::vec(component(), 1..6).prop_map(|cs| cs.join(","))
        }

        proptest! {
            #[test]
            fn normalization_is_idempotent(text in path_text()) {
                let first = Dn::parse(&text).unwrap();
                let second = Dn::parse(first.normalized()).unwrap();
                prop_assert_eq!(first.normalized(), second.normalized());
            }

            #[test]
            fn parent_child_roundtrip(text in path_text(), leaf in component()) {
                let parent = Dn::parse(&text).unwrap();
                let child = parent.child(Rdn::parse(&leaf).unwrap());
                prop_assert_eq!(child.parent().unwrap(), parent.clone());
                prop_assert!(child.is_descendant_of(&parent));
            }

            #[test]
            fn case_never_affects_equality(text in path_text()) {
                let lower = Dn::parse(&text.to_ascii_lowercase()).unwrap();
                let upper = Dn::parse(&text.to_ascii_uppercase()).unwrap();
                prop_assert_eq!(lower, upper);
            }
        }
    }
}
