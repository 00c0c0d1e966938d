use serde::{Deserialize, Serialize};

/// Partition configuration.
///
/// Only the suffix is mandatory; the marker attribute names default to
/// the conventional directory vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// The namespace root this partition is responsible for, e.g.
    /// `"dc=example,dc=com"`. Every path the partition manages falls at
    /// or under it.
    pub suffix: String,

    /// The kind-marker attribute every entry must carry.
    #[serde(default = "default_kind_attribute")]
    pub kind_attribute: String,

    /// The kind-marker value that flags an entry as an alias.
    #[serde(default = "default_alias_kind_value")]
    pub alias_kind_value: String,

    /// The attribute on an alias entry holding the target path.
    #[serde(default = "default_alias_target_attribute")]
    pub alias_target_attribute: String,
}

fn default_kind_attribute() -> String {
    "objectClass".to_string()
}

fn default_alias_kind_value() -> String {
    "alias".to_string()
}

fn default_alias_target_attribute() -> String {
    "aliasedObjectName".to_string()
}

impl PartitionConfig {
    /// Configuration with default marker attributes for the given suffix.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            kind_attribute: default_kind_attribute(),
            alias_kind_value: default_alias_kind_value(),
            alias_target_attribute: default_alias_target_attribute(),
        }
    }

    /// Override the kind-marker attribute.
    pub fn with_kind_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.kind_attribute = attribute.into();
        self
    }

    /// Override the alias kind-marker value.
    pub fn with_alias_kind_value(mut self, value: impl Into<String>) -> Self {
        self.alias_kind_value = value.into();
        self
    }

    /// Override the alias target attribute.
    pub fn with_alias_target_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.alias_target_attribute = attribute.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PartitionConfig::new("dc=test");
        assert_eq!(config.suffix, "dc=test");
        assert_eq!(config.kind_attribute, "objectClass");
        assert_eq!(config.alias_kind_value, "alias");
        assert_eq!(config.alias_target_attribute, "aliasedObjectName");
    }

    #[test]
    fn builder_overrides() {
        let config = PartitionConfig::new("o=acme")
            .with_kind_attribute("kind")
            .with_alias_kind_value("link")
            .with_alias_target_attribute("linkTarget");
        assert_eq!(config.kind_attribute, "kind");
        assert_eq!(config.alias_kind_value, "link");
        assert_eq!(config.alias_target_attribute, "linkTarget");
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: PartitionConfig = serde_json::from_str(r#"{"suffix":"dc=test"}"#).unwrap();
        assert_eq!(config, PartitionConfig::new("dc=test"));
    }
}
