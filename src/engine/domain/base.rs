//! Shared base for all domain objects

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::engine::metric::norm::TechnicalDebtTarget;

/// Name, short name and url of an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainObject {
    pub name: String,
    /// Prefix used for metric ids in the entity's section
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub url: String,
}

impl DomainObject {
    pub fn new(name: &str, short_name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            short_name: short_name.to_string(),
            url: url.to_string(),
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(name, "", "")
    }

    /// Identifier safe to use in element ids and css classes
    pub fn id_string(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}

impl PartialEq for DomainObject {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.short_name == other.short_name && self.url == other.url
    }
}

impl Eq for DomainObject {}

impl Hash for DomainObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.short_name.hash(state);
        self.url.hash(state);
    }
}

/// Objects sort by name; short name and url only break ties
impl Ord for DomainObject {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.short_name.cmp(&other.short_name))
            .then_with(|| self.url.cmp(&other.url))
    }
}

impl PartialOrd for DomainObject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DomainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Override of a metric kind's default targets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_debt: Option<TechnicalDebtTarget>,
}

/// Target overrides keyed by metric kind name (e.g. `OpenBugs`)
pub type Targets = BTreeMap<String, TargetOverride>;

/// Anything a metric can be measured for
pub trait Subject {
    fn domain(&self) -> &DomainObject;

    fn targets(&self) -> &Targets;

    fn name(&self) -> &str {
        &self.domain().name
    }

    fn target_override(&self, kind: &str) -> Option<&TargetOverride> {
        self.targets().get(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_uses_all_fields() {
        let a = DomainObject::new("Alpha", "A", "http://a");
        let b = DomainObject::new("Alpha", "A", "http://a");
        let c = DomainObject::new("Alpha", "B", "http://a");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ordering_uses_name() {
        let a = DomainObject::new("Alpha", "Z", "");
        let b = DomainObject::new("Beta", "A", "");
        assert!(a < b);
    }

    #[test]
    fn test_ordering_consistent_with_equality() {
        let a = DomainObject::new("Alpha", "A", "http://a");
        let b = DomainObject::new("Alpha", "A", "http://b");
        assert_ne!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_id_string() {
        let team = DomainObject::named("Team Blue-2");
        assert_eq!(team.id_string(), "team_blue_2");
    }

    #[test]
    fn test_deserialize_defaults() {
        let obj: DomainObject = serde_json::from_str(r#"{"name": "Alpha"}"#).unwrap();
        assert_eq!(obj.short_name, "");
        assert_eq!(obj.url, "");
    }
}
