//! Products and their dependencies

use serde::{Deserialize, Serialize};

use super::base::{DomainObject, Subject, Targets};
use super::requirement::{Requirement, Requirements};

/// Reference to a product at a specific version (None = trunk)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductRef {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub base: DomainObject,
    #[serde(default)]
    pub version: Option<String>,
    /// Id of the product in the JaCoCo coverage reports
    #[serde(default)]
    pub jacoco_id: Option<String>,
    /// Id of the product in the Emma coverage reports
    #[serde(default)]
    pub emma_id: Option<String>,
    #[serde(default)]
    pub responsible_teams: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<ProductRef>,
    #[serde(default)]
    pub users: Vec<ProductRef>,
    #[serde(default)]
    pub latest_release: bool,
    #[serde(default)]
    pub release_candidate: bool,
    #[serde(default)]
    pub targets: Targets,
    /// What is tracked for the product; all of them when not configured
    #[serde(default = "Requirement::product_defaults")]
    pub requirements: Requirements,
}

impl Product {
    pub fn new(name: &str, short_name: &str) -> Self {
        Self {
            base: DomainObject::new(name, short_name, ""),
            version: None,
            jacoco_id: None,
            emma_id: None,
            responsible_teams: Vec::new(),
            dependencies: Vec::new(),
            users: Vec::new(),
            latest_release: false,
            release_candidate: false,
            targets: Targets::new(),
            requirements: Requirement::product_defaults(),
        }
    }

    /// `name:version`, or `name:trunk` for unversioned products
    pub fn label(&self) -> String {
        format!(
            "{}:{}",
            self.base.name,
            self.version.as_deref().unwrap_or("trunk")
        )
    }

    pub fn version_type(&self) -> &'static str {
        if self.version.is_some() {
            "release"
        } else {
            "trunk"
        }
    }

    pub fn matches(&self, name: &str, version: Option<&str>) -> bool {
        self.base.name == name && self.version.as_deref() == version
    }

    pub fn has_requirement(&self, requirement: Requirement) -> bool {
        self.requirements.contains(&requirement)
    }
}

impl Subject for Product {
    fn domain(&self) -> &DomainObject {
        &self.base
    }

    fn targets(&self) -> &Targets {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_and_version_type() {
        let mut product = Product::new("Billing", "BI");
        assert_eq!(product.label(), "Billing:trunk");
        assert_eq!(product.version_type(), "trunk");

        product.version = Some("1.2".to_string());
        assert_eq!(product.label(), "Billing:1.2");
        assert_eq!(product.version_type(), "release");
        assert!(product.matches("Billing", Some("1.2")));
        assert!(!product.matches("Billing", None));
    }
}
