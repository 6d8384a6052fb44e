//! The project: root of the domain model

use serde::{Deserialize, Serialize};

use super::base::{DomainObject, Subject, Targets};
use super::product::Product;
use super::street::Street;
use super::team::Team;

/// External resource listed in the report header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub base: DomainObject,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub streets: Vec<Street>,
    #[serde(default)]
    pub products: Vec<Product>,
    /// Project-wide target overrides, used when a subject has none
    #[serde(default)]
    pub targets: Targets,
}

impl Project {
    pub fn new(name: &str) -> Self {
        Self {
            base: DomainObject::named(name),
            resources: Vec::new(),
            teams: Vec::new(),
            streets: Vec::new(),
            products: Vec::new(),
            targets: Targets::new(),
        }
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.base.name == name)
    }

    pub fn product(&self, name: &str, version: Option<&str>) -> Option<&Product> {
        self.products.iter().find(|p| p.matches(name, version))
    }
}

impl Subject for Project {
    fn domain(&self) -> &DomainObject {
        &self.base
    }

    fn targets(&self) -> &Targets {
        &self.targets
    }
}
