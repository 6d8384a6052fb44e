//! Development teams

use serde::{Deserialize, Serialize};

use super::base::{DomainObject, Subject, Targets};
use super::requirement::{Requirement, Requirements};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(flatten)]
    pub base: DomainObject,
    /// Team id in the sprint progress reports
    #[serde(default)]
    pub birt_id: Option<String>,
    #[serde(default)]
    pub is_support_team: bool,
    #[serde(default)]
    pub targets: Targets,
    /// What is tracked for the team; all of them when not configured
    #[serde(default = "Requirement::team_defaults")]
    pub requirements: Requirements,
}

impl Team {
    pub fn new(name: &str, short_name: &str) -> Self {
        Self {
            base: DomainObject::new(name, short_name, ""),
            birt_id: None,
            is_support_team: false,
            targets: Targets::new(),
            requirements: Requirement::team_defaults(),
        }
    }

    pub fn with_birt_id(mut self, birt_id: &str) -> Self {
        self.birt_id = Some(birt_id.to_string());
        self
    }

    pub fn id_string(&self) -> String {
        self.base.id_string()
    }

    pub fn has_requirement(&self, requirement: Requirement) -> bool {
        self.requirements.contains(&requirement)
    }

    /// Never true for support teams
    pub fn tracks_progress(&self) -> bool {
        !self.is_support_team && self.has_requirement(Requirement::TrackProgress)
    }
}

impl Subject for Team {
    fn domain(&self) -> &DomainObject {
        &self.base
    }

    fn targets(&self) -> &Targets {
        &self.targets
    }
}
