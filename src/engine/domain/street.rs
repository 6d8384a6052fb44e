//! Development streets
//!
//! A street is a set of automated regression test (ART) jobs that share a
//! job name prefix in the CI server.

use serde::{Deserialize, Serialize};

use super::base::{DomainObject, Subject, Targets};
use super::requirement::{Requirement, Requirements};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Street {
    #[serde(flatten)]
    pub base: DomainObject,
    /// ART jobs whose name starts with this prefix belong to the street
    pub job_prefix: String,
    /// Max days an ART may go without a successful build
    #[serde(default = "default_target_art_stability")]
    pub target_art_stability: u32,
    /// More days than this without success is red
    #[serde(default = "default_low_target_art_stability")]
    pub low_target_art_stability: u32,
    /// All ARTs succeeded within this many days is perfect
    #[serde(default = "default_perfect_art_stability")]
    pub perfect_art_stability: u32,
    #[serde(default)]
    pub targets: Targets,
    /// What is tracked for the street; all of them when not configured
    #[serde(default = "Requirement::street_defaults")]
    pub requirements: Requirements,
}

fn default_target_art_stability() -> u32 {
    3
}

fn default_low_target_art_stability() -> u32 {
    7
}

fn default_perfect_art_stability() -> u32 {
    1
}

impl Street {
    pub fn new(name: &str, job_prefix: &str) -> Self {
        Self {
            base: DomainObject::named(name),
            job_prefix: job_prefix.to_string(),
            target_art_stability: default_target_art_stability(),
            low_target_art_stability: default_low_target_art_stability(),
            perfect_art_stability: default_perfect_art_stability(),
            targets: Targets::new(),
            requirements: Requirement::street_defaults(),
        }
    }

    pub fn has_requirement(&self, requirement: Requirement) -> bool {
        self.requirements.contains(&requirement)
    }
}

impl Subject for Street {
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
    fn test_stability_defaults() {
        let street: Street =
            serde_json::from_str(r#"{"name": "Main", "job_prefix": "main-art-"}"#).unwrap();
        assert_eq!(street.target_art_stability, 3);
        assert_eq!(street.low_target_art_stability, 7);
        assert_eq!(street.perfect_art_stability, 1);
    }
}
