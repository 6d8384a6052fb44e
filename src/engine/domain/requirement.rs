//! Requirements
//!
//! A requirement states what is tracked for a subject. Metrics are only
//! created for the requirements a team, street or product has.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Team spirit and the age of its last measurement
    TrackSpirit,
    /// Sprint progress of the team
    TrackProgress,
    /// Failing CI jobs the team is responsible for
    TrackCiJobs,
    /// Successful runs of the street's ARTs
    TrackArtStability,
    /// ART coverage of the product
    TrackArtCoverage,
}

pub type Requirements = BTreeSet<Requirement>;

impl Requirement {
    pub fn team_defaults() -> Requirements {
        Requirements::from([
            Requirement::TrackSpirit,
            Requirement::TrackProgress,
            Requirement::TrackCiJobs,
        ])
    }

    pub fn street_defaults() -> Requirements {
        Requirements::from([Requirement::TrackArtStability])
    }

    pub fn product_defaults() -> Requirements {
        Requirements::from([Requirement::TrackArtCoverage])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_snake_case() {
        let requirements: Requirements =
            serde_json::from_str(r#"["track_ci_jobs", "track_spirit"]"#).unwrap();
        assert!(requirements.contains(&Requirement::TrackSpirit));
        assert!(requirements.contains(&Requirement::TrackCiJobs));
        assert!(!requirements.contains(&Requirement::TrackProgress));
    }

    #[test]
    fn test_defaults_per_subject() {
        assert_eq!(Requirement::team_defaults().len(), 3);
        assert!(Requirement::street_defaults().contains(&Requirement::TrackArtStability));
        assert!(Requirement::product_defaults().contains(&Requirement::TrackArtCoverage));
    }
}
