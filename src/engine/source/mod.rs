//! Metric Source Layer
//!
//! Trait-based abstraction over the tracking tools metrics are fetched from.
//! Live clients live outside this crate; [`snapshot`] reads values collected
//! ahead of time.

pub mod error;
pub mod snapshot;

pub use error::{SourceError, SourceResult};
pub use snapshot::SnapshotSources;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Link label to href
pub type Urls = BTreeMap<String, String>;

/// Continuous integration server
pub trait Jenkins: Send + Sync {
    fn url(&self) -> String;

    /// Failing jobs of the given teams, or of all jobs when `teams` is empty
    fn failing_jobs(&self, teams: &[String]) -> SourceResult<Urls>;

    /// Jobs without any build in the last six months
    fn unused_jobs(&self, teams: &[String]) -> SourceResult<Urls>;

    fn number_of_jobs(&self, teams: &[String]) -> SourceResult<u64>;

    /// Jobs with at least one responsible team
    fn number_of_assigned_jobs(&self) -> SourceResult<u64>;

    fn unassigned_jobs(&self) -> SourceResult<Urls>;

    /// ART jobs matching `job_prefix` without a successful build in the last `days` days
    fn unstable_arts(&self, job_prefix: &str, days: u32, now: DateTime<Utc>) -> SourceResult<Urls>;
}

/// Issue tracker
pub trait Jira: Send + Sync {
    fn nr_open_bugs(&self) -> SourceResult<u64>;
    fn nr_open_bugs_url(&self) -> String;
    fn nr_open_security_bugs(&self) -> SourceResult<u64>;
    fn nr_open_security_bugs_url(&self) -> String;
    fn nr_blocking_test_issues(&self) -> SourceResult<u64>;
    fn nr_blocking_test_issues_url(&self) -> String;
}

/// Trello board used as risk log or action list
pub trait TrelloBoard: Send + Sync {
    fn url(&self) -> SourceResult<String>;
    fn date_of_last_update(&self) -> SourceResult<DateTime<Utc>>;
    fn nr_of_over_due_or_inactive_cards(&self) -> SourceResult<u64>;
    fn over_due_or_inactive_cards(&self) -> SourceResult<Urls>;
}

/// Server monitoring
pub trait Nagios: Send + Sync {
    fn number_of_servers_sufficiently_available(&self) -> SourceResult<u64>;
    fn number_of_servers(&self) -> SourceResult<u64>;
    fn number_of_servers_per_group(&self) -> SourceResult<BTreeMap<String, u64>>;
    fn availability_url(&self) -> String;
}

/// Wiki page where teams record their spirit
pub trait Wiki: Send + Sync {
    fn url(&self) -> String;

    /// Last smiley picked by the team, if any
    fn team_spirit(&self, team: &str) -> SourceResult<Option<String>>;

    fn date_of_last_team_spirit_measurement(&self, team: &str) -> SourceResult<Option<DateTime<Utc>>>;
}

/// Sprint progress of a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintProgress {
    pub planned_velocity: f64,
    pub required_velocity: f64,
    pub actual_velocity: f64,
    pub points_planned: f64,
    pub points_realized: f64,
    pub days_in_sprint: u32,
    pub day_in_sprint: u32,
}

/// Sprint reporting
pub trait Birt: Send + Sync {
    fn sprint_progress(&self, team_id: &str) -> SourceResult<SprintProgress>;
    fn sprint_progress_url(&self, team_id: &str) -> String;
}

/// Archive with release packages
pub trait ReleaseArchive: Send + Sync {
    fn name(&self) -> String;
    fn url(&self) -> String;
    fn date_of_most_recent_file(&self) -> SourceResult<DateTime<Utc>>;
}

/// Test coverage report (JaCoCo, Emma)
pub trait CoverageReport: Send + Sync {
    /// Tool name, used as link label
    fn name(&self) -> String;
    fn coverage(&self, product_id: &str) -> SourceResult<f64>;
    fn coverage_url(&self, product_id: &str) -> String;
    fn coverage_date(&self, product_id: &str) -> SourceResult<DateTime<Utc>>;
}

/// The sources configured for a project. Metrics are only created for
/// sources that are present.
#[derive(Clone, Default)]
pub struct MetricSources {
    pub jenkins: Option<Arc<dyn Jenkins>>,
    pub jira: Option<Arc<dyn Jira>>,
    pub risk_log_board: Option<Arc<dyn TrelloBoard>>,
    pub actions_board: Option<Arc<dyn TrelloBoard>>,
    pub nagios: Option<Arc<dyn Nagios>>,
    pub wiki: Option<Arc<dyn Wiki>>,
    pub birt: Option<Arc<dyn Birt>>,
    pub release_archive: Option<Arc<dyn ReleaseArchive>>,
    pub jacoco: Option<Arc<dyn CoverageReport>>,
    pub emma: Option<Arc<dyn CoverageReport>>,
}

impl MetricSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the configured sources, for the log
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.jenkins.is_some() {
            names.push("jenkins");
        }
        if self.jira.is_some() {
            names.push("jira");
        }
        if self.risk_log_board.is_some() {
            names.push("risk_log");
        }
        if self.actions_board.is_some() {
            names.push("actions");
        }
        if self.nagios.is_some() {
            names.push("nagios");
        }
        if self.wiki.is_some() {
            names.push("wiki");
        }
        if self.birt.is_some() {
            names.push("birt");
        }
        if self.release_archive.is_some() {
            names.push("release_archive");
        }
        if self.jacoco.is_some() {
            names.push("jacoco");
        }
        if self.emma.is_some() {
            names.push("emma");
        }
        names
    }
}
