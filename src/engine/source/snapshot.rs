//! Snapshot Sources
//!
//! Reads pre-collected tool measurements from `sources.json` in the project
//! folder and serves them through the source traits.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::error::{SourceError, SourceResult};
use super::{
    Birt, CoverageReport, Jenkins, Jira, MetricSources, Nagios, ReleaseArchive, SprintProgress,
    TrelloBoard, Urls, Wiki,
};

pub const SNAPSHOT_FILE: &str = "sources.json";

/// Contents of `sources.json`. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSources {
    #[serde(default)]
    pub jenkins: Option<JenkinsSnapshot>,
    #[serde(default)]
    pub jira: Option<JiraSnapshot>,
    #[serde(default)]
    pub risk_log: Option<TrelloSnapshot>,
    #[serde(default)]
    pub actions: Option<TrelloSnapshot>,
    #[serde(default)]
    pub nagios: Option<NagiosSnapshot>,
    #[serde(default)]
    pub wiki: Option<WikiSnapshot>,
    #[serde(default)]
    pub birt: Option<BirtSnapshot>,
    #[serde(default)]
    pub release_archive: Option<ReleaseArchiveSnapshot>,
    #[serde(default)]
    pub jacoco: Option<CoverageSnapshot>,
    #[serde(default)]
    pub emma: Option<CoverageSnapshot>,
}

impl SnapshotSources {
    /// Load the snapshot; a missing file means no sources are configured
    pub fn load(project_dir: &Path) -> SourceResult<Self> {
        let path = project_dir.join(SNAPSHOT_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no source snapshot found");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let snapshot: SnapshotSources = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    pub fn into_metric_sources(self) -> MetricSources {
        MetricSources {
            jenkins: self.jenkins.map(|s| Arc::new(s) as Arc<dyn Jenkins>),
            jira: self.jira.map(|s| Arc::new(s) as Arc<dyn Jira>),
            risk_log_board: self.risk_log.map(|s| Arc::new(s) as Arc<dyn TrelloBoard>),
            actions_board: self.actions.map(|s| Arc::new(s) as Arc<dyn TrelloBoard>),
            nagios: self.nagios.map(|s| Arc::new(s) as Arc<dyn Nagios>),
            wiki: self.wiki.map(|s| Arc::new(s) as Arc<dyn Wiki>),
            birt: self.birt.map(|s| Arc::new(s) as Arc<dyn Birt>),
            release_archive: self
                .release_archive
                .map(|s| Arc::new(s) as Arc<dyn ReleaseArchive>),
            jacoco: self.jacoco.map(|s| {
                Arc::new(s.named("JaCoCo")) as Arc<dyn CoverageReport>
            }),
            emma: self.emma.map(|s| Arc::new(s.named("Emma")) as Arc<dyn CoverageReport>),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub name: String,
    pub url: String,
    /// Teams responsible for the job
    #[serde(default)]
    pub responsible: Vec<String>,
    #[serde(default)]
    pub failing: bool,
    #[serde(default)]
    pub unused: bool,
    #[serde(default)]
    pub last_success: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    fn belongs_to(&self, teams: &[String]) -> bool {
        teams.is_empty() || self.responsible.iter().any(|r| teams.contains(r))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JenkinsSnapshot {
    pub url: String,
    #[serde(default)]
    pub jobs: Vec<JobSnapshot>,
}

impl JenkinsSnapshot {
    fn select<F>(&self, teams: &[String], filter: F) -> Urls
    where
        F: Fn(&JobSnapshot) -> bool,
    {
        self.jobs
            .iter()
            .filter(|job| job.belongs_to(teams) && filter(job))
            .map(|job| (job.name.clone(), job.url.clone()))
            .collect()
    }
}

impl Jenkins for JenkinsSnapshot {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn failing_jobs(&self, teams: &[String]) -> SourceResult<Urls> {
        Ok(self.select(teams, |job| job.failing))
    }

    fn unused_jobs(&self, teams: &[String]) -> SourceResult<Urls> {
        Ok(self.select(teams, |job| job.unused))
    }

    fn number_of_jobs(&self, teams: &[String]) -> SourceResult<u64> {
        Ok(self.jobs.iter().filter(|job| job.belongs_to(teams)).count() as u64)
    }

    fn number_of_assigned_jobs(&self) -> SourceResult<u64> {
        Ok(self.jobs.iter().filter(|job| !job.responsible.is_empty()).count() as u64)
    }

    fn unassigned_jobs(&self) -> SourceResult<Urls> {
        Ok(self.select(&[], |job| job.responsible.is_empty()))
    }

    fn unstable_arts(&self, job_prefix: &str, days: u32, now: DateTime<Utc>) -> SourceResult<Urls> {
        let window = Duration::days(i64::from(days));
        Ok(self.select(&[], |job| {
            job.name.starts_with(job_prefix)
                && job.last_success.map_or(true, |last| now - last > window)
        }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySnapshot {
    pub count: u64,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSnapshot {
    pub open_bugs: QuerySnapshot,
    pub open_security_bugs: QuerySnapshot,
    pub blocking_test_issues: QuerySnapshot,
}

impl Jira for JiraSnapshot {
    fn nr_open_bugs(&self) -> SourceResult<u64> {
        Ok(self.open_bugs.count)
    }

    fn nr_open_bugs_url(&self) -> String {
        self.open_bugs.url.clone()
    }

    fn nr_open_security_bugs(&self) -> SourceResult<u64> {
        Ok(self.open_security_bugs.count)
    }

    fn nr_open_security_bugs_url(&self) -> String {
        self.open_security_bugs.url.clone()
    }

    fn nr_blocking_test_issues(&self) -> SourceResult<u64> {
        Ok(self.blocking_test_issues.count)
    }

    fn nr_blocking_test_issues_url(&self) -> String {
        self.blocking_test_issues.url.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloSnapshot {
    pub url: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    /// Card name to card url
    #[serde(default)]
    pub over_due_or_inactive_cards: Urls,
    /// The board could not be read when the snapshot was taken
    #[serde(default)]
    pub unreachable: bool,
}

impl TrelloSnapshot {
    fn reachable(&self) -> SourceResult<()> {
        if self.unreachable {
            return Err(SourceError::Unreachable("Trello".to_string()));
        }
        Ok(())
    }
}

impl TrelloBoard for TrelloSnapshot {
    fn url(&self) -> SourceResult<String> {
        self.reachable()?;
        Ok(self.url.clone())
    }

    fn date_of_last_update(&self) -> SourceResult<DateTime<Utc>> {
        self.reachable()?;
        self.last_update
            .ok_or_else(|| SourceError::NoMeasurement("Trello board last update".to_string()))
    }

    fn nr_of_over_due_or_inactive_cards(&self) -> SourceResult<u64> {
        self.reachable()?;
        Ok(self.over_due_or_inactive_cards.len() as u64)
    }

    fn over_due_or_inactive_cards(&self) -> SourceResult<Urls> {
        self.reachable()?;
        Ok(self.over_due_or_inactive_cards.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSnapshot {
    pub name: String,
    pub group: String,
    pub sufficiently_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NagiosSnapshot {
    pub url: String,
    #[serde(default)]
    pub servers: Vec<ServerSnapshot>,
}

impl Nagios for NagiosSnapshot {
    fn number_of_servers_sufficiently_available(&self) -> SourceResult<u64> {
        Ok(self.servers.iter().filter(|s| s.sufficiently_available).count() as u64)
    }

    fn number_of_servers(&self) -> SourceResult<u64> {
        Ok(self.servers.len() as u64)
    }

    fn number_of_servers_per_group(&self) -> SourceResult<BTreeMap<String, u64>> {
        let mut groups = BTreeMap::new();
        for server in &self.servers {
            *groups.entry(server.group.clone()).or_insert(0) += 1;
        }
        Ok(groups)
    }

    fn availability_url(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiritSnapshot {
    pub smiley: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSnapshot {
    pub url: String,
    /// Team name to latest spirit measurement
    #[serde(default)]
    pub team_spirit: BTreeMap<String, SpiritSnapshot>,
}

impl Wiki for WikiSnapshot {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn team_spirit(&self, team: &str) -> SourceResult<Option<String>> {
        Ok(self.team_spirit.get(team).map(|s| s.smiley.clone()))
    }

    fn date_of_last_team_spirit_measurement(&self, team: &str) -> SourceResult<Option<DateTime<Utc>>> {
        Ok(self.team_spirit.get(team).and_then(|s| s.date))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirtSnapshot {
    pub url: String,
    /// BIRT team id to sprint progress
    #[serde(default)]
    pub sprints: BTreeMap<String, SprintProgress>,
}

impl Birt for BirtSnapshot {
    fn sprint_progress(&self, team_id: &str) -> SourceResult<SprintProgress> {
        self.sprints
            .get(team_id)
            .cloned()
            .ok_or_else(|| SourceError::UnknownId {
                source_name: "BIRT".to_string(),
                id: team_id.to_string(),
            })
    }

    fn sprint_progress_url(&self, team_id: &str) -> String {
        format!("{}?team={}", self.url, team_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseArchiveSnapshot {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub most_recent_file: Option<DateTime<Utc>>,
}

impl ReleaseArchive for ReleaseArchiveSnapshot {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn date_of_most_recent_file(&self) -> SourceResult<DateTime<Utc>> {
        self.most_recent_file
            .ok_or_else(|| SourceError::NoMeasurement(format!("release archive {}", self.name)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCoverageSnapshot {
    pub coverage: f64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSnapshot {
    pub url: String,
    /// Product id to coverage
    #[serde(default)]
    pub products: BTreeMap<String, ProductCoverageSnapshot>,
    #[serde(skip)]
    tool: String,
}

impl CoverageSnapshot {
    fn named(mut self, tool: &str) -> Self {
        self.tool = tool.to_string();
        self
    }

    fn product(&self, product_id: &str) -> SourceResult<&ProductCoverageSnapshot> {
        self.products.get(product_id).ok_or_else(|| SourceError::UnknownId {
            source_name: self.tool.clone(),
            id: product_id.to_string(),
        })
    }
}

impl CoverageReport for CoverageSnapshot {
    fn name(&self) -> String {
        self.tool.clone()
    }

    fn coverage(&self, product_id: &str) -> SourceResult<f64> {
        Ok(self.product(product_id)?.coverage)
    }

    fn coverage_url(&self, product_id: &str) -> String {
        self.products
            .get(product_id)
            .and_then(|p| p.url.clone())
            .unwrap_or_else(|| self.url.clone())
    }

    fn coverage_date(&self, product_id: &str) -> SourceResult<DateTime<Utc>> {
        Ok(self.product(product_id)?.date)
    }
}
