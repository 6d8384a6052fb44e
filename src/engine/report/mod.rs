//! Quality Report
//!
//! Groups the metrics of a project into sections per subject, numbers them
//! and derives the section colors and the overall dashboard status.

pub mod dashboard;
pub mod section;

pub use dashboard::{DashboardCell, DashboardConfig, DashboardHeader};
pub use section::{EvaluatedMetric, Section};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::config::Config;
use crate::engine::domain::{
    DomainObject, Product, Project, Requirement, Resource, Street, Subject, Team,
};
use crate::engine::history::{History, HistoryEntry, MetaTrendPoint};
use crate::engine::metric::ci::{ARTStability, AssignedCIJobs, FailingCIJobs, JobScope, ServerAvailability, UnusedCIJobs};
use crate::engine::metric::meta::{MetaKind, MetaMetric};
use crate::engine::metric::product::ARTCoverage;
use crate::engine::metric::project::{
    ActionActivity, ActionAge, BlockingTestIssues, OpenBugs, OpenSecurityBugs, ReleaseAge, RiskLog,
};
use crate::engine::metric::status::worst;
use crate::engine::metric::team::{TeamProgress, TeamSpirit, TeamSpiritAge};
use crate::engine::metric::{Metric, MetricContext, Status};
use crate::engine::source::MetricSources;

/// Number of values kept for the sparkline of a metric
pub const RECENT_VALUES: usize = 100;

pub const PROJECT_SECTION: &str = "PC";
pub const CI_SECTION: &str = "CI";
pub const META_SECTION: &str = "MM";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Duplicate section id: {0}")]
    DuplicateSection(String),
    #[error("Dashboard refers to unknown section: {0}")]
    UnknownSection(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// The evaluated report of one run
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub title: String,
    pub date: DateTime<Utc>,
    /// Worst status over all metrics except the meta metrics
    pub status: Option<Status>,
    project: Project,
    sections: Vec<Section>,
    dashboard: DashboardConfig,
    meta_trend: Vec<MetaTrendPoint>,
}

impl QualityReport {
    /// Evaluate every metric the configured sources support
    pub fn assemble(
        config: &Config,
        sources: &MetricSources,
        history: &History,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let project = &config.project;
        info!(
            project = %project.base.name,
            sources = ?sources.configured(),
            "assembling report"
        );
        let assembler = Assembler {
            config,
            sources,
            history,
            now,
        };

        let mut sections = Vec::new();
        let pc = assembler.section(
            Section::new(PROJECT_SECTION, "Project management", ""),
            assembler.project_metrics(),
        );
        if !pc.is_empty() {
            sections.push(pc);
        }
        let ci = assembler.section(
            Section::new(CI_SECTION, "Continuous integration and environment", ""),
            assembler.ci_metrics(),
        );
        if !ci.is_empty() {
            sections.push(ci);
        }
        if sources.jenkins.is_some() {
            for (index, street) in project.streets.iter().enumerate() {
                let id = format!("ST{}", index + 1);
                sections.push(assembler.section(
                    Section::new(&id, "Street", &street.base.name),
                    assembler.street_metrics(street),
                ));
            }
        }
        for team in &project.teams {
            sections.push(assembler.section(
                Section::new(&section_id(&team.base), "Team", &team.base.name),
                assembler.team_metrics(team),
            ));
        }
        for product in &project.products {
            let mut section = Section::new(&section_id(&product.base), "Product", &product.label());
            section.product = Some(product.clone());
            sections.push(assembler.section(section, assembler.product_metrics(product)));
        }

        let statuses: Vec<Status> = sections
            .iter()
            .flat_map(|s| s.metrics.iter().map(|m| m.status))
            .collect();
        let status = worst(statuses.iter().copied());
        sections.push(assembler.section(
            Section::new(META_SECTION, "Meta metrics", ""),
            assembler.meta_metrics(&statuses),
        ));

        let mut seen = BTreeSet::new();
        for section in &sections {
            if !seen.insert(section.id.as_str()) {
                return Err(ReportError::DuplicateSection(section.id.clone()));
            }
        }

        let dashboard = match &config.dashboard {
            Some(dashboard) => dashboard.clone(),
            None => DashboardConfig::default_for(&sections),
        };
        if let Some(unknown) = dashboard.section_ids().find(|id| !seen.contains(id)) {
            return Err(ReportError::UnknownSection(unknown.to_string()));
        }

        let mut meta_trend = history.meta_trend();
        if let Some(point) = current_trend_point(&sections, now) {
            meta_trend.push(point);
        }

        let report = Self {
            title: project.base.name.clone(),
            date: now,
            status,
            project: project.clone(),
            sections,
            dashboard,
            meta_trend,
        };
        info!(
            sections = report.sections.len(),
            metrics = report.metrics().count(),
            status = ?report.status,
            "report assembled"
        );
        Ok(report)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn get_section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn metrics(&self) -> impl Iterator<Item = &EvaluatedMetric> {
        self.sections.iter().flat_map(|s| s.metrics.iter())
    }

    pub fn get_metric(&self, id: &str) -> Option<&EvaluatedMetric> {
        self.metrics().find(|m| m.id == id)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn teams(&self) -> &[Team] {
        &self.project.teams
    }

    pub fn products(&self) -> &[Product] {
        &self.project.products
    }

    pub fn project_resources(&self) -> &[Resource] {
        &self.project.resources
    }

    pub fn get_product_section(&self, name: &str, version: Option<&str>) -> Option<&Section> {
        self.sections.iter().find(|s| {
            s.product
                .as_ref()
                .map_or(false, |p| p.matches(name, version))
        })
    }

    pub fn meta_section(&self) -> Option<&Section> {
        self.get_section(META_SECTION)
    }

    pub fn dashboard(&self) -> &DashboardConfig {
        &self.dashboard
    }

    /// Status percentages of earlier runs followed by this run
    pub fn meta_trend(&self) -> &[MetaTrendPoint] {
        &self.meta_trend
    }

    /// Values and statuses of this run, keyed by stable id
    pub fn history_entries(&self) -> BTreeMap<String, HistoryEntry> {
        self.metrics()
            .map(|m| {
                (
                    m.stable_id.clone(),
                    HistoryEntry {
                        value: m.value,
                        status: m.status,
                    },
                )
            })
            .collect()
    }
}

/// Short name, or the id string when no short name is configured
fn section_id(base: &DomainObject) -> String {
    if base.short_name.is_empty() {
        base.id_string()
    } else {
        base.short_name.clone()
    }
}

fn current_trend_point(sections: &[Section], now: DateTime<Utc>) -> Option<MetaTrendPoint> {
    let meta = sections.iter().find(|s| s.id == META_SECTION)?;
    let value = |kind: MetaKind| {
        meta.metrics
            .iter()
            .find(|m| m.kind == kind.kind_name())
            .and_then(|m| m.value)
    };
    Some(MetaTrendPoint {
        date: now,
        green: value(MetaKind::Green)?,
        yellow: value(MetaKind::Yellow)?,
        red: value(MetaKind::Red)?,
        grey: value(MetaKind::Grey)?,
    })
}

struct Assembler<'a> {
    config: &'a Config,
    sources: &'a MetricSources,
    history: &'a History,
    now: DateTime<Utc>,
}

impl<'a> Assembler<'a> {
    fn ctx(&self, kind: &str, subject: Option<&dyn Subject>) -> MetricContext {
        MetricContext::for_kind(self.now, kind, subject, &self.config.project.targets)
    }

    fn section(&self, mut section: Section, metrics: Vec<Box<dyn Metric>>) -> Section {
        debug!(section = %section.id, metrics = metrics.len(), "evaluating section");
        section.metrics = metrics
            .iter()
            .enumerate()
            .map(|(index, metric)| self.evaluate(&section.id, index + 1, metric.as_ref()))
            .collect();
        section
    }

    fn evaluate(&self, section_id: &str, number: usize, metric: &dyn Metric) -> EvaluatedMetric {
        let id = format!("{}-{}", section_id, number);
        let stable_id = metric.stable_id();
        let status = metric.status();
        let value = metric.numerical_value();
        if value.is_none() {
            warn!(metric = %id, kind = metric.kind(), "metric could not be measured");
        }

        let mut recent_values = self
            .history
            .recent_values(&stable_id, RECENT_VALUES.saturating_sub(1));
        if let Some(value) = value {
            recent_values.push(value);
        }
        let options = self
            .config
            .metric_options
            .get(&stable_id)
            .cloned()
            .unwrap_or_default();

        EvaluatedMetric {
            status_since: self.history.status_start_date(&stable_id, status, self.now),
            section_id: section_id.to_string(),
            kind: metric.kind().to_string(),
            subject: metric.subject_name(),
            quality_attribute: metric.quality_attribute(),
            status,
            value,
            date: metric.date(),
            report: metric.report(),
            norm: metric.norm_text(),
            urls: metric.urls(),
            url_label: metric.url_label().map(str::to_string),
            y_axis_range: metric.y_axis_range(),
            responsible_teams: metric.responsible_teams(),
            recent_values,
            comment: options.comment,
            tasks: options.tasks,
            stable_id,
            id,
        }
    }

    fn project_metrics(&self) -> Vec<Box<dyn Metric>> {
        let mut metrics: Vec<Box<dyn Metric>> = Vec::new();
        if let Some(board) = &self.sources.risk_log_board {
            metrics.push(Box::new(RiskLog::new(board.clone(), self.ctx(RiskLog::KIND, None))));
        }
        if let Some(board) = &self.sources.actions_board {
            metrics.push(Box::new(ActionActivity::new(
                board.clone(),
                self.ctx(ActionActivity::KIND, None),
            )));
            metrics.push(Box::new(ActionAge::new(board.clone(), self.ctx(ActionAge::KIND, None))));
        }
        if let Some(archive) = &self.sources.release_archive {
            metrics.push(Box::new(ReleaseAge::new(
                archive.clone(),
                self.ctx(ReleaseAge::KIND, None),
            )));
        }
        if let Some(jira) = &self.sources.jira {
            metrics.push(Box::new(OpenBugs::new(jira.clone(), self.ctx(OpenBugs::KIND, None))));
            metrics.push(Box::new(OpenSecurityBugs::new(
                jira.clone(),
                self.ctx(OpenSecurityBugs::KIND, None),
            )));
            metrics.push(Box::new(BlockingTestIssues::new(
                jira.clone(),
                self.ctx(BlockingTestIssues::KIND, None),
            )));
        }
        metrics
    }

    fn ci_metrics(&self) -> Vec<Box<dyn Metric>> {
        let mut metrics: Vec<Box<dyn Metric>> = Vec::new();
        if let Some(jenkins) = &self.sources.jenkins {
            metrics.push(Box::new(FailingCIJobs::new(
                jenkins.clone(),
                JobScope::project(),
                self.ctx(FailingCIJobs::KIND, None),
            )));
            metrics.push(Box::new(UnusedCIJobs::new(
                jenkins.clone(),
                JobScope::project(),
                self.ctx(UnusedCIJobs::KIND, None),
            )));
            metrics.push(Box::new(AssignedCIJobs::new(
                jenkins.clone(),
                self.ctx(AssignedCIJobs::KIND, None),
            )));
        }
        if let Some(nagios) = &self.sources.nagios {
            metrics.push(Box::new(ServerAvailability::new(
                nagios.clone(),
                self.ctx(ServerAvailability::KIND, None),
            )));
        }
        metrics
    }

    fn street_metrics(&self, street: &Street) -> Vec<Box<dyn Metric>> {
        let mut metrics: Vec<Box<dyn Metric>> = Vec::new();
        let jenkins = self
            .sources
            .jenkins
            .as_ref()
            .filter(|_| street.has_requirement(Requirement::TrackArtStability));
        if let Some(jenkins) = jenkins {
            metrics.push(Box::new(ARTStability::new(
                jenkins.clone(),
                street.clone(),
                self.ctx(ARTStability::KIND, Some(street as &dyn Subject)),
            )));
        }
        metrics
    }

    fn team_metrics(&self, team: &Team) -> Vec<Box<dyn Metric>> {
        let mut metrics: Vec<Box<dyn Metric>> = Vec::new();
        let birt = self.sources.birt.as_ref().filter(|_| team.tracks_progress());
        if let (Some(birt), Some(birt_id)) = (birt, &team.birt_id) {
            metrics.push(Box::new(TeamProgress::new(
                birt.clone(),
                team.clone(),
                birt_id,
                self.ctx(TeamProgress::KIND, Some(team as &dyn Subject)),
            )));
        }
        let wiki = self
            .sources
            .wiki
            .as_ref()
            .filter(|_| team.has_requirement(Requirement::TrackSpirit));
        if let Some(wiki) = wiki {
            metrics.push(Box::new(TeamSpirit::new(
                wiki.clone(),
                team.clone(),
                self.ctx(TeamSpirit::KIND, Some(team as &dyn Subject)),
            )));
            metrics.push(Box::new(TeamSpiritAge::new(
                wiki.clone(),
                team.clone(),
                self.ctx(TeamSpiritAge::KIND, Some(team as &dyn Subject)),
            )));
        }
        let jenkins = self
            .sources
            .jenkins
            .as_ref()
            .filter(|_| team.has_requirement(Requirement::TrackCiJobs));
        if let Some(jenkins) = jenkins {
            metrics.push(Box::new(FailingCIJobs::new(
                jenkins.clone(),
                JobScope::team(&team.base.name),
                self.ctx(FailingCIJobs::KIND, Some(team as &dyn Subject)),
            )));
        }
        metrics
    }

    /// JaCoCo coverage when available, Emma otherwise
    fn product_metrics(&self, product: &Product) -> Vec<Box<dyn Metric>> {
        let mut metrics: Vec<Box<dyn Metric>> = Vec::new();
        if !product.has_requirement(Requirement::TrackArtCoverage) {
            return metrics;
        }
        let coverage = match (&self.sources.jacoco, &product.jacoco_id, &self.sources.emma, &product.emma_id) {
            (Some(report), Some(id), _, _) => Some((report, id)),
            (_, _, Some(report), Some(id)) => Some((report, id)),
            _ => None,
        };
        if let Some((report, id)) = coverage {
            metrics.push(Box::new(ARTCoverage::new(
                report.clone(),
                id,
                product.clone(),
                self.ctx(ARTCoverage::KIND, Some(product as &dyn Subject)),
            )));
        }
        metrics
    }

    fn meta_metrics(&self, statuses: &[Status]) -> Vec<Box<dyn Metric>> {
        MetaKind::ALL
            .iter()
            .map(|kind| {
                Box::new(MetaMetric::new(
                    *kind,
                    statuses.to_vec(),
                    self.ctx(kind.kind_name(), None),
                )) as Box<dyn Metric>
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::history::HistoryConfig;
    use crate::engine::source::SnapshotSources;
    use chrono::TimeZone;
    use std::path::Path;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn config() -> Config {
        let mut config = Config::default_for_project("Alpha");
        config.project.teams.push(Team::new("Blue", "BL"));
        config.project.streets.push(Street::new("Main", "main-art-"));
        let mut product = Product::new("Billing", "BI");
        product.jacoco_id = Some("billing".to_string());
        config.project.products.push(product);
        config
    }

    fn sources() -> MetricSources {
        let json = r#"{
            "jira": {
                "open_bugs": {"count": 7, "url": "http://jira/bugs"},
                "open_security_bugs": {"count": 5},
                "blocking_test_issues": {"count": 0}
            },
            "jenkins": {
                "url": "http://jenkins",
                "jobs": [
                    {"name": "main-art-login", "url": "http://jenkins/job/1", "responsible": ["Blue"],
                     "last_success": "2024-03-10T06:00:00Z"}
                ]
            },
            "jacoco": {
                "url": "http://jacoco",
                "products": {"billing": {"coverage": 98, "date": "2024-03-06T12:00:00Z"}}
            }
        }"#;
        let snapshot: SnapshotSources = serde_json::from_str(json).unwrap();
        snapshot.into_metric_sources()
    }

    fn empty_history() -> History {
        History::new(Path::new("history.json"), HistoryConfig::default())
    }

    #[test]
    fn test_sections_and_ids() {
        let report = QualityReport::assemble(&config(), &sources(), &empty_history(), now()).unwrap();
        let ids: Vec<&str> = report.sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["PC", "CI", "ST1", "BL", "BI", "MM"]);

        let pc = report.get_section("PC").unwrap();
        assert_eq!(pc.metrics[0].id, "PC-1");
        assert_eq!(pc.metrics[0].kind, "OpenBugs");
        assert_eq!(pc.metrics[1].status, Status::Red);
        assert_eq!(pc.color(), "red");

        let product = report.get_product_section("Billing", None).unwrap();
        assert_eq!(product.subtitle, "Billing:trunk");
        assert_eq!(product.metrics[0].status, Status::Green);

        assert_eq!(report.meta_section().unwrap().metrics.len(), 4);
    }

    #[test]
    fn test_aggregate_status_ignores_meta_metrics() {
        let mut config = config();
        config.project.teams.clear();
        config.project.streets.clear();
        let json = r#"{"jira": {
            "open_bugs": {"count": 0},
            "open_security_bugs": {"count": 0},
            "blocking_test_issues": {"count": 0}
        }}"#;
        let sources = serde_json::from_str::<SnapshotSources>(json).unwrap().into_metric_sources();
        config.project.products.clear();

        let report = QualityReport::assemble(&config, &sources, &empty_history(), now()).unwrap();
        assert_eq!(report.status, Some(Status::Perfect));
    }

    #[test]
    fn test_history_entries_use_stable_ids() {
        let report = QualityReport::assemble(&config(), &sources(), &empty_history(), now()).unwrap();
        let entries = report.history_entries();
        assert!(entries.contains_key("OpenBugs"));
        assert!(entries.contains_key("FailingCIJobs"));
        assert!(entries.contains_key("FailingCIJobs-Blue"));
        assert!(entries.contains_key("ARTStability-Main"));
        assert!(entries.contains_key("GreenMetaMetric"));
        assert_eq!(entries["OpenBugs"].value, Some(7.0));
    }

    #[test]
    fn test_status_since_from_history() {
        let mut history = empty_history();
        let earlier = now() - chrono::Duration::days(3);
        let first = QualityReport::assemble(&config(), &sources(), &history, earlier).unwrap();
        history.add_record(earlier, first.history_entries());

        let report = QualityReport::assemble(&config(), &sources(), &history, now()).unwrap();
        let metric = report.get_metric("PC-1").unwrap();
        assert_eq!(metric.status_since.date, earlier);
        assert!(metric.status_since.is_lower_bound);
        assert_eq!(metric.recent_values, vec![7.0, 7.0]);
        assert_eq!(report.meta_trend().len(), 2);
    }

    #[test]
    fn test_unknown_dashboard_section() {
        let mut config = config();
        config.dashboard = Some(DashboardConfig {
            header: Vec::new(),
            rows: vec![vec![DashboardCell::new("XX")]],
        });
        assert!(matches!(
            QualityReport::assemble(&config, &sources(), &empty_history(), now()),
            Err(ReportError::UnknownSection(id)) if id == "XX"
        ));
    }

    #[test]
    fn test_duplicate_section_ids() {
        let mut config = config();
        config.project.teams.push(Team::new("Bleu", "BL"));
        assert!(matches!(
            QualityReport::assemble(&config, &sources(), &empty_history(), now()),
            Err(ReportError::DuplicateSection(_))
        ));
    }

    fn kinds(report: &QualityReport, section_id: &str) -> Vec<String> {
        report
            .get_section(section_id)
            .map(|s| s.metrics.iter().map(|m| m.kind.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_requirements_select_team_metrics() {
        let mut config = config();
        config.project.streets.clear();
        config.project.products.clear();
        let mut blue = Team::new("Blue", "BL").with_birt_id("blue");
        blue.requirements = crate::engine::domain::Requirements::from([Requirement::TrackCiJobs]);
        let mut ops = Team::new("Ops", "OP").with_birt_id("ops");
        ops.is_support_team = true;
        let full = Team::new("Green", "GR").with_birt_id("green");
        config.project.teams = vec![blue, ops, full];
        let json = r#"{
            "jenkins": {"url": "http://jenkins"},
            "wiki": {"url": "http://wiki"},
            "birt": {"url": "http://birt"}
        }"#;
        let sources = serde_json::from_str::<SnapshotSources>(json).unwrap().into_metric_sources();

        let report = QualityReport::assemble(&config, &sources, &empty_history(), now()).unwrap();
        assert_eq!(kinds(&report, "BL"), vec!["FailingCIJobs"]);
        assert_eq!(
            kinds(&report, "OP"),
            vec!["TeamSpirit", "TeamSpiritAge", "FailingCIJobs"]
        );
        assert_eq!(
            kinds(&report, "GR"),
            vec!["TeamProgress", "TeamSpirit", "TeamSpiritAge", "FailingCIJobs"]
        );
    }

    #[test]
    fn test_requirements_select_street_and_product_metrics() {
        let mut config = config();
        config.project.streets[0].requirements.clear();
        config.project.products[0].requirements.clear();

        let report = QualityReport::assemble(&config, &sources(), &empty_history(), now()).unwrap();
        assert!(kinds(&report, "ST1").is_empty());
        assert!(kinds(&report, "BI").is_empty());
        assert_eq!(kinds(&report, "BL"), vec!["FailingCIJobs"]);
    }

    #[test]
    fn test_metric_options() {
        let mut config = config();
        let mut options = crate::engine::config::MetricOptions::default();
        options.tasks.insert("TASK-1".to_string(), "http://tasks/1".to_string());
        config.metric_options.insert("OpenSecurityBugs".to_string(), options);

        let report = QualityReport::assemble(&config, &sources(), &empty_history(), now()).unwrap();
        let metric = report.get_metric("PC-2").unwrap();
        assert_eq!(metric.status_class(), "red_with_action");
    }
}
