//! Continuous integration and environment metrics

use std::sync::Arc;

use super::norm::{classify, format_value, percentage, Norm};
use super::quality_attribute::{ENVIRONMENT_QUALITY, TEST_QUALITY};
use super::{measured, Metric, MetricContext, QualityAttribute, Status};
use crate::engine::domain::Street;
use crate::engine::source::{Jenkins, Nagios, Urls};

fn jenkins_url(jenkins: &dyn Jenkins) -> Urls {
    Urls::from([("Jenkins".to_string(), jenkins.url())])
}

/// Number of ARTs in a street without a recent successful run
pub struct ARTStability {
    jenkins: Arc<dyn Jenkins>,
    street: Street,
    ctx: MetricContext,
}

impl ARTStability {
    pub const KIND: &'static str = "ARTStability";

    pub fn new(jenkins: Arc<dyn Jenkins>, street: Street, ctx: MetricContext) -> Self {
        Self {
            jenkins,
            street,
            ctx,
        }
    }

    fn unstable_arts(&self, days: f64) -> Option<Urls> {
        measured(
            Self::KIND,
            self.jenkins
                .unstable_arts(&self.street.job_prefix, days.max(0.0) as u32, self.ctx.now),
        )
    }

    fn unstable_count(&self, days: f64) -> Option<f64> {
        self.unstable_arts(days).map(|arts| arts.len() as f64)
    }
}

impl Metric for ARTStability {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn subject_name(&self) -> Option<String> {
        Some(self.street.base.name.clone())
    }

    fn quality_attribute(&self) -> QualityAttribute {
        TEST_QUALITY
    }

    /// Targets are days without a successful run, not counts
    fn norm(&self) -> Norm {
        let mut norm = self.ctx.apply(Norm::lower_is_better(
            f64::from(self.street.target_art_stability),
            f64::from(self.street.low_target_art_stability),
        ));
        norm.perfect = Some(f64::from(self.street.perfect_art_stability));
        norm
    }

    fn value(&self) -> Option<f64> {
        self.unstable_count(self.norm().target)
    }

    fn status(&self) -> Status {
        let norm = self.norm();
        let (Some(at_target), Some(at_low_target)) =
            (self.unstable_count(norm.target), self.unstable_count(norm.low_target))
        else {
            return Status::Red;
        };
        let perfect = norm
            .perfect
            .and_then(|days| self.unstable_count(days))
            .map_or(false, |count| count == 0.0);
        let debt_applies = norm
            .technical_debt
            .as_ref()
            .map_or(false, |debt| at_target <= debt.target);
        classify(at_target > 0.0, at_low_target > 0.0, perfect, debt_applies)
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "All ARTs have had at least one successful test run in the last {} days. Not succeeded in more than {} days is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        let days = self.norm().target;
        match self.value() {
            Some(count) => format!(
                "{} of the ARTs of street {} have not had a successful test run in the last {} days.",
                count,
                self.street.base.name,
                format_value(days)
            ),
            None => format!(
                "The stability of the ARTs of street {} could not be determined.",
                self.street.base.name
            ),
        }
    }

    fn urls(&self) -> Urls {
        match self.unstable_arts(self.norm().target) {
            Some(arts) if !arts.is_empty() => arts,
            _ => jenkins_url(self.jenkins.as_ref()),
        }
    }

    fn url_label(&self) -> Option<&'static str> {
        Some("Unstable ARTs")
    }
}

/// Which jobs a job count metric looks at
#[derive(Debug, Clone, Default)]
pub struct JobScope {
    /// Team name the metric is reported for, None for the whole project
    pub team: Option<String>,
    /// Teams whose jobs are counted; empty means all jobs
    pub teams: Vec<String>,
}

impl JobScope {
    pub fn project() -> Self {
        Self::default()
    }

    pub fn team(name: &str) -> Self {
        Self {
            team: Some(name.to_string()),
            teams: vec![name.to_string()],
        }
    }
}

/// Number of failing CI jobs
pub struct FailingCIJobs {
    jenkins: Arc<dyn Jenkins>,
    scope: JobScope,
    ctx: MetricContext,
}

impl FailingCIJobs {
    pub const KIND: &'static str = "FailingCIJobs";

    pub fn new(jenkins: Arc<dyn Jenkins>, scope: JobScope, ctx: MetricContext) -> Self {
        Self {
            jenkins,
            scope,
            ctx,
        }
    }

    fn failing_jobs(&self) -> Option<Urls> {
        measured(Self::KIND, self.jenkins.failing_jobs(&self.scope.teams))
    }
}

impl Metric for FailingCIJobs {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn subject_name(&self) -> Option<String> {
        self.scope.team.clone()
    }

    fn quality_attribute(&self) -> QualityAttribute {
        ENVIRONMENT_QUALITY
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(0.0, 2.0))
    }

    fn value(&self) -> Option<f64> {
        self.failing_jobs().map(|jobs| jobs.len() as f64)
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "Maximum number of failing CI jobs is {}. More than {} failing jobs is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        let total = measured(Self::KIND, self.jenkins.number_of_jobs(&self.scope.teams));
        match (self.value(), total) {
            (Some(failing), Some(total)) => {
                format!("{} of the {} CI jobs are failing.", failing, total)
            }
            _ => "The number of failing CI jobs could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        match self.failing_jobs() {
            Some(jobs) if !jobs.is_empty() => jobs,
            _ => jenkins_url(self.jenkins.as_ref()),
        }
    }

    fn url_label(&self) -> Option<&'static str> {
        Some("Failing jobs")
    }

    fn responsible_teams(&self) -> Vec<String> {
        self.scope.teams.clone()
    }
}

/// Number of CI jobs without builds in the last six months
pub struct UnusedCIJobs {
    jenkins: Arc<dyn Jenkins>,
    scope: JobScope,
    ctx: MetricContext,
}

impl UnusedCIJobs {
    pub const KIND: &'static str = "UnusedCIJobs";

    pub fn new(jenkins: Arc<dyn Jenkins>, scope: JobScope, ctx: MetricContext) -> Self {
        Self {
            jenkins,
            scope,
            ctx,
        }
    }

    fn unused_jobs(&self) -> Option<Urls> {
        measured(Self::KIND, self.jenkins.unused_jobs(&self.scope.teams))
    }
}

impl Metric for UnusedCIJobs {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn subject_name(&self) -> Option<String> {
        self.scope.team.clone()
    }

    fn quality_attribute(&self) -> QualityAttribute {
        ENVIRONMENT_QUALITY
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(0.0, 2.0))
    }

    fn value(&self) -> Option<f64> {
        self.unused_jobs().map(|jobs| jobs.len() as f64)
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "Maximum number of unused CI jobs is {}. More than {} unused jobs is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        let total = measured(Self::KIND, self.jenkins.number_of_jobs(&self.scope.teams));
        match (self.value(), total) {
            (Some(unused), Some(total)) => format!(
                "{} of the {} CI jobs are unused (no builds in the last six months).",
                unused, total
            ),
            _ => "The number of unused CI jobs could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        match self.unused_jobs() {
            Some(jobs) if !jobs.is_empty() => jobs,
            _ => jenkins_url(self.jenkins.as_ref()),
        }
    }

    fn url_label(&self) -> Option<&'static str> {
        Some("Unused jobs")
    }

    fn responsible_teams(&self) -> Vec<String> {
        self.scope.teams.clone()
    }
}

/// Percentage of CI jobs with a responsible team
pub struct AssignedCIJobs {
    jenkins: Arc<dyn Jenkins>,
    ctx: MetricContext,
}

impl AssignedCIJobs {
    pub const KIND: &'static str = "AssignedCIJobs";

    pub fn new(jenkins: Arc<dyn Jenkins>, ctx: MetricContext) -> Self {
        Self { jenkins, ctx }
    }

    fn counts(&self) -> Option<(u64, u64)> {
        let assigned = measured(Self::KIND, self.jenkins.number_of_assigned_jobs())?;
        let total = measured(Self::KIND, self.jenkins.number_of_jobs(&[]))?;
        Some((assigned, total))
    }
}

impl Metric for AssignedCIJobs {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        ENVIRONMENT_QUALITY
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::higher_percentage_is_better(95.0, 90.0))
    }

    fn value(&self) -> Option<f64> {
        self.counts()
            .map(|(assigned, total)| percentage(assigned, total))
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "Minimum percentage of CI jobs assigned to a team is {}%. Less than {}% is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match self.counts() {
            Some((assigned, total)) => format!(
                "{} of the {} CI jobs are assigned to a team ({}%).",
                assigned,
                total,
                format_value(percentage(assigned, total))
            ),
            None => "The number of assigned CI jobs could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        match measured(Self::KIND, self.jenkins.unassigned_jobs()) {
            Some(jobs) if !jobs.is_empty() => jobs,
            _ => jenkins_url(self.jenkins.as_ref()),
        }
    }

    fn url_label(&self) -> Option<&'static str> {
        Some("Unassigned jobs")
    }
}

/// Percentage of servers that are sufficiently available
pub struct ServerAvailability {
    nagios: Arc<dyn Nagios>,
    ctx: MetricContext,
}

impl ServerAvailability {
    pub const KIND: &'static str = "ServerAvailability";

    pub fn new(nagios: Arc<dyn Nagios>, ctx: MetricContext) -> Self {
        Self { nagios, ctx }
    }

    fn counts(&self) -> Option<(u64, u64)> {
        let available = measured(
            Self::KIND,
            self.nagios.number_of_servers_sufficiently_available(),
        )?;
        let total = measured(Self::KIND, self.nagios.number_of_servers())?;
        Some((available, total))
    }
}

impl Metric for ServerAvailability {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        ENVIRONMENT_QUALITY
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::higher_percentage_is_better(99.0, 90.0))
    }

    fn value(&self) -> Option<f64> {
        self.counts()
            .map(|(available, total)| percentage(available, total))
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "Minimum percentage of sufficiently available servers is {}%. Less than {}% is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        let Some((available, total)) = self.counts() else {
            return "The availability of the servers could not be determined.".to_string();
        };
        let mut text = format!(
            "{} of the {} servers are sufficiently available.",
            available, total
        );
        if let Some(groups) = measured(Self::KIND, self.nagios.number_of_servers_per_group()) {
            if !groups.is_empty() {
                let per_group: Vec<String> = groups
                    .iter()
                    .map(|(group, count)| format!("{}: {}", group, count))
                    .collect();
                text.push_str(&format!(" Servers per group: {}.", per_group.join(", ")));
            }
        }
        text
    }

    fn urls(&self) -> Urls {
        Urls::from([("Nagios".to_string(), self.nagios.availability_url())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::source::{SourceError, SourceResult};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    /// Jenkins with a fixed number of unstable ARTs per window size
    struct FakeJenkins {
        unstable_per_window: BTreeMap<u32, usize>,
        failing: usize,
        unused: usize,
        total: u64,
        assigned: u64,
    }

    impl FakeJenkins {
        fn new() -> Self {
            Self {
                unstable_per_window: BTreeMap::new(),
                failing: 2,
                unused: 1,
                total: 10,
                assigned: 9,
            }
        }

        fn jobs(count: usize) -> Urls {
            (0..count)
                .map(|i| (format!("job{}", i), format!("http://jenkins/job{}", i)))
                .collect()
        }
    }

    impl Jenkins for FakeJenkins {
        fn url(&self) -> String {
            "http://jenkins".to_string()
        }

        fn failing_jobs(&self, _teams: &[String]) -> SourceResult<Urls> {
            Ok(Self::jobs(self.failing))
        }

        fn unused_jobs(&self, _teams: &[String]) -> SourceResult<Urls> {
            Ok(Self::jobs(self.unused))
        }

        fn number_of_jobs(&self, _teams: &[String]) -> SourceResult<u64> {
            Ok(self.total)
        }

        fn number_of_assigned_jobs(&self) -> SourceResult<u64> {
            Ok(self.assigned)
        }

        fn unassigned_jobs(&self) -> SourceResult<Urls> {
            Ok(Self::jobs((self.total - self.assigned) as usize))
        }

        fn unstable_arts(&self, _job_prefix: &str, days: u32, _now: DateTime<Utc>) -> SourceResult<Urls> {
            Ok(Self::jobs(
                self.unstable_per_window.get(&days).copied().unwrap_or(0),
            ))
        }
    }

    struct DownJenkins;

    impl Jenkins for DownJenkins {
        fn url(&self) -> String {
            "http://jenkins".to_string()
        }

        fn failing_jobs(&self, _teams: &[String]) -> SourceResult<Urls> {
            Err(SourceError::Unreachable("Jenkins".to_string()))
        }

        fn unused_jobs(&self, _teams: &[String]) -> SourceResult<Urls> {
            Err(SourceError::Unreachable("Jenkins".to_string()))
        }

        fn number_of_jobs(&self, _teams: &[String]) -> SourceResult<u64> {
            Err(SourceError::Unreachable("Jenkins".to_string()))
        }

        fn number_of_assigned_jobs(&self) -> SourceResult<u64> {
            Err(SourceError::Unreachable("Jenkins".to_string()))
        }

        fn unassigned_jobs(&self) -> SourceResult<Urls> {
            Err(SourceError::Unreachable("Jenkins".to_string()))
        }

        fn unstable_arts(&self, _job_prefix: &str, _days: u32, _now: DateTime<Utc>) -> SourceResult<Urls> {
            Err(SourceError::Unreachable("Jenkins".to_string()))
        }
    }

    fn art_stability(unstable: &[(u32, usize)]) -> ARTStability {
        let mut jenkins = FakeJenkins::new();
        jenkins.unstable_per_window = unstable.iter().copied().collect();
        ARTStability::new(
            Arc::new(jenkins),
            Street::new("Main", "main-art-"),
            MetricContext::new(now()),
        )
    }

    #[test]
    fn test_art_stability_perfect() {
        let metric = art_stability(&[]);
        assert_eq!(metric.value(), Some(0.0));
        assert_eq!(metric.status(), Status::Perfect);
        assert_eq!(metric.stable_id(), "ARTStability-Main");
    }

    #[test]
    fn test_art_stability_green_when_recently_failed() {
        // One ART failed in the last day but succeeded within three days
        let metric = art_stability(&[(1, 1)]);
        assert_eq!(metric.status(), Status::Green);
    }

    #[test]
    fn test_art_stability_yellow_and_red() {
        assert_eq!(art_stability(&[(1, 1), (3, 1)]).status(), Status::Yellow);
        assert_eq!(art_stability(&[(1, 2), (3, 2), (7, 1)]).status(), Status::Red);
    }

    #[test]
    fn test_art_stability_unreachable() {
        let metric = ARTStability::new(
            Arc::new(DownJenkins),
            Street::new("Main", "main-art-"),
            MetricContext::new(now()),
        );
        assert_eq!(metric.value(), None);
        assert_eq!(metric.status(), Status::Red);
        assert_eq!(metric.urls()["Jenkins"], "http://jenkins");
    }

    #[test]
    fn test_art_stability_report() {
        let metric = art_stability(&[(3, 2)]);
        assert_eq!(
            metric.report(),
            "2 of the ARTs of street Main have not had a successful test run in the last 3 days."
        );
        assert_eq!(metric.urls().len(), 2);
        assert_eq!(metric.quality_attribute(), TEST_QUALITY);
    }

    #[test]
    fn test_failing_jobs() {
        let metric = FailingCIJobs::new(
            Arc::new(FakeJenkins::new()),
            JobScope::project(),
            MetricContext::new(now()),
        );
        assert_eq!(metric.value(), Some(2.0));
        assert_eq!(metric.status(), Status::Yellow);
        assert_eq!(metric.report(), "2 of the 10 CI jobs are failing.");
        assert_eq!(metric.stable_id(), "FailingCIJobs");
        assert_eq!(metric.quality_attribute(), ENVIRONMENT_QUALITY);
    }

    #[test]
    fn test_failing_jobs_per_team() {
        let metric = FailingCIJobs::new(
            Arc::new(FakeJenkins::new()),
            JobScope::team("Blue"),
            MetricContext::new(now()),
        );
        assert_eq!(metric.stable_id(), "FailingCIJobs-Blue");
        assert_eq!(metric.responsible_teams(), vec!["Blue".to_string()]);
    }

    #[test]
    fn test_unused_jobs() {
        let metric = UnusedCIJobs::new(
            Arc::new(FakeJenkins::new()),
            JobScope::project(),
            MetricContext::new(now()),
        );
        assert_eq!(metric.value(), Some(1.0));
        assert_eq!(metric.status(), Status::Yellow);
        assert_eq!(metric.urls().len(), 1);
        assert_eq!(metric.quality_attribute(), ENVIRONMENT_QUALITY);
    }

    #[test]
    fn test_unreachable_jenkins_counts_as_missing() {
        let metric = FailingCIJobs::new(
            Arc::new(DownJenkins),
            JobScope::project(),
            MetricContext::new(now()),
        );
        assert_eq!(metric.value(), None);
        assert_eq!(metric.status(), Status::Red);
        assert_eq!(metric.urls()["Jenkins"], "http://jenkins");
    }

    #[test]
    fn test_assigned_jobs() {
        let metric = AssignedCIJobs::new(Arc::new(FakeJenkins::new()), MetricContext::new(now()));
        assert_eq!(metric.value(), Some(90.0));
        assert_eq!(metric.status(), Status::Yellow);
        assert_eq!(
            metric.report(),
            "9 of the 10 CI jobs are assigned to a team (90%)."
        );
        assert_eq!(metric.quality_attribute(), ENVIRONMENT_QUALITY);
    }

    struct FakeNagios {
        available: u64,
        total: u64,
    }

    impl Nagios for FakeNagios {
        fn number_of_servers_sufficiently_available(&self) -> SourceResult<u64> {
            Ok(self.available)
        }

        fn number_of_servers(&self) -> SourceResult<u64> {
            Ok(self.total)
        }

        fn number_of_servers_per_group(&self) -> SourceResult<BTreeMap<String, u64>> {
            Ok(BTreeMap::from([
                ("db".to_string(), 1),
                ("web".to_string(), self.total - 1),
            ]))
        }

        fn availability_url(&self) -> String {
            "http://nagios/availability".to_string()
        }
    }

    #[test]
    fn test_server_availability() {
        let metric = ServerAvailability::new(
            Arc::new(FakeNagios {
                available: 4,
                total: 4,
            }),
            MetricContext::new(now()),
        );
        assert_eq!(metric.value(), Some(100.0));
        assert_eq!(metric.status(), Status::Perfect);
        assert_eq!(
            metric.report(),
            "4 of the 4 servers are sufficiently available. Servers per group: db: 1, web: 3."
        );
        assert_eq!(metric.urls()["Nagios"], "http://nagios/availability");
    }

    #[test]
    fn test_server_availability_red() {
        let metric = ServerAvailability::new(
            Arc::new(FakeNagios {
                available: 1,
                total: 4,
            }),
            MetricContext::new(now()),
        );
        assert_eq!(metric.value(), Some(25.0));
        assert_eq!(metric.status(), Status::Red);
    }
}
