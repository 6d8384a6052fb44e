//! Metrics
//!
//! A metric combines a source, a subject and a [`Norm`]. Evaluation of the
//! measured value into a [`Status`] lives in [`norm`]; the concrete metric
//! kinds are grouped per area.

pub mod ci;
pub mod meta;
pub mod norm;
pub mod product;
pub mod project;
pub mod quality_attribute;
pub mod status;
pub mod team;

pub use norm::{Direction, Freshness, Norm, TechnicalDebtTarget};
pub use quality_attribute::QualityAttribute;
pub use status::Status;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::engine::domain::{Subject, TargetOverride, Targets};
use crate::engine::source::{SourceResult, Urls};

/// A measurable quality signal
pub trait Metric: Send + Sync {
    /// Kind name, also the key for target overrides (e.g. `OpenBugs`)
    fn kind(&self) -> &'static str;

    fn subject_name(&self) -> Option<String> {
        None
    }

    fn quality_attribute(&self) -> QualityAttribute;

    fn norm(&self) -> Norm;

    /// Measured value, None when it could not be measured
    fn value(&self) -> Option<f64>;

    /// Date of the measurement, when the source reports one
    fn date(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Age of the measurement, used by norms with freshness thresholds
    fn age(&self) -> Option<Duration> {
        None
    }

    fn status(&self) -> Status {
        self.norm().evaluate(self.value(), self.age())
    }

    /// Norm description without the technical debt remark
    fn norm_description(&self, norm: &Norm) -> String;

    /// Human readable measurement
    fn report(&self) -> String;

    fn urls(&self) -> Urls {
        Urls::new()
    }

    fn url_label(&self) -> Option<&'static str> {
        None
    }

    /// Value stored in the history
    fn numerical_value(&self) -> Option<f64> {
        self.value()
    }

    /// Fixed y axis range for trend graphs
    fn y_axis_range(&self) -> Option<(i64, i64)> {
        None
    }

    fn responsible_teams(&self) -> Vec<String> {
        Vec::new()
    }

    fn norm_text(&self) -> String {
        let norm = self.norm();
        let description = self.norm_description(&norm);
        match &norm.technical_debt {
            Some(debt) => format!("{} {}.", description, debt.describe()),
            None => description,
        }
    }

    /// Id that stays the same across runs, used as history key
    fn stable_id(&self) -> String {
        match self.subject_name() {
            Some(subject) => format!("{}-{}", self.kind(), subject),
            None => self.kind().to_string(),
        }
    }
}

/// Construction context shared by all metrics of one report run
#[derive(Debug, Clone)]
pub struct MetricContext {
    pub now: DateTime<Utc>,
    pub targets: TargetOverride,
}

impl MetricContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            targets: TargetOverride::default(),
        }
    }

    /// Context with the overrides for `kind`: subject first, then project
    pub fn for_kind(now: DateTime<Utc>, kind: &str, subject: Option<&dyn Subject>, project: &Targets) -> Self {
        let subject_override = subject.and_then(|s| s.target_override(kind));
        let project_override = project.get(kind);
        let pick = |f: fn(&TargetOverride) -> Option<f64>| {
            subject_override.and_then(f).or_else(|| project_override.and_then(f))
        };
        let technical_debt = subject_override
            .and_then(|o| o.technical_debt.clone())
            .or_else(|| project_override.and_then(|o| o.technical_debt.clone()));
        Self {
            now,
            targets: TargetOverride {
                target: pick(|o| o.target),
                low_target: pick(|o| o.low_target),
                technical_debt,
            },
        }
    }

    /// Apply the overrides to a metric kind's default norm
    pub fn apply(&self, mut norm: Norm) -> Norm {
        if let Some(target) = self.targets.target {
            norm.target = target;
        }
        if let Some(low_target) = self.targets.low_target {
            norm.low_target = low_target;
        }
        norm.with_technical_debt(self.targets.technical_debt.clone())
    }

    /// Whole days elapsed since `date`
    pub fn days_since(&self, date: DateTime<Utc>) -> i64 {
        (self.now - date).num_days()
    }
}

/// Value of a source call, or None when the source failed
pub(crate) fn measured<T>(kind: &str, result: SourceResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(metric = kind, error = %e, "measurement failed");
            None
        }
    }
}

/// Format a date the way the report shows it
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d-%m-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::Team;

    #[test]
    fn test_subject_override_wins() {
        let mut team = Team::new("Blue", "BL");
        team.targets.insert(
            "OpenBugs".to_string(),
            TargetOverride {
                target: Some(10.0),
                low_target: None,
                technical_debt: None,
            },
        );
        let mut project = Targets::new();
        project.insert(
            "OpenBugs".to_string(),
            TargetOverride {
                target: Some(20.0),
                low_target: Some(40.0),
                technical_debt: Some(TechnicalDebtTarget::new(60.0, "migration")),
            },
        );

        let ctx = MetricContext::for_kind(Utc::now(), "OpenBugs", Some(&team as &dyn Subject), &project);
        let norm = ctx.apply(Norm::lower_is_better(50.0, 100.0));
        assert_eq!(norm.target, 10.0);
        assert_eq!(norm.low_target, 40.0);
        assert_eq!(norm.technical_debt.map(|d| d.target), Some(60.0));
    }

    #[test]
    fn test_defaults_without_overrides() {
        let ctx = MetricContext::for_kind(Utc::now(), "OpenBugs", None, &Targets::new());
        let norm = ctx.apply(Norm::lower_is_better(50.0, 100.0));
        assert_eq!(norm, Norm::lower_is_better(50.0, 100.0));
    }
}
