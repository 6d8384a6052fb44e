//! Meta metrics: the share of metrics per status

use super::norm::{format_value, percentage, Norm};
use super::quality_attribute::META;
use super::{Metric, MetricContext, QualityAttribute, Status};

/// Status whose share a meta metric measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    Green,
    Red,
    Yellow,
    Grey,
}

impl MetaKind {
    /// In section order
    pub const ALL: [MetaKind; 4] = [MetaKind::Green, MetaKind::Red, MetaKind::Yellow, MetaKind::Grey];

    pub fn kind_name(&self) -> &'static str {
        match self {
            MetaKind::Green => "GreenMetaMetric",
            MetaKind::Red => "RedMetaMetric",
            MetaKind::Yellow => "YellowMetaMetric",
            MetaKind::Grey => "GreyMetaMetric",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            MetaKind::Green => "green",
            MetaKind::Red => "red",
            MetaKind::Yellow => "yellow",
            MetaKind::Grey => "grey",
        }
    }

    /// Perfect metrics count as green
    fn counts(&self, status: Status) -> bool {
        match self {
            MetaKind::Green => status.is_green(),
            MetaKind::Red => status == Status::Red,
            MetaKind::Yellow => status == Status::Yellow,
            MetaKind::Grey => status == Status::Grey,
        }
    }

    fn default_norm(&self) -> Norm {
        match self {
            MetaKind::Green => Norm::higher_percentage_is_better(100.0, 90.0),
            MetaKind::Red => Norm::lower_is_better(0.0, 10.0),
            MetaKind::Yellow | MetaKind::Grey => Norm::lower_is_better(10.0, 20.0),
        }
    }
}

/// Percentage of the report's metrics with a given status
pub struct MetaMetric {
    meta_kind: MetaKind,
    statuses: Vec<Status>,
    ctx: MetricContext,
}

impl MetaMetric {
    pub fn new(meta_kind: MetaKind, statuses: Vec<Status>, ctx: MetricContext) -> Self {
        Self {
            meta_kind,
            statuses,
            ctx,
        }
    }

    pub fn meta_kind(&self) -> MetaKind {
        self.meta_kind
    }

    fn count(&self) -> u64 {
        self.statuses
            .iter()
            .filter(|s| self.meta_kind.counts(**s))
            .count() as u64
    }
}

impl Metric for MetaMetric {
    fn kind(&self) -> &'static str {
        self.meta_kind.kind_name()
    }

    fn quality_attribute(&self) -> QualityAttribute {
        META
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(self.meta_kind.default_norm())
    }

    fn value(&self) -> Option<f64> {
        if self.statuses.is_empty() && self.meta_kind != MetaKind::Green {
            return Some(0.0);
        }
        Some(percentage(self.count(), self.statuses.len() as u64))
    }

    fn norm_description(&self, norm: &Norm) -> String {
        match self.meta_kind {
            MetaKind::Green => format!(
                "At least {}% of the metrics meet their target norm. Less than {}% is red.",
                format_value(norm.target),
                format_value(norm.low_target)
            ),
            other => format!(
                "At most {}% of the metrics are {}. More than {}% is red.",
                format_value(norm.target),
                other.color(),
                format_value(norm.low_target)
            ),
        }
    }

    fn report(&self) -> String {
        let value = self.value().unwrap_or(0.0);
        format!(
            "{} of the {} metrics ({}%) are {}.",
            self.count(),
            self.statuses.len(),
            format_value(value),
            self.meta_kind.color()
        )
    }

    fn y_axis_range(&self) -> Option<(i64, i64)> {
        Some((0, 100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn statuses() -> Vec<Status> {
        vec![
            Status::Perfect,
            Status::Green,
            Status::Green,
            Status::Yellow,
            Status::Red,
            Status::Grey,
            Status::Green,
            Status::Green,
            Status::Green,
            Status::Green,
        ]
    }

    fn meta(kind: MetaKind) -> MetaMetric {
        MetaMetric::new(kind, statuses(), MetricContext::new(Utc::now()))
    }

    #[test]
    fn test_green_counts_perfect() {
        let metric = meta(MetaKind::Green);
        assert_eq!(metric.value(), Some(70.0));
        assert_eq!(metric.status(), Status::Red);
        assert_eq!(metric.report(), "7 of the 10 metrics (70%) are green.");
    }

    #[test]
    fn test_red_yellow_grey_shares() {
        assert_eq!(meta(MetaKind::Red).value(), Some(10.0));
        assert_eq!(meta(MetaKind::Red).status(), Status::Yellow);
        assert_eq!(meta(MetaKind::Yellow).value(), Some(10.0));
        assert_eq!(meta(MetaKind::Yellow).status(), Status::Green);
        assert_eq!(meta(MetaKind::Grey).status(), Status::Green);
    }

    #[test]
    fn test_stable_ids() {
        assert_eq!(meta(MetaKind::Green).stable_id(), "GreenMetaMetric");
        assert_eq!(meta(MetaKind::Grey).stable_id(), "GreyMetaMetric");
    }

    #[test]
    fn test_empty_report() {
        let ctx = MetricContext::new(Utc::now());
        assert_eq!(
            MetaMetric::new(MetaKind::Green, Vec::new(), ctx.clone()).status(),
            Status::Perfect
        );
        assert_eq!(
            MetaMetric::new(MetaKind::Red, Vec::new(), ctx).status(),
            Status::Perfect
        );
    }
}
