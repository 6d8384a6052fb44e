//! Product metrics

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::norm::{format_value, Norm};
use super::quality_attribute::TEST_QUALITY;
use super::{format_date, measured, Metric, MetricContext, QualityAttribute};
use crate::engine::domain::Product;
use crate::engine::source::{CoverageReport, Urls};

/// Statement coverage of a product by the automated regression tests
pub struct ARTCoverage {
    report: Arc<dyn CoverageReport>,
    report_id: String,
    product: Product,
    ctx: MetricContext,
}

impl ARTCoverage {
    pub const KIND: &'static str = "ARTCoverage";

    pub fn new(report: Arc<dyn CoverageReport>, report_id: &str, product: Product, ctx: MetricContext) -> Self {
        Self {
            report,
            report_id: report_id.to_string(),
            product,
            ctx,
        }
    }
}

impl Metric for ARTCoverage {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn subject_name(&self) -> Option<String> {
        Some(self.product.label())
    }

    fn quality_attribute(&self) -> QualityAttribute {
        TEST_QUALITY
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::higher_is_better(80.0, 70.0))
    }

    fn value(&self) -> Option<f64> {
        measured(Self::KIND, self.report.coverage(&self.report_id))
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        measured(Self::KIND, self.report.coverage_date(&self.report_id))
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "Minimum ART statement coverage is {}%. Less than {}% is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        let Some(coverage) = self.value() else {
            return format!(
                "The ART coverage of {} could not be determined.",
                self.product.label()
            );
        };
        let mut text = format!(
            "{} ART coverage is {}% ({})",
            self.product.label(),
            format_value(coverage),
            self.report.name()
        );
        if let Some(date) = self.date() {
            text.push_str(&format!(", measured on {}", format_date(date)));
        }
        text.push('.');
        text
    }

    fn urls(&self) -> Urls {
        Urls::from([(
            self.report.name(),
            self.report.coverage_url(&self.report_id),
        )])
    }

    fn responsible_teams(&self) -> Vec<String> {
        self.product.responsible_teams.clone()
    }
}
