//! Report sections and evaluated metrics

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::engine::config::Comment;
use crate::engine::domain::Product;
use crate::engine::history::StatusSince;
use crate::engine::metric::{QualityAttribute, Status};
use crate::engine::source::Urls;

/// A metric after evaluation, with everything the formatters need
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedMetric {
    /// Position in the report, e.g. `PC-3`
    pub id: String,
    pub stable_id: String,
    pub kind: String,
    pub section_id: String,
    pub subject: Option<String>,
    pub quality_attribute: QualityAttribute,
    pub status: Status,
    pub status_since: StatusSince,
    pub value: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    pub report: String,
    pub norm: String,
    pub urls: Urls,
    pub url_label: Option<String>,
    pub y_axis_range: Option<(i64, i64)>,
    pub responsible_teams: Vec<String>,
    /// Values of earlier runs followed by this run's value
    pub recent_values: Vec<f64>,
    pub comment: Option<Comment>,
    /// Task label to task url
    pub tasks: BTreeMap<String, String>,
}

impl EvaluatedMetric {
    /// Number within the section
    pub fn number(&self) -> &str {
        self.id
            .rsplit_once('-')
            .map_or(self.id.as_str(), |(_, number)| number)
    }

    /// Status class; red and yellow metrics with tasks get `_with_action`
    pub fn status_class(&self) -> String {
        if !self.tasks.is_empty() && matches!(self.status, Status::Red | Status::Yellow) {
            format!("{}_with_action", self.status)
        } else {
            self.status.to_string()
        }
    }

    pub fn is_meta(&self) -> bool {
        self.quality_attribute.id_string().is_empty()
    }
}

/// Group of metrics about one subject
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    /// Set for product sections
    pub product: Option<Product>,
    pub metrics: Vec<EvaluatedMetric>,
}

impl Section {
    pub fn new(id: &str, title: &str, subtitle: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            product: None,
            metrics: Vec::new(),
        }
    }

    /// Color of the section header, driven by its worst metrics
    pub fn color(&self) -> &'static str {
        let has = |wanted: fn(&Status) -> bool| self.metrics.iter().any(|m| wanted(&m.status));
        if has(|s| *s == Status::Red) {
            "red"
        } else if has(|s| *s == Status::Yellow) {
            "yellow"
        } else if has(Status::is_green) {
            "green"
        } else if has(|s| *s == Status::Grey) {
            "grey"
        } else {
            "white"
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::metric::quality_attribute::{META, PROGRESS};

    pub(crate) fn evaluated(id: &str, status: Status) -> EvaluatedMetric {
        EvaluatedMetric {
            id: id.to_string(),
            stable_id: "OpenBugs".to_string(),
            kind: "OpenBugs".to_string(),
            section_id: "PC".to_string(),
            subject: None,
            quality_attribute: PROGRESS,
            status,
            status_since: StatusSince {
                date: Utc::now(),
                is_lower_bound: false,
            },
            value: Some(1.0),
            date: None,
            report: String::new(),
            norm: String::new(),
            urls: Urls::new(),
            url_label: None,
            y_axis_range: None,
            responsible_teams: Vec::new(),
            recent_values: Vec::new(),
            comment: None,
            tasks: BTreeMap::new(),
        }
    }

    fn section(statuses: &[Status]) -> Section {
        let mut section = Section::new("PC", "Project management", "");
        section.metrics = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| evaluated(&format!("PC-{}", i + 1), *s))
            .collect();
        section
    }

    #[test]
    fn test_section_color() {
        assert_eq!(section(&[Status::Green, Status::Red, Status::Yellow]).color(), "red");
        assert_eq!(section(&[Status::Grey, Status::Yellow]).color(), "yellow");
        assert_eq!(section(&[Status::Grey, Status::Perfect]).color(), "green");
        assert_eq!(section(&[Status::Grey]).color(), "grey");
        assert_eq!(section(&[]).color(), "white");
    }

    #[test]
    fn test_status_class_with_tasks() {
        let mut metric = evaluated("PC-12", Status::Red);
        assert_eq!(metric.status_class(), "red");
        metric.tasks.insert("TASK-1".to_string(), "http://tasks/1".to_string());
        assert_eq!(metric.status_class(), "red_with_action");
        metric.status = Status::Green;
        assert_eq!(metric.status_class(), "green");
        assert_eq!(metric.number(), "12");
    }

    #[test]
    fn test_meta_metrics_have_no_quality_attribute() {
        let mut metric = evaluated("MM-1", Status::Green);
        assert!(!metric.is_meta());
        metric.quality_attribute = META;
        assert!(metric.is_meta());
    }
}
