//! JSON rendering of the evaluated report

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Formatter, Result};
use crate::engine::domain::Project;
use crate::engine::history::MetaTrendPoint;
use crate::engine::metric::Status;
use crate::engine::report::{DashboardConfig, QualityReport, Section};

pub struct JsonFormatter;

/// Everything but the sections, which are streamed next to it
#[derive(Serialize)]
struct Header<'a> {
    title: &'a str,
    date: DateTime<Utc>,
    status: Option<Status>,
    project: &'a Project,
    dashboard: &'a DashboardConfig,
    meta_trend: &'a [MetaTrendPoint],
}

impl Formatter for JsonFormatter {
    fn file_name(&self) -> &'static str {
        "report.json"
    }

    fn separator(&self) -> &'static str {
        ",\n"
    }

    fn prefix(&self, report: &QualityReport) -> Result<String> {
        let header = Header {
            title: &report.title,
            date: report.date,
            status: report.status,
            project: report.project(),
            dashboard: report.dashboard(),
            meta_trend: report.meta_trend(),
        };
        Ok(format!(
            "{{\"report\":{},\"sections\":[\n",
            serde_json::to_string(&header)?
        ))
    }

    fn section(&self, _report: &QualityReport, section: &Section) -> Result<String> {
        Ok(serde_json::to_string(section)?)
    }

    fn postfix(&self, _report: &QualityReport) -> Result<String> {
        Ok("\n]}\n".to_string())
    }
}
