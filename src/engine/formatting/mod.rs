//! Report Formatting
//!
//! Renders an assembled [`QualityReport`] as HTML or JSON.

pub mod html;
pub mod json;

pub use html::HtmlFormatter;
pub use json::JsonFormatter;

use thiserror::Error;
use tracing::info;

use crate::engine::report::{QualityReport, Section};

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;

/// A report rendering: prefix, one part per section, postfix
pub trait Formatter {
    /// File the rendering is written to in the report folder
    fn file_name(&self) -> &'static str;

    /// Put between section parts
    fn separator(&self) -> &'static str {
        "\n"
    }

    fn prefix(&self, report: &QualityReport) -> Result<String>;

    fn section(&self, report: &QualityReport, section: &Section) -> Result<String>;

    fn postfix(&self, report: &QualityReport) -> Result<String>;

    fn body(&self, report: &QualityReport) -> Result<String> {
        let mut parts = Vec::with_capacity(report.sections().len());
        for section in report.sections() {
            info!("formatting section \"{}:{}\"", section.title, section.subtitle);
            parts.push(self.section(report, section)?);
        }
        Ok(parts.join(self.separator()))
    }

    fn process(&self, report: &QualityReport) -> Result<String> {
        info!("formatting report");
        let output = format!(
            "{}{}{}",
            self.prefix(report)?,
            self.body(report)?,
            self.postfix(report)?
        );
        info!("done formatting report");
        Ok(output)
    }
}
