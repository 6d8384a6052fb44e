// Quality Report Engine - Core module structure
pub mod cli;
pub mod config;
pub mod domain;
pub mod formatting;
pub mod history;
pub mod metric;
pub mod report;
pub mod source;

pub use config::Config;
pub use history::History;
pub use report::QualityReport;
