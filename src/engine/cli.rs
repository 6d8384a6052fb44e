//! Quality Report CLI Module
//! Command-line interface for generating quality reports

pub mod formatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quality-report")]
#[command(version)]
#[command(about = "Evaluate software quality metrics and render a status report", long_about = None)]
pub struct Cli {
    /// Project directory with project.json (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Log level
    #[arg(short, long, global = true, default_value = "warning")]
    pub log: LogLevel,

    /// Output format (json for scripting)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Filter directive for the tracing subscriber
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

/// Rendering written to the report folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Html,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter project.json
    Init {
        /// Project name
        #[arg(short, long)]
        name: String,
    },

    /// Evaluate all metrics and write the report
    Generate {
        /// Folder the report is written to
        #[arg(short, long)]
        report: PathBuf,

        /// Report format
        #[arg(short, long, default_value = "html")]
        output: ReportFormat,

        /// Don't add this run to the history
        #[arg(long)]
        no_history: bool,
    },

    /// Show the dashboard summary
    Status,

    /// List every metric with its status and norm
    Norms,
}

impl Cli {
    pub fn get_project_dir(&self) -> PathBuf {
        self.project
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::parse_from([
            "quality-report",
            "--project",
            "/projects/alpha",
            "generate",
            "--report",
            "/tmp/report",
            "--no-history",
        ]);
        assert_eq!(cli.get_project_dir(), PathBuf::from("/projects/alpha"));
        assert_eq!(cli.log, LogLevel::Warning);
        match cli.command {
            Commands::Generate {
                report,
                output,
                no_history,
            } => {
                assert_eq!(report, PathBuf::from("/tmp/report"));
                assert_eq!(output, ReportFormat::Html);
                assert!(no_history);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_log_levels() {
        let cli = Cli::parse_from(["quality-report", "status", "--log", "critical"]);
        assert_eq!(cli.log.directive(), "error");
        let cli = Cli::parse_from(["quality-report", "--log", "debug", "norms"]);
        assert_eq!(cli.log.directive(), "debug");
    }
}
