//! Quality Report CLI - Main entry point
//!
//! This binary provides the `quality-report` tool for generating reports.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use quality_report_lib::engine::{
    cli::formatter::{status_summary, CliFormatter},
    cli::{Cli, Commands, LogLevel, OutputFormat, ReportFormat},
    config::{Config, CONFIG_FILE},
    formatting::{Formatter, HtmlFormatter, JsonFormatter},
    history::History,
    metric::Status,
    report::QualityReport,
    source::{MetricSources, SnapshotSources},
};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log);

    if let Err(e) = run_cli(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// RUST_LOG wins over --log when set
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_cli(cli: Cli) -> Result<()> {
    let project_dir = cli.get_project_dir();
    let json_output = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Init { name } => {
            cmd_init(&project_dir, &name, json_output)?;
        }
        Commands::Generate {
            report,
            output,
            no_history,
        } => {
            cmd_generate(&project_dir, &report, output, no_history, json_output)?;
        }
        Commands::Status => {
            cmd_status(&project_dir, json_output)?;
        }
        Commands::Norms => {
            cmd_norms(&project_dir, json_output)?;
        }
    }

    Ok(())
}

struct LoadedProject {
    config: Config,
    sources: MetricSources,
    history: History,
}

fn load_project(project_dir: &Path) -> Result<LoadedProject> {
    let config = Config::load(project_dir)
        .with_context(|| format!("Could not load project from {}", project_dir.display()))?;
    let sources = SnapshotSources::load(project_dir)
        .context("Could not load source snapshot")?
        .into_metric_sources();
    let history_path = config.history_path(project_dir);
    let history = History::load(&history_path, config.history.clone())
        .with_context(|| format!("Could not load history from {}", history_path.display()))?;
    Ok(LoadedProject {
        config,
        sources,
        history,
    })
}

fn cmd_init(project_dir: &Path, name: &str, json: bool) -> Result<()> {
    if project_dir.join(CONFIG_FILE).exists() {
        bail!("Project already initialized: {}", project_dir.join(CONFIG_FILE).display());
    }
    std::fs::create_dir_all(project_dir)?;

    let config = Config::default_for_project(name);
    config.save(project_dir)?;
    info!(project = name, dir = %project_dir.display(), "project initialized");

    if json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "project_dir": project_dir.display().to_string(),
                "name": name
            })
        );
    } else {
        CliFormatter::success(&format!("Created quality report project: {}", name));
        CliFormatter::kv("Config", &project_dir.join(CONFIG_FILE).display().to_string());
        CliFormatter::blank();
        CliFormatter::info("Add teams, streets and products to project.json and measurements to sources.json, then run:");
        println!("   quality-report --project {} generate --report <dir>", project_dir.display());
    }

    Ok(())
}

fn cmd_generate(
    project_dir: &Path,
    report_dir: &Path,
    output: ReportFormat,
    no_history: bool,
    json: bool,
) -> Result<()> {
    let LoadedProject {
        config,
        sources,
        mut history,
    } = load_project(project_dir)?;

    let now = Utc::now();
    let report = QualityReport::assemble(&config, &sources, &history, now)?;

    if !no_history {
        history.add_record(now, report.history_entries());
        history.save()?;
    }

    let formatter: Box<dyn Formatter> = match output {
        ReportFormat::Html => Box::new(HtmlFormatter),
        ReportFormat::Json => Box::new(JsonFormatter),
    };
    let content = formatter.process(&report)?;
    std::fs::create_dir_all(report_dir)
        .with_context(|| format!("Could not create report folder {}", report_dir.display()))?;
    let report_file = report_dir.join(formatter.file_name());
    std::fs::write(&report_file, content)?;

    let statuses: Vec<Status> = report.metrics().filter(|m| !m.is_meta()).map(|m| m.status).collect();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "report": report_file.display().to_string(),
                "status": report.status,
                "metrics": statuses.len(),
                "history_updated": !no_history,
            })
        );
    } else {
        CliFormatter::success(&format!("Report written to {}", report_file.display()));
        CliFormatter::kv("Status", report.status.map_or("none", |s| s.as_str()));
        CliFormatter::kv("Metrics", &status_summary(&statuses));
        if no_history {
            CliFormatter::warning("History not updated (--no-history)");
        }
    }

    Ok(())
}

fn cmd_status(project_dir: &Path, json: bool) -> Result<()> {
    let project = load_project(project_dir)?;
    let report = QualityReport::assemble(&project.config, &project.sources, &project.history, Utc::now())?;

    if json {
        let sections: Vec<_> = report
            .sections()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "title": s.title,
                    "subtitle": s.subtitle,
                    "color": s.color(),
                    "metrics": s.metrics.len(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "project": report.title,
                "date": report.date,
                "status": report.status,
                "sources": project.sources.configured(),
                "sections": sections,
            }))?
        );
    } else {
        CliFormatter::header(&format!("{} quality status", report.title));
        CliFormatter::kv("Status", report.status.map_or("none", |s| s.as_str()));
        CliFormatter::kv("Sources", &project.sources.configured().join(", "));
        CliFormatter::blank();
        CliFormatter::table_header(&["Section", "Color", "Metrics"]);
        for section in report.sections() {
            let name = if section.subtitle.is_empty() {
                format!("{} {}", section.id, section.title)
            } else {
                format!("{} {} {}", section.id, section.title, section.subtitle)
            };
            let statuses: Vec<Status> = section.metrics.iter().map(|m| m.status).collect();
            let summary = status_summary(&statuses);
            CliFormatter::table_row(&[name.as_str(), section.color(), summary.as_str()]);
        }
    }

    Ok(())
}

fn cmd_norms(project_dir: &Path, json: bool) -> Result<()> {
    let project = load_project(project_dir)?;
    let report = QualityReport::assemble(&project.config, &project.sources, &project.history, Utc::now())?;

    if json {
        let metrics: Vec<_> = report
            .metrics()
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "stable_id": m.stable_id,
                    "status": m.status,
                    "value": m.value,
                    "norm": m.norm,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        for section in report.sections() {
            CliFormatter::header(format!("{} {}", section.title, section.subtitle).trim_end());
            for metric in &section.metrics {
                CliFormatter::metric(&metric.id, metric.status, &metric.report);
                CliFormatter::detail(&metric.norm);
            }
        }
    }

    Ok(())
}
