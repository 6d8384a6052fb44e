//! Quality Report Configuration Module
//! Handles loading and validating project.json

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::domain::{Project, Resource};
use crate::engine::history::HistoryConfig;
use crate::engine::report::DashboardConfig;

pub const CONFIG_FILE: &str = "project.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub project: Project,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub dashboard: Option<DashboardConfig>,
    /// Comments and tasks per metric stable id
    #[serde(default)]
    pub metric_options: BTreeMap<String, MetricOptions>,
}

/// Remark on a metric shown in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricOptions {
    #[serde(default)]
    pub comment: Option<Comment>,
    /// Task label to task url
    #[serde(default)]
    pub tasks: BTreeMap<String, String>,
}

impl Config {
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path));
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, project_dir: &Path) -> Result<(), ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn default_for_project(name: &str) -> Self {
        let mut project = Project::new(name);
        project.resources.push(Resource {
            name: "Project wiki".to_string(),
            url: None,
        });
        Self {
            version: "0.1.0".to_string(),
            project,
            history: HistoryConfig::default(),
            dashboard: None,
            metric_options: BTreeMap::new(),
        }
    }

    /// History file, resolved against the project folder
    pub fn history_path(&self, project_dir: &Path) -> PathBuf {
        if self.history.file.is_absolute() {
            self.history.file.clone()
        } else {
            project_dir.join(&self.history.file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config = Config::default_for_project("Alpha");
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project.base.name, "Alpha");
        assert_eq!(loaded.history, HistoryConfig::default());
        assert!(loaded.dashboard.is_none());
    }

    #[test]
    fn test_missing_config() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let json = r#"{
            "version": "0.1.0",
            "project": {
                "name": "Alpha",
                "teams": [{"name": "Blue", "short_name": "BL", "birt_id": "blue"}],
                "targets": {"OpenBugs": {"target": 20, "low_target": 40}}
            },
            "metric_options": {
                "OpenBugs": {"comment": {"text": "Bug triage on Mondays"}, "tasks": {"TASK-1": "http://tasks/1"}}
            }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.project.teams[0].birt_id.as_deref(), Some("blue"));
        assert_eq!(config.project.targets["OpenBugs"].target, Some(20.0));
        assert_eq!(config.history.max_records, 1000);
        assert_eq!(config.metric_options["OpenBugs"].tasks.len(), 1);

        let dir = Path::new("/projects/alpha");
        assert_eq!(config.history_path(dir), dir.join("history.json"));
    }
}
