//! Dashboard layout
//!
//! The dashboard is a table of section cells at the top of the report. Its
//! layout comes from `project.json`, or defaults to one row with every
//! section.

use serde::{Deserialize, Serialize};

use super::section::Section;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardHeader {
    pub title: String,
    #[serde(default = "default_span")]
    pub colspan: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardCell {
    pub section_id: String,
    /// Defaults to the section title
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
    #[serde(default = "default_span")]
    pub colspan: u32,
    #[serde(default = "default_span")]
    pub rowspan: u32,
}

fn default_span() -> u32 {
    1
}

fn default_bg_color() -> String {
    "lightsteelblue".to_string()
}

impl DashboardCell {
    pub fn new(section_id: &str) -> Self {
        Self {
            section_id: section_id.to_string(),
            title: None,
            bg_color: default_bg_color(),
            colspan: default_span(),
            rowspan: default_span(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub header: Vec<DashboardHeader>,
    #[serde(default)]
    pub rows: Vec<Vec<DashboardCell>>,
}

impl DashboardConfig {
    /// A single "Overview" header over one row with every section
    pub fn default_for(sections: &[Section]) -> Self {
        let cells: Vec<DashboardCell> = sections.iter().map(|s| DashboardCell::new(&s.id)).collect();
        Self {
            header: vec![DashboardHeader {
                title: "Overview".to_string(),
                colspan: cells.len().max(1) as u32,
            }],
            rows: vec![cells],
        }
    }

    /// Section ids referenced by the layout
    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flatten()
            .map(|cell| cell.section_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let sections = vec![
            Section::new("PC", "Project management", ""),
            Section::new("MM", "Meta metrics", ""),
        ];
        let dashboard = DashboardConfig::default_for(&sections);
        assert_eq!(dashboard.header[0].title, "Overview");
        assert_eq!(dashboard.header[0].colspan, 2);
        assert_eq!(dashboard.section_ids().collect::<Vec<_>>(), vec!["PC", "MM"]);
    }

    #[test]
    fn test_cell_defaults() {
        let cell: DashboardCell = serde_json::from_str(r#"{"section_id": "CI"}"#).unwrap();
        assert_eq!(cell, DashboardCell::new("CI"));
    }
}
