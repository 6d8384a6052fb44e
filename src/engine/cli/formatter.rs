//! CLI Output Formatting Module
//! Provides consistent, colorized output for terminal UX

use colored::{ColoredString, Colorize};

use crate::engine::metric::Status;

pub struct CliFormatter;

impl CliFormatter {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue().bold(), message);
    }

    /// Print a section header
    pub fn header(title: &str) {
        println!("\n{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(title.chars().count()).bright_black());
    }

    /// Print a key-value pair
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.bright_white().bold(), value);
    }

    /// Print a metric line: id, status, text
    pub fn metric(id: &str, status: Status, text: &str) {
        println!(
            "  {:<8} {} {}",
            id.bright_white().bold(),
            status_badge(status),
            text
        );
    }

    /// Print an indented detail line
    pub fn detail(text: &str) {
        println!("           {}", text.bright_black());
    }

    /// Print a table header
    pub fn table_header(columns: &[&str]) {
        let header = columns
            .iter()
            .map(|c| c.bright_white().bold().to_string())
            .collect::<Vec<_>>()
            .join(" │ ");
        println!("  {}", header);
        println!("  {}", "─".repeat(plain_width(columns)).bright_black());
    }

    /// Print a table row
    pub fn table_row(values: &[&str]) {
        println!("  {}", values.join(" │ "));
    }

    /// Print an empty line
    pub fn blank() {
        println!();
    }
}

/// Status padded to a fixed width and colored like the report
pub fn status_badge(status: Status) -> ColoredString {
    let label = format!("{:<7}", status.as_str());
    match status {
        Status::Perfect => label.bright_green().bold(),
        Status::Green => label.green(),
        Status::Yellow => label.yellow(),
        Status::Red => label.red().bold(),
        Status::Grey => label.bright_black(),
    }
}

/// Width of a table header without color codes
fn plain_width(columns: &[&str]) -> usize {
    let separators = columns.len().saturating_sub(1) * 3;
    columns.iter().map(|c| c.chars().count()).sum::<usize>() + separators
}

/// Count of metrics per status, worst first
pub fn status_summary(statuses: &[Status]) -> String {
    let mut parts = Vec::new();
    for status in [Status::Red, Status::Yellow, Status::Grey, Status::Green, Status::Perfect] {
        let count = statuses.iter().filter(|s| **s == status).count();
        if count > 0 {
            parts.push(format!("{} {}", count, status));
        }
    }
    if parts.is_empty() {
        "no metrics".to_string()
    } else {
        parts.join(", ")
    }
}
