//! HTML rendering of the report
//!
//! The page is built from the fragments in `html/`. Metrics are emitted as
//! a JavaScript array that the page renders into the section tables, so the
//! quality attribute and team filters work without a round trip.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::BTreeMap;

use super::{Formatter, Result};
use crate::engine::domain::ProductRef;
use crate::engine::history::MetaTrendPoint;
use crate::engine::metric::format_date;
use crate::engine::metric::norm::format_value;
use crate::engine::report::{EvaluatedMetric, QualityReport, Section};

const PREFIX: &str = include_str!("html/prefix.html");
const SECTION: &str = include_str!("html/section.html");
const POSTFIX: &str = include_str!("html/postfix.html");

pub struct HtmlFormatter;

impl Formatter for HtmlFormatter {
    fn file_name(&self) -> &'static str {
        "index.html"
    }

    fn prefix(&self, report: &QualityReport) -> Result<String> {
        let status = report.status.map_or("white", |s| s.as_str());
        let metrics = metric_rows(report)?;
        Ok(fill(
            PREFIX,
            &[
                ("title", &escape(&report.title)),
                ("date", &report.date.format("%d-%m-%y %H:%M").to_string()),
                ("status", status),
                ("section_menu", &section_menu(report)),
                ("quality_attribute_menu", &quality_attribute_menu(report)),
                ("team_menu", &team_menu(report)),
                ("dashboard", &dashboard(report)),
                ("project_resources", &project_resources(report)),
                ("history", &trend_rows(report.meta_trend())),
                ("metrics", &metrics),
            ],
        ))
    }

    fn section(&self, report: &QualityReport, section: &Section) -> Result<String> {
        Ok(fill(
            SECTION,
            &[
                ("id", &escape(&section.id)),
                ("title", &escape(&section.title)),
                ("subtitle", &escape(&section.subtitle)),
                ("color", section.color()),
                ("meta_data", &product_meta_data(report, section)),
            ],
        ))
    }

    fn postfix(&self, _report: &QualityReport) -> Result<String> {
        Ok(POSTFIX.to_string())
    }
}

/// Replace `{name}` placeholders in a single pass, so substituted text is
/// never scanned again. Braces that don't name a placeholder are kept.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let value = tail.find('}').and_then(|end| {
            let name = &tail[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                output.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                output.push('{');
                rest = tail;
            }
        }
    }
    output.push_str(rest);
    output
}

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn link(href: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\">{}</a>",
        escape(href),
        escape(label)
    )
}

/// Sections with a unique title get a menu item; sections sharing a title
/// are grouped in a sub menu by subtitle
fn section_menu(report: &QualityReport) -> String {
    let mut groups: Vec<(&str, Vec<&Section>)> = Vec::new();
    for section in report.sections() {
        match groups.iter_mut().find(|(title, _)| *title == section.title) {
            Some((_, sections)) => sections.push(section),
            None => groups.push((section.title.as_str(), vec![section])),
        }
    }
    groups
        .iter()
        .map(|(title, sections)| {
            if let [section] = sections.as_slice() {
                format!(
                    "<li><a href=\"#section_{}\">{}</a></li>",
                    escape(&section.id),
                    escape(title)
                )
            } else {
                let items: Vec<String> = sections
                    .iter()
                    .map(|s| {
                        format!(
                            "<li><a href=\"#section_{}\">{}</a></li>",
                            escape(&s.id),
                            escape(&s.subtitle)
                        )
                    })
                    .collect();
                format!("<li>{}<ul>{}</ul></li>", escape(title), items.join(""))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quality_attribute_menu(report: &QualityReport) -> String {
    let mut attributes = BTreeMap::new();
    for metric in report.metrics().filter(|m| !m.is_meta()) {
        attributes.insert(
            metric.quality_attribute.id_string(),
            metric.quality_attribute.attribute_name(),
        );
    }
    attributes
        .iter()
        .map(|(id, name)| {
            format!(
                "<li><a href=\"#\" data-filter-qa=\"{}\">{}</a></li>",
                id,
                escape(&capitalize(name))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn team_menu(report: &QualityReport) -> String {
    report
        .teams()
        .iter()
        .map(|team| {
            format!(
                "<li><a href=\"#\" data-filter-team=\"{}\">{}</a></li>",
                escape(&team.base.name),
                escape(&team.base.name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn dashboard(report: &QualityReport) -> String {
    let layout = report.dashboard();
    let mut rows = Vec::new();
    let header: Vec<String> = layout
        .header
        .iter()
        .map(|h| format!("<th colspan=\"{}\">{}</th>", h.colspan, escape(&h.title)))
        .collect();
    if !header.is_empty() {
        rows.push(format!("<tr>{}</tr>", header.join("")));
    }
    for row in &layout.rows {
        let cells: Vec<String> = row
            .iter()
            .filter_map(|cell| {
                let section = report.get_section(&cell.section_id)?;
                let title = cell.title.clone().unwrap_or_else(|| {
                    if section.subtitle.is_empty() {
                        section.title.clone()
                    } else {
                        section.subtitle.clone()
                    }
                });
                Some(format!(
                    "<td colspan=\"{}\" rowspan=\"{}\" align=\"center\" bgcolor=\"{}\"><a href=\"#section_{}\" class=\"{}\">{}</a></td>",
                    cell.colspan,
                    cell.rowspan,
                    escape(&cell.bg_color),
                    escape(&section.id),
                    section.color(),
                    escape(&title)
                ))
            })
            .collect();
        rows.push(format!("<tr>{}</tr>", cells.join("")));
    }
    rows.join("\n")
}

fn project_resources(report: &QualityReport) -> String {
    report
        .project_resources()
        .iter()
        .map(|resource| match &resource.url {
            Some(url) => format!("<li>{}</li>", link(url, &resource.name)),
            None => format!(
                "<li>{}: <span style=\"color: red\">no url configured</span></li>",
                escape(&resource.name)
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// JavaScript Date constructor; months are zero based
fn js_date(date: DateTime<Utc>) -> String {
    format!(
        "new Date({}, {}, {}, {}, {}, {})",
        date.year(),
        date.month0(),
        date.day(),
        date.hour(),
        date.minute(),
        date.second()
    )
}

fn trend_rows(points: &[MetaTrendPoint]) -> String {
    points
        .iter()
        .map(|p| {
            format!(
                "[{}, {}, {}, {}, {}]",
                js_date(p.date),
                format_value(p.green),
                format_value(p.yellow),
                format_value(p.red),
                format_value(p.grey)
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

fn metric_rows(report: &QualityReport) -> Result<String> {
    let mut rows = Vec::new();
    for section in report.sections() {
        let version_type = section.product.as_ref().map_or("trunk", |p| p.version_type());
        for metric in &section.metrics {
            let columns = vec![
                metric.id.clone(),
                metric.section_id.clone(),
                metric.status_class(),
                metric.responsible_teams.join(","),
                sparkline(metric),
                status_image(metric),
                metric_text(metric),
                escape(&metric.norm),
                tasks(metric),
                comment(metric),
                version_type.to_string(),
                metric.quality_attribute.id_string().to_string(),
            ];
            rows.push(script_safe(&serde_json::to_string(&columns)?));
        }
    }
    Ok(rows.join(",\n"))
}

/// `<` only occurs inside JSON strings, where `\u003c` reads back the same
/// but can't close the surrounding script element
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
}

fn status_image(metric: &EvaluatedMetric) -> String {
    let since = format!(
        "(since {}{})",
        if metric.status_since.is_lower_bound {
            "at least "
        } else {
            ""
        },
        format_date(metric.status_since.date)
    );
    format!(
        "<img src=\"img/{}.png\" alt=\"{}\" width=\"48\" height=\"48\" title=\"{} {}\" border=\"0\" />",
        metric.status.image(),
        escape(metric.status.alt()),
        escape(metric.status.hover()),
        since
    )
}

fn metric_text(metric: &EvaluatedMetric) -> String {
    let mut text = escape(&metric.report);
    if metric.urls.is_empty() {
        return text;
    }
    let links: Vec<String> = metric.urls.iter().map(|(label, href)| link(href, label)).collect();
    match &metric.url_label {
        Some(label) => text.push_str(&format!("<br>{}: {}", escape(label), links.join(", "))),
        None => text.push_str(&format!(" [{}]", links.join(", "))),
    }
    text
}

fn tasks(metric: &EvaluatedMetric) -> String {
    metric
        .tasks
        .iter()
        .map(|(label, href)| link(href, label))
        .collect::<Vec<_>>()
        .join(", ")
}

fn comment(metric: &EvaluatedMetric) -> String {
    match &metric.comment {
        Some(comment) => match &comment.url {
            Some(url) => link(url, &comment.text),
            None => escape(&comment.text),
        },
        None => String::new(),
    }
}

/// Inline SVG trend line of the recent values
fn sparkline(metric: &EvaluatedMetric) -> String {
    const WIDTH: f64 = 100.0;
    const HEIGHT: f64 = 25.0;
    let values = &metric.recent_values;
    if values.len() < 2 {
        return String::new();
    }
    let (low, high) = match metric.y_axis_range {
        Some((low, high)) => (low as f64, high as f64),
        None => values.iter().fold((f64::MAX, f64::MIN), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        }),
    };
    let span = if high > low { high - low } else { 1.0 };
    let step = WIDTH / (values.len() - 1) as f64;
    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64 * step;
            let y = HEIGHT - (v - low) / span * HEIGHT;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();
    format!(
        "<svg width=\"{}\" height=\"{}\"><polyline fill=\"none\" stroke=\"black\" points=\"{}\" /></svg>",
        WIDTH,
        HEIGHT,
        points.join(" ")
    )
}

/// Product versions and links to related product sections
fn product_meta_data(report: &QualityReport, section: &Section) -> String {
    let Some(product) = &section.product else {
        return String::new();
    };
    let mut lines = Vec::new();
    if product.latest_release {
        lines.push(format!("{} is the latest version.", escape(&product.label())));
    }
    if product.release_candidate {
        lines.push(format!("{} is a release candidate.", escape(&product.label())));
    }
    if !product.dependencies.is_empty() {
        lines.push(format!(
            "Depends on: {}",
            product_links(report, &product.dependencies)
        ));
    }
    if !product.users.is_empty() {
        lines.push(format!("Used by: {}", product_links(report, &product.users)));
    }
    if lines.is_empty() {
        return String::new();
    }
    format!("<p>{}</p>", lines.join("<br>\n"))
}

fn product_links(report: &QualityReport, products: &[ProductRef]) -> String {
    products
        .iter()
        .map(|product| {
            let label = format!(
                "{}:{}",
                product.name,
                product.version.as_deref().unwrap_or("trunk")
            );
            match report.get_product_section(&product.name, product.version.as_deref()) {
                Some(section) => format!(
                    "<a href=\"#section_{}\" style=\"color: {}\">{}</a>",
                    escape(&section.id),
                    link_color(section.color()),
                    escape(&label)
                ),
                None => escape(&label),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Yellow text is unreadable on white
fn link_color(color: &str) -> &str {
    if color == "yellow" {
        "gold"
    } else {
        color
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
