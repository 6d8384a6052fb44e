//! Project management metrics: risk log, action list, releases and bugs

use chrono::{DateTime, Months, Utc};
use std::sync::Arc;

use super::norm::{format_value, Norm};
use super::quality_attribute::{PROGRESS, PROJECT_MANAGEMENT, SECURITY, TEST_QUALITY};
use super::{format_date, measured, Metric, MetricContext, QualityAttribute};
use crate::engine::source::{Jira, ReleaseArchive, TrelloBoard, Urls};

/// Link shown when a Trello board can't be reached
pub const TRELLO_FALLBACK_URL: &str = "http://trello.com";

fn trello_urls(board: &dyn TrelloBoard) -> Urls {
    let url = board.url().unwrap_or_else(|_| TRELLO_FALLBACK_URL.to_string());
    Urls::from([("Trello".to_string(), url)])
}

fn single_url(label: &str, url: String) -> Urls {
    Urls::from([(label.to_string(), url)])
}

/// Days since the risk log was last updated
pub struct RiskLog {
    board: Arc<dyn TrelloBoard>,
    ctx: MetricContext,
}

impl RiskLog {
    pub const KIND: &'static str = "RiskLog";

    pub fn new(board: Arc<dyn TrelloBoard>, ctx: MetricContext) -> Self {
        Self { board, ctx }
    }
}

impl Metric for RiskLog {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        PROJECT_MANAGEMENT
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(14.0, 28.0))
    }

    fn value(&self) -> Option<f64> {
        self.date().map(|date| self.ctx.days_since(date) as f64)
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        measured(Self::KIND, self.board.date_of_last_update())
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The risk log is updated at least once every {} days. Not updated for more than {} days is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match (self.value(), self.date()) {
            (Some(days), Some(date)) => format!(
                "The risk log was last updated {} days ago (on {}).",
                days,
                format_date(date)
            ),
            _ => "The date of the last risk log update could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        trello_urls(self.board.as_ref())
    }
}

/// Days since the action list was last updated
pub struct ActionActivity {
    board: Arc<dyn TrelloBoard>,
    ctx: MetricContext,
}

impl ActionActivity {
    pub const KIND: &'static str = "ActionActivity";

    pub fn new(board: Arc<dyn TrelloBoard>, ctx: MetricContext) -> Self {
        Self { board, ctx }
    }
}

impl Metric for ActionActivity {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        PROJECT_MANAGEMENT
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(7.0, 14.0))
    }

    fn value(&self) -> Option<f64> {
        self.date().map(|date| self.ctx.days_since(date) as f64)
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        measured(Self::KIND, self.board.date_of_last_update())
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The action and decision list is updated at least once every {} days. Not updated for more than {} days is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match (self.value(), self.date()) {
            (Some(days), Some(date)) => format!(
                "The action and decision list was last updated {} days ago (on {}).",
                days,
                format_date(date)
            ),
            _ => "The date of the last action list update could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        trello_urls(self.board.as_ref())
    }
}

/// Number of actions that are overdue or inactive
pub struct ActionAge {
    board: Arc<dyn TrelloBoard>,
    ctx: MetricContext,
}

impl ActionAge {
    pub const KIND: &'static str = "ActionAge";

    pub fn new(board: Arc<dyn TrelloBoard>, ctx: MetricContext) -> Self {
        Self { board, ctx }
    }
}

impl Metric for ActionAge {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        PROJECT_MANAGEMENT
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(0.0, 3.0))
    }

    fn value(&self) -> Option<f64> {
        measured(Self::KIND, self.board.nr_of_over_due_or_inactive_cards()).map(|n| n as f64)
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "At most {} actions in the action and decision list are overdue or not updated for too long (14 days). More than {} is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match self.value() {
            Some(count) => format!(
                "{} actions in the action and decision list are overdue or not updated for too long (14 days).",
                count
            ),
            None => "The number of overdue or inactive actions could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        self.board
            .over_due_or_inactive_cards()
            .unwrap_or_else(|_| trello_urls(self.board.as_ref()))
    }

    fn url_label(&self) -> Option<&'static str> {
        Some("Overdue or inactive actions")
    }
}

/// Age of the most recent release
pub struct ReleaseAge {
    archive: Arc<dyn ReleaseArchive>,
    ctx: MetricContext,
}

impl ReleaseAge {
    pub const KIND: &'static str = "ReleaseAge";

    pub fn new(archive: Arc<dyn ReleaseArchive>, ctx: MetricContext) -> Self {
        Self { archive, ctx }
    }
}

impl Metric for ReleaseAge {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        PROGRESS
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(21.0, 28.0))
    }

    fn value(&self) -> Option<f64> {
        self.date().map(|date| self.ctx.days_since(date) as f64)
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        measured(Self::KIND, self.archive.date_of_most_recent_file())
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The last release is not older than {} days. Older than {} days is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match self.value() {
            Some(days) => format!(
                "The most recent {} release is {} day(s) old.",
                self.archive.name(),
                days
            ),
            None => format!(
                "The age of the most recent {} release could not be determined.",
                self.archive.name()
            ),
        }
    }

    fn urls(&self) -> Urls {
        single_url(
            &format!("Release archive {}", self.archive.name()),
            self.archive.url(),
        )
    }
}

/// Number of open bug reports
pub struct OpenBugs {
    jira: Arc<dyn Jira>,
    ctx: MetricContext,
}

impl OpenBugs {
    pub const KIND: &'static str = "OpenBugs";

    pub fn new(jira: Arc<dyn Jira>, ctx: MetricContext) -> Self {
        Self { jira, ctx }
    }
}

impl Metric for OpenBugs {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        PROGRESS
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(50.0, 100.0))
    }

    fn value(&self) -> Option<f64> {
        measured(Self::KIND, self.jira.nr_open_bugs()).map(|n| n as f64)
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The number of open bug reports is at most {}. More than {} is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match self.value() {
            Some(count) => format!("The number of open bug reports is {}.", count),
            None => "The number of open bug reports could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        single_url("Jira", self.jira.nr_open_bugs_url())
    }
}

/// Number of security bugs open for more than a sprint
pub struct OpenSecurityBugs {
    jira: Arc<dyn Jira>,
    ctx: MetricContext,
}

impl OpenSecurityBugs {
    pub const KIND: &'static str = "OpenSecurityBugs";

    pub fn new(jira: Arc<dyn Jira>, ctx: MetricContext) -> Self {
        Self { jira, ctx }
    }
}

impl Metric for OpenSecurityBugs {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        SECURITY
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(0.0, 3.0))
    }

    fn value(&self) -> Option<f64> {
        measured(Self::KIND, self.jira.nr_open_security_bugs()).map(|n| n as f64)
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The number of security bug reports open for more than a sprint is at most {}. More than {} is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match self.value() {
            Some(count) => format!(
                "The number of security bug reports open for more than a sprint is {}.",
                count
            ),
            None => "The number of open security bug reports could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        single_url("Jira", self.jira.nr_open_security_bugs_url())
    }
}

/// Number of blocking test issues opened in the previous month
pub struct BlockingTestIssues {
    jira: Arc<dyn Jira>,
    ctx: MetricContext,
}

impl BlockingTestIssues {
    pub const KIND: &'static str = "BlockingTestIssues";

    pub fn new(jira: Arc<dyn Jira>, ctx: MetricContext) -> Self {
        Self { jira, ctx }
    }

    fn previous_month(&self) -> String {
        self.ctx
            .now
            .checked_sub_months(Months::new(1))
            .unwrap_or(self.ctx.now)
            .format("%B %Y")
            .to_string()
    }
}

impl Metric for BlockingTestIssues {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn quality_attribute(&self) -> QualityAttribute {
        TEST_QUALITY
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(0.0, 1.0))
    }

    fn value(&self) -> Option<f64> {
        measured(Self::KIND, self.jira.nr_blocking_test_issues()).map(|n| n as f64)
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The number of blocking test issues opened is at most {}. More than {} is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match self.value() {
            Some(count) => format!(
                "The number of blocking test issues opened in the previous month ({}) was {}.",
                self.previous_month(),
                count
            ),
            None => "The number of blocking test issues could not be determined.".to_string(),
        }
    }

    fn urls(&self) -> Urls {
        single_url("Jira", self.jira.nr_blocking_test_issues_url())
    }
}
