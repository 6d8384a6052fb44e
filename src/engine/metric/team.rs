//! Team metrics: sprint progress and team spirit

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::norm::{classify, format_value, Freshness, Norm};
use super::quality_attribute::{PROGRESS, SPIRIT};
use super::{format_date, measured, Metric, MetricContext, QualityAttribute, Status};
use crate::engine::domain::Team;
use crate::engine::source::{Birt, SprintProgress, Urls, Wiki};

/// Velocity needed to finish the sprint compared to the planned velocity
pub struct TeamProgress {
    birt: Arc<dyn Birt>,
    team: Team,
    birt_id: String,
    ctx: MetricContext,
}

impl TeamProgress {
    pub const KIND: &'static str = "TeamProgress";

    pub fn new(birt: Arc<dyn Birt>, team: Team, birt_id: &str, ctx: MetricContext) -> Self {
        Self {
            birt,
            team,
            birt_id: birt_id.to_string(),
            ctx,
        }
    }

    fn progress(&self) -> Option<SprintProgress> {
        measured(Self::KIND, self.birt.sprint_progress(&self.birt_id))
    }
}

impl Metric for TeamProgress {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn subject_name(&self) -> Option<String> {
        Some(self.team.base.name.clone())
    }

    fn quality_attribute(&self) -> QualityAttribute {
        PROGRESS
    }

    /// Target factors are relative to the planned velocity
    fn norm(&self) -> Norm {
        let mut norm = self.ctx.apply(Norm::lower_is_better(1.25, 1.5));
        let planned = self.progress().map_or(0.0, |p| p.planned_velocity);
        norm.target *= planned;
        norm.low_target *= planned;
        norm
    }

    fn value(&self) -> Option<f64> {
        self.progress().map(|p| p.required_velocity)
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The velocity required to complete the sprint is at most {} points per day. More than {} points per day is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        let Some(progress) = self.progress() else {
            return format!(
                "The sprint progress of team {} could not be determined.",
                self.team.base.name
            );
        };
        format!(
            "Team {} needs {} points per day to complete the sprint. The planned velocity is {} and the actual velocity is {} points per day. {} of {} points realized on day {} of {}.",
            self.team.base.name,
            format_value(progress.required_velocity),
            format_value(progress.planned_velocity),
            format_value(progress.actual_velocity),
            format_value(progress.points_realized),
            format_value(progress.points_planned),
            progress.day_in_sprint,
            progress.days_in_sprint
        )
    }

    fn urls(&self) -> Urls {
        Urls::from([(
            "BIRT".to_string(),
            self.birt.sprint_progress_url(&self.birt_id),
        )])
    }

    fn responsible_teams(&self) -> Vec<String> {
        vec![self.team.base.name.clone()]
    }
}

/// Team mood as recorded on the wiki
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Smiley {
    Sad,
    Neutral,
    Happy,
    Unknown,
}

impl Smiley {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            ":-(" => Smiley::Sad,
            ":-|" => Smiley::Neutral,
            ":-)" => Smiley::Happy,
            _ => Smiley::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Smiley::Sad => ":-(",
            Smiley::Neutral => ":-|",
            Smiley::Happy => ":-)",
            Smiley::Unknown => "?",
        }
    }

    /// Position on the trend graph axis
    pub fn number(&self) -> f64 {
        match self {
            Smiley::Sad => 0.0,
            Smiley::Neutral => 1.0,
            Smiley::Happy | Smiley::Unknown => 2.0,
        }
    }

    pub fn from_number(number: f64) -> Self {
        if number <= 0.0 {
            Smiley::Sad
        } else if number < 2.0 {
            Smiley::Neutral
        } else {
            Smiley::Happy
        }
    }
}

impl fmt::Display for Smiley {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last recorded team spirit
pub struct TeamSpirit {
    wiki: Arc<dyn Wiki>,
    team: Team,
    ctx: MetricContext,
}

impl TeamSpirit {
    pub const KIND: &'static str = "TeamSpirit";

    pub fn new(wiki: Arc<dyn Wiki>, team: Team, ctx: MetricContext) -> Self {
        Self { wiki, team, ctx }
    }

    /// None when the wiki could not be read; unrecorded spirit is unknown
    pub fn smiley(&self) -> Option<Smiley> {
        measured(Self::KIND, self.wiki.team_spirit(&self.team.base.name))
            .map(|spirit| spirit.map_or(Smiley::Unknown, |s| Smiley::parse(&s)))
    }
}

impl Metric for TeamSpirit {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn subject_name(&self) -> Option<String> {
        Some(self.team.base.name.clone())
    }

    fn quality_attribute(&self) -> QualityAttribute {
        SPIRIT
    }

    fn norm(&self) -> Norm {
        self.ctx
            .apply(Norm::higher_is_better(
                Smiley::Happy.number(),
                Smiley::Sad.number(),
            ))
            .with_freshness(Freshness::days(7, 14))
    }

    fn value(&self) -> Option<f64> {
        self.smiley().map(|smiley| smiley.number())
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        measured(
            Self::KIND,
            self.wiki
                .date_of_last_team_spirit_measurement(&self.team.base.name),
        )
        .flatten()
    }

    fn age(&self) -> Option<Duration> {
        self.date().map(|date| self.ctx.now - date)
    }

    fn status(&self) -> Status {
        let Some(smiley) = self.smiley() else {
            return Status::Red;
        };
        let norm = self.norm();
        let number = smiley.number();
        let (old, too_old) = norm.age_flags(self.age());
        classify(
            number < norm.target || old,
            number <= norm.low_target || too_old,
            smiley == Smiley::Happy,
            false,
        )
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The mood of the team is {}. {} is red. Measurements older than 7 days are yellow, older than 14 days are red.",
            Smiley::from_number(norm.target),
            Smiley::from_number(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match (self.smiley(), self.date()) {
            (Some(smiley), Some(date)) => format!(
                "The mood of team {} was {} on {}.",
                self.team.base.name,
                smiley,
                format_date(date)
            ),
            (Some(smiley), None) => {
                format!("The mood of team {} was {}.", self.team.base.name, smiley)
            }
            (None, _) => format!(
                "The mood of team {} could not be determined.",
                self.team.base.name
            ),
        }
    }

    fn urls(&self) -> Urls {
        Urls::from([("Wiki".to_string(), self.wiki.url())])
    }

    fn y_axis_range(&self) -> Option<(i64, i64)> {
        Some((0, 2))
    }

    fn responsible_teams(&self) -> Vec<String> {
        vec![self.team.base.name.clone()]
    }
}

/// Days since the team spirit was last measured
pub struct TeamSpiritAge {
    wiki: Arc<dyn Wiki>,
    team: Team,
    ctx: MetricContext,
}

impl TeamSpiritAge {
    pub const KIND: &'static str = "TeamSpiritAge";

    pub fn new(wiki: Arc<dyn Wiki>, team: Team, ctx: MetricContext) -> Self {
        Self { wiki, team, ctx }
    }
}

impl Metric for TeamSpiritAge {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn subject_name(&self) -> Option<String> {
        Some(self.team.base.name.clone())
    }

    fn quality_attribute(&self) -> QualityAttribute {
        SPIRIT
    }

    fn norm(&self) -> Norm {
        self.ctx.apply(Norm::lower_is_better(21.0, 42.0))
    }

    fn value(&self) -> Option<f64> {
        self.date().map(|date| self.ctx.days_since(date) as f64)
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        measured(
            Self::KIND,
            self.wiki
                .date_of_last_team_spirit_measurement(&self.team.base.name),
        )
        .flatten()
    }

    fn norm_description(&self, norm: &Norm) -> String {
        format!(
            "The team spirit is measured at least every {} days. Not measured for more than {} days is red.",
            format_value(norm.target),
            format_value(norm.low_target)
        )
    }

    fn report(&self) -> String {
        match (self.value(), self.date()) {
            (Some(days), Some(date)) => format!(
                "The team spirit of team {} was last measured {} days ago (on {}).",
                self.team.base.name,
                days,
                format_date(date)
            ),
            _ => format!(
                "The team spirit of team {} has not been measured.",
                self.team.base.name
            ),
        }
    }

    fn urls(&self) -> Urls {
        Urls::from([("Wiki".to_string(), self.wiki.url())])
    }

    fn responsible_teams(&self) -> Vec<String> {
        vec![self.team.base.name.clone()]
    }
}
