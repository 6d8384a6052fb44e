//! Metric Status
//!
//! Traffic-light classification of an evaluated metric

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Score can't get any better
    Perfect,
    /// Norm met
    Green,
    /// Norm just missed
    Yellow,
    /// Immediate action required
    Red,
    /// Below target but accepted as technical debt
    Grey,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Perfect,
        Status::Green,
        Status::Yellow,
        Status::Red,
        Status::Grey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Perfect => "perfect",
            Status::Green => "green",
            Status::Yellow => "yellow",
            Status::Red => "red",
            Status::Grey => "grey",
        }
    }

    /// Severity rank, higher is worse
    pub fn severity(&self) -> u8 {
        match self {
            Status::Perfect => 0,
            Status::Green => 1,
            Status::Grey => 2,
            Status::Yellow => 3,
            Status::Red => 4,
        }
    }

    /// Sort key used by the report table
    pub fn sort_number(&self) -> u8 {
        match self {
            Status::Red => 0,
            Status::Yellow => 1,
            Status::Green => 2,
            Status::Perfect => 3,
            Status::Grey => 4,
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            Status::Perfect => "biggrin",
            Status::Green => "smile",
            Status::Yellow => "plain",
            Status::Red => "sad",
            Status::Grey => "ashamed",
        }
    }

    pub fn alt(&self) -> &'static str {
        match self {
            Status::Perfect => ":-D",
            Status::Green => ":-)",
            Status::Yellow => ":-|",
            Status::Red => ":-(",
            Status::Grey => ":-o",
        }
    }

    pub fn hover(&self) -> &'static str {
        match self {
            Status::Perfect => "Perfect: score can't get any better",
            Status::Green => "Good: norm met",
            Status::Yellow => "Almost good: norm just missed",
            Status::Red => "Immediate action required: norm not met or measurement too old",
            Status::Grey => "Technical debt: will be fixed later",
        }
    }

    /// Whether the status counts as meeting the norm
    pub fn is_green(&self) -> bool {
        matches!(self, Status::Green | Status::Perfect)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most severe status of a set, None for an empty set
pub fn worst<I>(statuses: I) -> Option<Status>
where
    I: IntoIterator<Item = Status>,
{
    statuses.into_iter().max_by_key(|s| s.severity())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_prefers_red() {
        let statuses = vec![Status::Green, Status::Red, Status::Yellow, Status::Grey];
        assert_eq!(worst(statuses), Some(Status::Red));
    }

    #[test]
    fn test_worst_ranks_grey_between_yellow_and_green() {
        assert_eq!(worst(vec![Status::Perfect, Status::Grey]), Some(Status::Grey));
        assert_eq!(worst(vec![Status::Grey, Status::Yellow]), Some(Status::Yellow));
    }

    #[test]
    fn test_worst_of_nothing() {
        assert_eq!(worst(Vec::new()), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Status::Perfect).unwrap();
        assert_eq!(json, "\"perfect\"");
        let status: Status = serde_json::from_str("\"grey\"").unwrap();
        assert_eq!(status, Status::Grey);
    }
}
