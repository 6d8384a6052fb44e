//! Norm Evaluation
//!
//! Maps a measured value to a [`Status`] given target bounds and the
//! direction in which the metric improves.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::status::Status;

/// Direction in which a metric scores better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
    HigherPercentageIsBetter,
}

/// Target below which a metric is accepted as technical debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDebtTarget {
    pub target: f64,
    #[serde(default)]
    pub explanation: String,
}

impl TechnicalDebtTarget {
    pub fn new(target: f64, explanation: &str) -> Self {
        Self {
            target,
            explanation: explanation.to_string(),
        }
    }

    pub fn describe(&self) -> String {
        if self.explanation.is_empty() {
            format!("Technical debt target: {}", format_value(self.target))
        } else {
            format!(
                "Technical debt target: {} ({})",
                format_value(self.target),
                self.explanation
            )
        }
    }
}

/// Age thresholds for the measurement itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    /// Older than this is at least yellow
    pub old_age: Duration,
    /// Older than this is red
    pub max_old_age: Duration,
}

impl Freshness {
    pub fn days(old: i64, max_old: i64) -> Self {
        Self {
            old_age: Duration::days(old),
            max_old_age: Duration::days(max_old),
        }
    }
}

/// Target parameters for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct Norm {
    pub direction: Direction,
    pub target: f64,
    pub low_target: f64,
    pub perfect: Option<f64>,
    pub technical_debt: Option<TechnicalDebtTarget>,
    pub freshness: Option<Freshness>,
}

impl Norm {
    pub fn lower_is_better(target: f64, low_target: f64) -> Self {
        Self {
            direction: Direction::LowerIsBetter,
            target,
            low_target,
            perfect: Some(0.0),
            technical_debt: None,
            freshness: None,
        }
    }

    pub fn higher_is_better(target: f64, low_target: f64) -> Self {
        Self {
            direction: Direction::HigherIsBetter,
            target,
            low_target,
            perfect: None,
            technical_debt: None,
            freshness: None,
        }
    }

    pub fn higher_percentage_is_better(target: f64, low_target: f64) -> Self {
        Self {
            direction: Direction::HigherPercentageIsBetter,
            target,
            low_target,
            perfect: Some(100.0),
            technical_debt: None,
            freshness: None,
        }
    }

    pub fn with_technical_debt(mut self, debt: Option<TechnicalDebtTarget>) -> Self {
        self.technical_debt = debt;
        self
    }

    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = Some(freshness);
        self
    }

    /// Whether the value misses the target
    pub fn is_below_target(&self, value: f64) -> bool {
        !self.is_value_better_than(value, self.target)
    }

    /// Whether the value is so bad that immediate action is required
    pub fn needs_immediate_action(&self, value: f64) -> bool {
        !self.is_value_better_than(value, self.low_target)
    }

    pub fn is_perfect(&self, value: f64) -> bool {
        self.perfect.map_or(false, |perfect| value == perfect)
    }

    /// Whether the value meets or exceeds `bound` in this norm's direction
    pub fn is_value_better_than(&self, value: f64, bound: f64) -> bool {
        match self.direction {
            Direction::LowerIsBetter => {
                let floor = self.perfect.unwrap_or(0.0);
                floor <= value && value <= bound
            }
            Direction::HigherIsBetter | Direction::HigherPercentageIsBetter => value >= bound,
        }
    }

    /// Evaluate a measured value. `None` means the value could not be measured.
    pub fn evaluate(&self, value: Option<f64>, age: Option<Duration>) -> Status {
        let Some(value) = value else {
            return Status::Red;
        };
        let (old, too_old) = self.age_flags(age);
        let below = self.is_below_target(value) || old;
        let immediate = self.needs_immediate_action(value) || too_old;
        classify(
            below,
            immediate,
            self.is_perfect(value),
            self.debt_applies(value),
        )
    }

    pub(crate) fn age_flags(&self, age: Option<Duration>) -> (bool, bool) {
        match (self.freshness, age) {
            (Some(freshness), Some(age)) => {
                (age > freshness.old_age, age > freshness.max_old_age)
            }
            _ => (false, false),
        }
    }

    fn debt_applies(&self, value: f64) -> bool {
        self.technical_debt
            .as_ref()
            .map_or(false, |debt| self.is_value_better_than(value, debt.target))
    }
}

/// Shared decision table for all metric kinds
pub fn classify(below_target: bool, immediate_action: bool, perfect: bool, debt_applies: bool) -> Status {
    if below_target && debt_applies {
        Status::Grey
    } else if immediate_action {
        Status::Red
    } else if below_target {
        Status::Yellow
    } else if perfect {
        Status::Perfect
    } else {
        Status::Green
    }
}

/// Percentage of `numerator` over `denominator`; 100 when there is nothing to count
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 100.0;
    }
    100.0 * numerator as f64 / denominator as f64
}

/// Render a value without a trailing `.0` for whole numbers
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_is_better() {
        let norm = Norm::lower_is_better(50.0, 100.0);
        assert_eq!(norm.evaluate(Some(0.0), None), Status::Perfect);
        assert_eq!(norm.evaluate(Some(50.0), None), Status::Green);
        assert_eq!(norm.evaluate(Some(51.0), None), Status::Yellow);
        assert_eq!(norm.evaluate(Some(100.0), None), Status::Yellow);
        assert_eq!(norm.evaluate(Some(101.0), None), Status::Red);
    }

    #[test]
    fn test_lower_is_better_negative_value_is_out_of_range() {
        let norm = Norm::lower_is_better(0.0, 3.0);
        assert_eq!(norm.evaluate(Some(-1.0), None), Status::Red);
    }

    #[test]
    fn test_higher_is_better() {
        let norm = Norm::higher_is_better(80.0, 70.0);
        assert_eq!(norm.evaluate(Some(98.0), None), Status::Green);
        assert_eq!(norm.evaluate(Some(80.0), None), Status::Green);
        assert_eq!(norm.evaluate(Some(75.0), None), Status::Yellow);
        assert_eq!(norm.evaluate(Some(69.9), None), Status::Red);
    }

    #[test]
    fn test_higher_percentage_is_better() {
        let norm = Norm::higher_percentage_is_better(95.0, 90.0);
        assert_eq!(norm.evaluate(Some(100.0), None), Status::Perfect);
        assert_eq!(norm.evaluate(Some(96.0), None), Status::Green);
        assert_eq!(norm.evaluate(Some(92.0), None), Status::Yellow);
        assert_eq!(norm.evaluate(Some(50.0), None), Status::Red);
    }

    #[test]
    fn test_missing_value_is_red() {
        let norm = Norm::lower_is_better(50.0, 100.0);
        assert_eq!(norm.evaluate(None, None), Status::Red);
    }

    #[test]
    fn test_technical_debt_turns_grey() {
        let norm = Norm::lower_is_better(50.0, 100.0)
            .with_technical_debt(Some(TechnicalDebtTarget::new(120.0, "legacy backlog")));
        assert_eq!(norm.evaluate(Some(110.0), None), Status::Grey);
        assert_eq!(norm.evaluate(Some(130.0), None), Status::Red);
        // Meeting the real target is unaffected by the debt target
        assert_eq!(norm.evaluate(Some(10.0), None), Status::Green);
    }

    #[test]
    fn test_freshness() {
        let norm = Norm::higher_is_better(80.0, 70.0).with_freshness(Freshness::days(7, 14));
        assert_eq!(norm.evaluate(Some(90.0), Some(Duration::days(1))), Status::Green);
        assert_eq!(norm.evaluate(Some(90.0), Some(Duration::days(8))), Status::Yellow);
        assert_eq!(norm.evaluate(Some(90.0), Some(Duration::days(15))), Status::Red);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 100.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(1.26), "1.3");
    }

    #[test]
    fn test_debt_description() {
        assert_eq!(
            TechnicalDebtTarget::new(7.0, "").describe(),
            "Technical debt target: 7"
        );
        assert_eq!(
            TechnicalDebtTarget::new(7.0, "old code").describe(),
            "Technical debt target: 7 (old code)"
        );
    }
}
