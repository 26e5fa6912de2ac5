//! Detected recurrence pattern shapes and their stability classification.

use std::collections::BTreeSet;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::defaults::{
    PATTERN_WEIGHT_INTERVAL, PATTERN_WEIGHT_MONTHLY_SET, PATTERN_WEIGHT_WEEKLY_SET,
};
use crate::recurrence::{iso_weekdays, EndCondition, MonthlyRule, RecurrenceRule};

// =============================================================================
// STABLE TYPE
// =============================================================================

/// Confidence classification of a detected pattern, from the consistency of
/// the most recent interval deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StableType {
    /// Neither recent-delta condition holds.
    ContaminatedStable,
    /// The two prior-to-last deltas agree but the most recent breaks the
    /// pattern.
    PartiallyStable,
    /// The two most recent deltas match each other and the dominant pattern.
    PerfectlyStable,
}

impl StableType {
    /// Whether a pattern at this confidence may be surfaced to the member.
    /// Contaminated classifications are never emitted.
    pub fn is_suggestible(&self) -> bool {
        !matches!(self, StableType::ContaminatedStable)
    }
}

// =============================================================================
// PATTERN VALUE
// =============================================================================

/// Candidate recurrence shape derived from observed occurrence history.
/// Exactly one variant is active per detection result; pattern-specific
/// fields live inside their variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternValue {
    /// Fixed day gap between occurrences.
    Interval { days: i64 },
    /// A set of weekdays repeating every `week_gap` weeks.
    WeeklySet {
        week_gap: i64,
        #[serde(with = "iso_weekdays")]
        weekdays: Vec<Weekday>,
    },
    /// A set of days of the month repeating every `month_gap` months.
    MonthlySet { month_gap: i32, days: BTreeSet<u32> },
}

impl PatternValue {
    /// Fixed-priority scoring weight. Set-shaped patterns outrank a bare
    /// interval; weekly and monthly sets rank equally.
    pub fn weight(&self) -> u32 {
        match self {
            PatternValue::Interval { .. } => PATTERN_WEIGHT_INTERVAL,
            PatternValue::WeeklySet { .. } => PATTERN_WEIGHT_WEEKLY_SET,
            PatternValue::MonthlySet { .. } => PATTERN_WEIGHT_MONTHLY_SET,
        }
    }

    /// Number of distinct set elements the pattern needs. Used as the
    /// simpler-explanation tie-breaker; an interval counts as one.
    pub fn element_count(&self) -> usize {
        match self {
            PatternValue::Interval { .. } => 1,
            PatternValue::WeeklySet { weekdays, .. } => weekdays.len(),
            PatternValue::MonthlySet { days, .. } => days.len(),
        }
    }

    /// Category slug carried on the persisted suggestion.
    pub fn category(&self) -> &'static str {
        match self {
            PatternValue::Interval { .. } => "interval",
            PatternValue::WeeklySet { .. } => "weekly_set",
            PatternValue::MonthlySet { .. } => "monthly_set",
        }
    }

    /// Materialize the proposed recurrence rule, when the pattern maps onto
    /// one faithfully.
    ///
    /// Day gaps in whole weeks become a weekly rule on the anchor weekday;
    /// other gaps become daily rules. A multi-day monthly set has no
    /// faithful `MonthlyRule` counterpart and yields `None` — downstream
    /// phrasing describes the set instead.
    pub fn to_rule(&self, anchor_weekday: Weekday, end: EndCondition) -> Option<RecurrenceRule> {
        match self {
            PatternValue::Interval { days } => {
                if *days > 0 && days % 7 == 0 {
                    Some(RecurrenceRule::weekly(
                        (days / 7) as u32,
                        vec![anchor_weekday],
                        end,
                    ))
                } else if *days > 0 {
                    Some(RecurrenceRule::daily(*days as u32, end))
                } else {
                    None
                }
            }
            PatternValue::WeeklySet { week_gap, weekdays } => {
                if *week_gap > 0 && !weekdays.is_empty() {
                    Some(RecurrenceRule::weekly(
                        *week_gap as u32,
                        weekdays.clone(),
                        end,
                    ))
                } else {
                    None
                }
            }
            PatternValue::MonthlySet { month_gap, days } => {
                match (days.len(), days.iter().next().copied()) {
                    (1, Some(day)) if *month_gap > 0 => Some(RecurrenceRule::monthly(
                        *month_gap as u32,
                        MonthlyRule::Single(day),
                        end,
                    )),
                    _ => None,
                }
            }
        }
    }
}

// =============================================================================
// DETECTION RESULT
// =============================================================================

/// Winning pattern plus its confidence, as emitted by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSuggestion {
    pub value: PatternValue,
    pub stability: StableType,
}

/// Outcome of a detection run over one target's occurrence history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Fewer than the minimum occurrences — nothing to classify. Not an
    /// error.
    InsufficientData,
    /// No candidate reached at least partial stability; low-confidence
    /// guesses are never surfaced.
    NoSuggestion,
    Suggestion(PatternSuggestion),
}

impl Detection {
    pub fn suggestion(&self) -> Option<&PatternSuggestion> {
        match self {
            Detection::Suggestion(s) => Some(s),
            _ => None,
        }
    }
}
