//! Recurrence rule model and validation.
//!
//! A [`RecurrenceRule`] declares a repeating schedule: frequency, step
//! interval, the day selectors the frequency needs, and exactly one end
//! condition (enforced by the [`EndCondition`] enum — there is no way to
//! populate two variants at once). The rule is pure data; expansion lives in
//! the engine crate.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_RULE_INTERVAL;
use crate::error::{Error, Result};

// =============================================================================
// FREQUENCY
// =============================================================================

/// Base cadence of a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// One-off: the anchor is the only occurrence.
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Whether this frequency produces more than one occurrence.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::None)
    }
}

// =============================================================================
// MONTHLY RULE
// =============================================================================

/// Day selector for monthly rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyRule {
    /// A single day of the month (1..=31). Months missing the day are
    /// skipped entirely — never clamped — so the series does not drift.
    Single(u32),
    /// Every Monday through Friday of the month.
    Weekdays,
    /// Every Saturday and Sunday of the month.
    Weekends,
    /// Every day of the month.
    AllDays,
}

// =============================================================================
// END CONDITION
// =============================================================================

/// How a recurrence series ends. Exactly one variant is ever populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    /// No declared end. Expansion is bounded by the engine's implicit
    /// horizon (see `defaults::NEVER_EXPANSION_HORIZON_MONTHS`).
    Never,
    /// Last admissible occurrence time, inclusive.
    ByDate(DateTime<Utc>),
    /// Maximum number of occurrences, counted from the anchor.
    ByCount(u32),
}

// =============================================================================
// RULE
// =============================================================================

/// Declarative repeating-schedule definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Step multiplier in units of the frequency. Always ≥ 1.
    pub interval: u32,
    /// Selected weekdays, ISO order (Mon..Sun). Required non-empty for
    /// weekly rules, ignored otherwise.
    #[serde(with = "iso_weekdays", default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Weekday>,
    /// Day selector for monthly rules, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<MonthlyRule>,
    pub end: EndCondition,
}

impl RecurrenceRule {
    /// One-off rule: the anchor is the only occurrence.
    pub fn once() -> Self {
        Self {
            frequency: Frequency::None,
            interval: DEFAULT_RULE_INTERVAL,
            weekdays: Vec::new(),
            monthly: None,
            end: EndCondition::Never,
        }
    }

    /// Every `interval` days.
    pub fn daily(interval: u32, end: EndCondition) -> Self {
        Self {
            frequency: Frequency::Daily,
            interval,
            weekdays: Vec::new(),
            monthly: None,
            end,
        }
    }

    /// Every `interval` weeks on the given weekdays.
    pub fn weekly(interval: u32, weekdays: Vec<Weekday>, end: EndCondition) -> Self {
        Self {
            frequency: Frequency::Weekly,
            interval,
            weekdays,
            monthly: None,
            end,
        }
    }

    /// Every `interval` months on the days the monthly rule selects.
    pub fn monthly(interval: u32, monthly: MonthlyRule, end: EndCondition) -> Self {
        Self {
            frequency: Frequency::Monthly,
            interval,
            weekdays: Vec::new(),
            monthly: Some(monthly),
            end,
        }
    }

    /// Every `interval` years on the anchor's month and day.
    pub fn yearly(interval: u32, end: EndCondition) -> Self {
        Self {
            frequency: Frequency::Yearly,
            interval,
            weekdays: Vec::new(),
            monthly: None,
            end,
        }
    }

    /// Whether the rule produces more than one occurrence.
    pub fn is_recurring(&self) -> bool {
        self.frequency.is_recurring()
    }

    /// Validate the rule's invariants.
    ///
    /// Rejected input is never silently corrected: a zero interval, an empty
    /// or duplicated weekday set on a weekly rule, an out-of-range monthly
    /// day, or a zero occurrence count all surface as
    /// [`Error::Validation`].
    pub fn validate(&self) -> Result<()> {
        if self.interval < 1 {
            return Err(Error::Validation(
                "recurrence interval must be at least 1".to_string(),
            ));
        }
        if self.frequency == Frequency::Weekly {
            if self.weekdays.is_empty() {
                return Err(Error::Validation(
                    "weekly recurrence requires a non-empty weekday set".to_string(),
                ));
            }
            let mut seen = [false; 7];
            for day in &self.weekdays {
                let idx = day.num_days_from_monday() as usize;
                if seen[idx] {
                    return Err(Error::Validation(format!(
                        "duplicate weekday in weekly recurrence: {day}"
                    )));
                }
                seen[idx] = true;
            }
        }
        if self.frequency == Frequency::Monthly {
            match self.monthly {
                None => {
                    return Err(Error::Validation(
                        "monthly recurrence requires a day selector".to_string(),
                    ))
                }
                Some(MonthlyRule::Single(day)) if !(1..=31).contains(&day) => {
                    return Err(Error::Validation(format!(
                        "monthly day out of range 1..=31: {day}"
                    )))
                }
                Some(_) => {}
            }
        }
        if let EndCondition::ByCount(0) = self.end {
            return Err(Error::Validation(
                "occurrence count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// WEEKDAY (DE)SERIALIZATION
// =============================================================================

/// Serde adapter mapping `Vec<Weekday>` to ISO weekday numbers (1 = Monday,
/// 7 = Sunday) on the wire. Deterministic and locale-free.
pub mod iso_weekdays {
    use chrono::Weekday;
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Map an ISO weekday number (1..=7) to a `Weekday`.
    pub fn weekday_from_iso(n: u8) -> Option<Weekday> {
        match n {
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            7 => Some(Weekday::Sun),
            _ => None,
        }
    }

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        let numbers: Vec<u8> = days.iter().map(|d| d.number_from_monday() as u8).collect();
        serializer.collect_seq(numbers)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Weekday>, D::Error> {
        let numbers = Vec::<u8>::deserialize(deserializer)?;
        numbers
            .into_iter()
            .map(|n| {
                weekday_from_iso(n)
                    .ok_or_else(|| D::Error::custom(format!("ISO weekday out of range: {n}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_rule_is_not_recurring() {
        let rule = RecurrenceRule::once();
        assert!(!rule.is_recurring());
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_daily_rule_validates() {
        let rule = RecurrenceRule::daily(2, EndCondition::ByCount(10));
        assert!(rule.is_recurring());
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let rule = RecurrenceRule::daily(0, EndCondition::Never);
        assert!(matches!(rule.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_weekly_requires_weekdays() {
        let rule = RecurrenceRule::weekly(1, vec![], EndCondition::Never);
        assert!(matches!(rule.validate(), Err(Error::Validation(_))));

        let rule = RecurrenceRule::weekly(1, vec![Weekday::Mon, Weekday::Wed], EndCondition::Never);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_weekly_rejects_duplicate_weekdays() {
        let rule = RecurrenceRule::weekly(1, vec![Weekday::Mon, Weekday::Mon], EndCondition::Never);
        assert!(matches!(rule.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_monthly_requires_selector() {
        let mut rule = RecurrenceRule::monthly(1, MonthlyRule::AllDays, EndCondition::Never);
        assert!(rule.validate().is_ok());

        rule.monthly = None;
        assert!(matches!(rule.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_monthly_single_day_range() {
        for day in [1, 15, 31] {
            let rule = RecurrenceRule::monthly(1, MonthlyRule::Single(day), EndCondition::Never);
            assert!(rule.validate().is_ok(), "day {day} should be valid");
        }
        for day in [0, 32] {
            let rule = RecurrenceRule::monthly(1, MonthlyRule::Single(day), EndCondition::Never);
            assert!(rule.validate().is_err(), "day {day} should be rejected");
        }
    }

    #[test]
    fn test_zero_count_rejected() {
        let rule = RecurrenceRule::daily(1, EndCondition::ByCount(0));
        assert!(matches!(rule.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rule_serde_round_trip() {
        let rule = RecurrenceRule::weekly(
            2,
            vec![Weekday::Mon, Weekday::Fri],
            EndCondition::ByCount(8),
        );
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains(r#""weekdays":[1,5]"#), "json: {json}");
        let back: RecurrenceRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_weekday_wire_format_rejects_out_of_range() {
        let json = r#"{"frequency":"weekly","interval":1,"weekdays":[0],"end":"never"}"#;
        assert!(serde_json::from_str::<RecurrenceRule>(json).is_err());
    }

    #[test]
    fn test_iso_weekday_mapping_is_total_over_range() {
        use iso_weekdays::weekday_from_iso;
        for n in 1..=7u8 {
            let day = weekday_from_iso(n).unwrap();
            assert_eq!(day.number_from_monday() as u8, n);
        }
        assert!(weekday_from_iso(0).is_none());
        assert!(weekday_from_iso(8).is_none());
    }
}
