//! Round-trip tests between recurrence expansion and pattern detection.
//!
//! Occurrences generated by the engine from a rule should be recognized by
//! the detector as the pattern the rule encodes — the two halves of the
//! crate agree on what a schedule looks like.

use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};

use cadence_core::{Detection, EndCondition, PatternValue, RecurrenceRule, StableType};
use cadence_engine::{detect, expand, next_occurrence};

/// 2025-06-02 is a Monday.
fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
}

#[test]
fn weekly_expansion_detects_as_weekly_set() {
    let rule = RecurrenceRule::weekly(
        1,
        vec![Weekday::Mon, Weekday::Wed],
        EndCondition::ByCount(8),
    );
    let history = expand(&rule, anchor(), anchor(), anchor() + Duration::days(60));
    assert_eq!(history.len(), 8);

    let suggestion = match detect(&history) {
        Detection::Suggestion(s) => s,
        other => panic!("expected suggestion, got {other:?}"),
    };
    assert_eq!(suggestion.stability, StableType::PerfectlyStable);
    assert_eq!(
        suggestion.value,
        PatternValue::WeeklySet {
            week_gap: 1,
            weekdays: vec![Weekday::Mon, Weekday::Wed],
        }
    );

    // And the detected pattern materializes back into an equivalent rule.
    let proposed = suggestion
        .value
        .to_rule(Weekday::Mon, EndCondition::ByCount(8))
        .expect("weekly set maps to a rule");
    assert_eq!(proposed.frequency, rule.frequency);
    assert_eq!(proposed.interval, rule.interval);
    assert_eq!(proposed.weekdays, rule.weekdays);
}

#[test]
fn daily_expansion_detects_as_interval() {
    let rule = RecurrenceRule::daily(3, EndCondition::ByCount(6));
    let history = expand(&rule, anchor(), anchor(), anchor() + Duration::days(40));

    let suggestion = match detect(&history) {
        Detection::Suggestion(s) => s,
        other => panic!("expected suggestion, got {other:?}"),
    };
    assert_eq!(suggestion.value, PatternValue::Interval { days: 3 });
    assert_eq!(suggestion.stability, StableType::PerfectlyStable);
}

#[test]
fn monthly_expansion_detects_as_monthly_set() {
    let anchor = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
    let rule = RecurrenceRule::monthly(
        1,
        cadence_core::MonthlyRule::Single(15),
        EndCondition::ByCount(5),
    );
    let history = expand(&rule, anchor, anchor, anchor + Duration::days(200));
    assert_eq!(history.len(), 5);

    let suggestion = match detect(&history) {
        Detection::Suggestion(s) => s,
        other => panic!("expected suggestion, got {other:?}"),
    };
    assert_eq!(
        suggestion.value,
        PatternValue::MonthlySet {
            month_gap: 1,
            days: std::collections::BTreeSet::from([15]),
        }
    );
}

#[test]
fn next_occurrence_walks_the_expansion() {
    // Stepping with next_occurrence reproduces exactly the expanded window.
    let rule = RecurrenceRule::weekly(
        2,
        vec![Weekday::Tue, Weekday::Fri],
        EndCondition::ByCount(7),
    );
    let expanded = expand(&rule, anchor(), anchor(), anchor() + Duration::days(120));

    let mut walked = Vec::new();
    let mut cursor = anchor() - Duration::seconds(1);
    while let Some(next) = next_occurrence(&rule, anchor(), cursor) {
        walked.push(next);
        cursor = next;
    }
    assert_eq!(walked, expanded);
}
