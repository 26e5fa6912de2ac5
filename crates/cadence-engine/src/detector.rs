//! Suggestion pattern detection over occurrence-interval history.
//!
//! The detector compresses a target's recent occurrence timestamps into the
//! unit each candidate pattern type implies — day gaps, week gaps plus a
//! weekday set, month gaps plus a day-of-month set — classifies how stable
//! the recent deltas are, and picks the best-scoring candidate. Noise is
//! expected: real histories carry one-off reschedules, which is exactly what
//! the partial/contaminated split captures.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use tracing::debug;

use cadence_core::defaults::MIN_PATTERN_OCCURRENCES;
use cadence_core::{Detection, PatternSuggestion, PatternValue, StableType};

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Classify the occurrence history (oldest→newest) of one recurring target.
///
/// Fewer than [`MIN_PATTERN_OCCURRENCES`] distinct occurrence dates yield
/// [`Detection::InsufficientData`]. When no candidate reaches at least
/// partial stability the result is [`Detection::NoSuggestion`] — a
/// contaminated classification is never surfaced as a suggestion.
pub fn detect(history: &[DateTime<Utc>]) -> Detection {
    if history.len() < MIN_PATTERN_OCCURRENCES {
        return Detection::InsufficientData;
    }

    // Work on distinct dates in ascending order; duplicate same-day entries
    // carry no interval information.
    let mut dates: Vec<NaiveDate> = history.iter().map(|t| t.date_naive()).collect();
    dates.sort();
    dates.dedup();
    if dates.len() < MIN_PATTERN_OCCURRENCES {
        return Detection::InsufficientData;
    }

    let mut candidates = Vec::new();
    if let Some(candidate) = interval_candidate(&dates) {
        candidates.push(candidate);
    }
    if let Some(candidate) = weekly_candidate(&dates) {
        candidates.push(candidate);
    }
    if let Some(candidate) = monthly_candidate(&dates) {
        candidates.push(candidate);
    }

    let best = candidates
        .into_iter()
        .filter(|(_, stability)| stability.is_suggestible())
        .max_by(|(a, sa), (b, sb)| {
            a.weight()
                .cmp(&b.weight())
                // Fewer distinct set elements is the simpler explanation.
                .then(b.element_count().cmp(&a.element_count()))
                .then(sa.cmp(sb))
        });

    match best {
        Some((value, stability)) => {
            debug!(
                category = value.category(),
                ?stability,
                observations = dates.len(),
                "pattern detected"
            );
            Detection::Suggestion(PatternSuggestion { value, stability })
        }
        None => {
            debug!(observations = dates.len(), "no stable pattern");
            Detection::NoSuggestion
        }
    }
}

// =============================================================================
// CANDIDATES
// =============================================================================

/// Fixed day-gap candidate over consecutive occurrence dates.
fn interval_candidate(dates: &[NaiveDate]) -> Option<(PatternValue, StableType)> {
    let deltas: Vec<i64> = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect();
    if deltas.is_empty() {
        return None;
    }
    Some((
        PatternValue::Interval {
            days: dominant(&deltas),
        },
        classify(&deltas),
    ))
}

/// Weekday-set candidate: occurrences grouped into ISO weeks.
///
/// Stability combines two delta views — the gaps between consecutive
/// distinct weeks, and the per-week weekday sets themselves — taking the
/// weaker of the two so that a stray extra weekday degrades the
/// classification the same way a skipped week does. The emitted set is the
/// dominant per-week set, not the union.
///
/// A single-weekday cadence is deliberately ineligible here — it is already
/// fully explained by the lower-priority interval candidate, and letting it
/// through would let the set weight shadow the simpler answer.
fn weekly_candidate(dates: &[NaiveDate]) -> Option<(PatternValue, StableType)> {
    let mut weeks: Vec<(NaiveDate, Vec<Weekday>)> = Vec::new();
    for date in dates {
        let start = *date - Duration::days(date.weekday().num_days_from_monday() as i64);
        match weeks.last_mut() {
            Some((current, days)) if *current == start => days.push(date.weekday()),
            _ => weeks.push((start, vec![date.weekday()])),
        }
    }

    let gaps: Vec<i64> = weeks
        .windows(2)
        .map(|pair| (pair[1].0 - pair[0].0).num_days() / 7)
        .collect();
    if gaps.is_empty() {
        return None;
    }

    let sets: Vec<Vec<Weekday>> = weeks.into_iter().map(|(_, days)| days).collect();
    let weekdays = dominant(&sets);
    if weekdays.len() < 2 {
        return None;
    }

    let stability = classify(&gaps).min(classify(&sets));
    Some((
        PatternValue::WeeklySet {
            week_gap: dominant(&gaps),
            weekdays,
        },
        stability,
    ))
}

/// Day-of-month-set candidate: occurrences grouped into calendar months,
/// with the same combined gap/set stability as the weekly candidate. A
/// one-element set stays eligible — "the 15th of every month" has no
/// fixed day gap to fall back on.
fn monthly_candidate(dates: &[NaiveDate]) -> Option<(PatternValue, StableType)> {
    let mut months: Vec<(i32, BTreeSet<u32>)> = Vec::new();
    for date in dates {
        let index = date.year() * 12 + date.month0() as i32;
        match months.last_mut() {
            Some((current, days)) if *current == index => {
                days.insert(date.day());
            }
            _ => months.push((index, BTreeSet::from([date.day()]))),
        }
    }

    let gaps: Vec<i64> = months
        .windows(2)
        .map(|pair| (pair[1].0 - pair[0].0) as i64)
        .collect();
    if gaps.is_empty() {
        return None;
    }

    let sets: Vec<BTreeSet<u32>> = months.into_iter().map(|(_, days)| days).collect();
    let stability = classify(&gaps).min(classify(&sets));
    Some((
        PatternValue::MonthlySet {
            month_gap: dominant(&gaps) as i32,
            days: dominant(&sets),
        },
        stability,
    ))
}

// =============================================================================
// STABILITY
// =============================================================================

/// Classify a delta sequence by the consistency of its most recent entries.
///
/// Perfectly stable: the last two deltas match each other and the dominant
/// value. Partially stable: the two prior-to-last match but the most recent
/// breaks the run. Everything else — including sequences too short to
/// assess — is contaminated.
fn classify<T: PartialEq + Clone>(deltas: &[T]) -> StableType {
    let n = deltas.len();
    if n < 2 {
        return StableType::ContaminatedStable;
    }
    let dom = dominant(deltas);
    if deltas[n - 1] == deltas[n - 2] && deltas[n - 1] == dom {
        StableType::PerfectlyStable
    } else if n >= 3 && deltas[n - 2] == deltas[n - 3] && deltas[n - 1] != deltas[n - 2] {
        StableType::PartiallyStable
    } else {
        StableType::ContaminatedStable
    }
}

/// Modal value of a sequence; ties resolve toward the most recent entry.
fn dominant<T: PartialEq + Clone>(values: &[T]) -> T {
    let mut best = values[values.len() - 1].clone();
    let mut best_count = 0;
    for candidate in values.iter().rev() {
        let count = values.iter().filter(|v| *v == candidate).count();
        if count > best_count {
            best = candidate.clone();
            best_count = count;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    /// History with the given day gaps, anchored on a Monday.
    fn history_with_gaps(gaps: &[i64]) -> Vec<DateTime<Utc>> {
        let mut out = vec![day(2025, 6, 2)];
        for gap in gaps {
            let next = *out.last().unwrap() + Duration::days(*gap);
            out.push(next);
        }
        out
    }

    #[test]
    fn test_insufficient_data_below_three() {
        assert_eq!(detect(&[]), Detection::InsufficientData);
        assert_eq!(detect(&[day(2025, 6, 2)]), Detection::InsufficientData);
        assert_eq!(
            detect(&[day(2025, 6, 2), day(2025, 6, 9)]),
            Detection::InsufficientData
        );
    }

    #[test]
    fn test_same_day_duplicates_collapse() {
        // Three timestamps on two distinct days carry one delta — not enough.
        let history = vec![day(2025, 6, 2), day(2025, 6, 2), day(2025, 6, 9)];
        assert_eq!(detect(&history), Detection::InsufficientData);
    }

    #[test]
    fn test_weekly_day_gaps_yield_perfect_interval() {
        // Deltas [7, 7, 7] → perfectly stable Interval(7). The weekly-set
        // candidate stays out of the way for a single-weekday cadence.
        let history = history_with_gaps(&[7, 7, 7]);
        let suggestion = match detect(&history) {
            Detection::Suggestion(s) => s,
            other => panic!("expected suggestion, got {other:?}"),
        };
        assert_eq!(suggestion.stability, StableType::PerfectlyStable);
        assert_eq!(suggestion.value, PatternValue::Interval { days: 7 });
    }

    #[test]
    fn test_contaminated_history_yields_no_suggestion() {
        // Deltas [7, 14, 7]: the one-off skip contaminates every candidate;
        // a low-confidence guess must not surface.
        let history = history_with_gaps(&[7, 14, 7]);
        assert_eq!(detect(&history), Detection::NoSuggestion);
    }

    #[test]
    fn test_recent_break_is_partially_stable() {
        // Deltas [7, 7, 10]: the run held until the most recent delta. The
        // stray Thursday also keeps the weekly-set candidate at one dominant
        // weekday, so the interval view wins.
        let history = history_with_gaps(&[7, 7, 10]);
        let suggestion = match detect(&history) {
            Detection::Suggestion(s) => s,
            other => panic!("expected suggestion, got {other:?}"),
        };
        assert_eq!(suggestion.stability, StableType::PartiallyStable);
        assert_eq!(suggestion.value, PatternValue::Interval { days: 7 });
    }

    #[test]
    fn test_weekly_set_detected_for_two_weekdays() {
        // Mon/Wed across three weeks: day gaps alternate [2, 5, ...] and
        // contaminate the interval candidate, but the week-granular view is
        // perfectly stable.
        let history = vec![
            day(2025, 6, 2),  // Mon
            day(2025, 6, 4),  // Wed
            day(2025, 6, 9),  // Mon
            day(2025, 6, 11), // Wed
            day(2025, 6, 16), // Mon
            day(2025, 6, 18), // Wed
        ];
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
    }

    #[test]
    fn test_stray_weekday_degrades_weekly_set() {
        // Mon/Wed for two weeks, then Mon/Wed/Fri: the most recent week
        // breaks the set run — partial, with the dominant set emitted.
        let history = vec![
            day(2025, 6, 2),
            day(2025, 6, 4),
            day(2025, 6, 9),
            day(2025, 6, 11),
            day(2025, 6, 16),
            day(2025, 6, 18),
            day(2025, 6, 20), // stray Fri
        ];
        let suggestion = match detect(&history) {
            Detection::Suggestion(s) => s,
            other => panic!("expected suggestion, got {other:?}"),
        };
        assert_eq!(suggestion.stability, StableType::PartiallyStable);
        assert_eq!(
            suggestion.value,
            PatternValue::WeeklySet {
                week_gap: 1,
                weekdays: vec![Weekday::Mon, Weekday::Wed],
            }
        );
    }

    #[test]
    fn test_monthly_single_day_detected() {
        // The 15th across four months: no stable day gap exists (30/31-day
        // months), but month-granular the series is perfect.
        let history = vec![
            day(2025, 3, 15),
            day(2025, 4, 15),
            day(2025, 5, 15),
            day(2025, 6, 15),
        ];
        let suggestion = match detect(&history) {
            Detection::Suggestion(s) => s,
            other => panic!("expected suggestion, got {other:?}"),
        };
        assert_eq!(suggestion.stability, StableType::PerfectlyStable);
        assert_eq!(
            suggestion.value,
            PatternValue::MonthlySet {
                month_gap: 1,
                days: BTreeSet::from([15]),
            }
        );
    }

    #[test]
    fn test_biweekly_cadence() {
        let history = history_with_gaps(&[14, 14, 14, 14]);
        let suggestion = match detect(&history) {
            Detection::Suggestion(s) => s,
            other => panic!("expected suggestion, got {other:?}"),
        };
        assert_eq!(suggestion.value, PatternValue::Interval { days: 14 });
        assert_eq!(suggestion.stability, StableType::PerfectlyStable);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let history = history_with_gaps(&[7, 7, 7]);
        assert_eq!(detect(&history), detect(&history));
    }

    #[test]
    fn test_classify_rules() {
        use StableType::*;
        assert_eq!(classify(&[7]), ContaminatedStable);
        assert_eq!(classify(&[7, 7]), PerfectlyStable);
        assert_eq!(classify(&[7, 14]), ContaminatedStable);
        assert_eq!(classify(&[7, 7, 7]), PerfectlyStable);
        assert_eq!(classify(&[7, 7, 10]), PartiallyStable);
        assert_eq!(classify(&[7, 14, 7]), ContaminatedStable);
        // Equal counts tie toward recency, so the closing pair dominates.
        assert_eq!(classify(&[7, 7, 10, 10]), PerfectlyStable);
    }

    #[test]
    fn test_dominant_prefers_recent_on_ties() {
        assert_eq!(dominant(&[7, 7, 10, 10]), 10);
        assert_eq!(dominant(&[10, 10, 7]), 10);
        assert_eq!(dominant(&[7]), 7);
    }
}
