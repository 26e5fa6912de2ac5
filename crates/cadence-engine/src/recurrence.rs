//! Recurrence expansion: next/previous occurrence and bounded windows.
//!
//! Expansion is always computed from the rule's declared anchor, never from
//! the previous occurrence — an interval edit mid-series is not retroactive,
//! and repeated calls with the same inputs return the same answers.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc, Weekday};

use cadence_core::defaults::NEVER_EXPANSION_HORIZON_MONTHS;
use cadence_core::{EndCondition, Frequency, MonthlyRule, RecurrenceRule};

/// Consecutive stepped months allowed to produce no candidate before the
/// series is declared exhausted. Guards rules whose selector can never match
/// (a day-31 rule stepped in 12-month strides from a 30-day month).
const MAX_EMPTY_MONTH_STEPS: u32 = 48;

/// Consecutive stepped years allowed to produce no candidate. The longest
/// real gap is the eight years around a skipped century leap day.
const MAX_EMPTY_YEAR_STEPS: u32 = 12;

// =============================================================================
// PUBLIC ENTRY POINTS
// =============================================================================

/// First occurrence strictly after `after`, or `None` when the series ends
/// first.
///
/// Idempotent: the same `(rule, anchor, after)` always yields the same
/// answer, and the answer is never ≤ `after`.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    after: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    OccurrenceSeries::new(rule.clone(), anchor).find(|t| *t > after)
}

/// Last occurrence strictly before `before`, or `None` when the series has
/// nothing earlier.
pub fn previous_occurrence(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    before: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let mut last = None;
    for t in OccurrenceSeries::new(rule.clone(), anchor) {
        if t >= before {
            break;
        }
        last = Some(t);
    }
    last
}

/// All occurrences inside `[window_start, window_end]`, in order.
///
/// Finite and restartable: a fresh call re-derives the identical sequence.
/// Rules ending `Never` are additionally bounded by the implicit horizon of
/// [`NEVER_EXPANSION_HORIZON_MONTHS`] past the window start.
pub fn expand(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    if window_end < window_start {
        return Vec::new();
    }
    let effective_end = match rule.end {
        EndCondition::Never => window_start
            .checked_add_months(Months::new(NEVER_EXPANSION_HORIZON_MONTHS))
            .map(|horizon| horizon.min(window_end))
            .unwrap_or(window_end),
        _ => window_end,
    };

    let mut out = Vec::new();
    for t in OccurrenceSeries::new(rule.clone(), anchor) {
        if t > effective_end {
            break;
        }
        if t >= window_start {
            out.push(t);
        }
    }
    out
}

// =============================================================================
// SERIES ITERATOR
// =============================================================================

/// Lazy iterator over the occurrence series of one rule.
///
/// Candidates step forward from the anchor in multiples of the rule's
/// interval; the end condition is checked after each candidate. The iterator
/// assumes a rule that passed [`RecurrenceRule::validate`] — an invalid rule
/// yields an empty series rather than stepping nowhere forever.
pub struct OccurrenceSeries {
    rule: RecurrenceRule,
    anchor: DateTime<Utc>,
    time_of_day: NaiveTime,
    emitted: u32,
    cursor: Cursor,
}

enum Cursor {
    Done,
    /// One-off: the anchor itself, once.
    Once,
    Daily {
        date: NaiveDate,
    },
    Weekly {
        /// Monday of the current stepped week block.
        week_start: NaiveDate,
        /// Index into the ISO-sorted weekday set.
        day_idx: usize,
    },
    Monthly {
        year: i32,
        month: u32,
        /// Index into the month's selected days.
        day_idx: usize,
        empty_steps: u32,
    },
    Yearly {
        year: i32,
        empty_steps: u32,
    },
}

impl OccurrenceSeries {
    pub fn new(mut rule: RecurrenceRule, anchor: DateTime<Utc>) -> Self {
        let cursor = if rule.validate().is_err() {
            Cursor::Done
        } else {
            let date = anchor.date_naive();
            match rule.frequency {
                Frequency::None => Cursor::Once,
                Frequency::Daily => Cursor::Daily { date },
                Frequency::Weekly => {
                    // ISO-sorted weekday set drives in-week ordering.
                    rule.weekdays.sort_by_key(|d| d.num_days_from_monday());
                    let week_start =
                        date - Duration::days(date.weekday().num_days_from_monday() as i64);
                    Cursor::Weekly {
                        week_start,
                        day_idx: 0,
                    }
                }
                Frequency::Monthly => Cursor::Monthly {
                    year: date.year(),
                    month: date.month(),
                    day_idx: 0,
                    empty_steps: 0,
                },
                Frequency::Yearly => Cursor::Yearly {
                    year: date.year(),
                    empty_steps: 0,
                },
            }
        };
        Self {
            rule,
            anchor,
            time_of_day: anchor.time(),
            emitted: 0,
            cursor,
        }
    }

    /// Next raw candidate of the base series, ignoring the anchor cut and
    /// the end condition. Monotonically ascending.
    fn step_candidate(&mut self) -> Option<DateTime<Utc>> {
        let interval = self.rule.interval;
        loop {
            match &mut self.cursor {
                Cursor::Done => return None,
                Cursor::Once => {
                    self.cursor = Cursor::Done;
                    return Some(self.anchor);
                }
                Cursor::Daily { date } => {
                    let current = *date;
                    *date = current + Duration::days(interval as i64);
                    return Some(current.and_time(self.time_of_day).and_utc());
                }
                Cursor::Weekly {
                    week_start,
                    day_idx,
                } => {
                    if *day_idx >= self.rule.weekdays.len() {
                        *week_start = *week_start + Duration::days(7 * interval as i64);
                        *day_idx = 0;
                    }
                    let day = self.rule.weekdays[*day_idx];
                    *day_idx += 1;
                    let date = *week_start + Duration::days(day.num_days_from_monday() as i64);
                    return Some(date.and_time(self.time_of_day).and_utc());
                }
                Cursor::Monthly {
                    year,
                    month,
                    day_idx,
                    empty_steps,
                } => {
                    let selector = match self.rule.monthly {
                        Some(rule) => rule,
                        None => {
                            self.cursor = Cursor::Done;
                            return None;
                        }
                    };
                    let days = selected_month_days(selector, *year, *month);
                    if *day_idx >= days.len() {
                        if days.is_empty() {
                            *empty_steps += 1;
                            if *empty_steps > MAX_EMPTY_MONTH_STEPS {
                                self.cursor = Cursor::Done;
                                return None;
                            }
                        } else {
                            *empty_steps = 0;
                        }
                        let month0 = *year * 12 + (*month as i32 - 1) + interval as i32;
                        *year = month0.div_euclid(12);
                        *month = (month0.rem_euclid(12) + 1) as u32;
                        *day_idx = 0;
                        continue;
                    }
                    let day = days[*day_idx];
                    *day_idx += 1;
                    match NaiveDate::from_ymd_opt(*year, *month, day) {
                        Some(date) => {
                            return Some(date.and_time(self.time_of_day).and_utc());
                        }
                        None => continue,
                    }
                }
                Cursor::Yearly {
                    year,
                    empty_steps,
                } => {
                    let current = *year;
                    *year += interval as i32;
                    let date = NaiveDate::from_ymd_opt(
                        current,
                        self.anchor.month(),
                        self.anchor.day(),
                    );
                    match date {
                        // The anchor day exists this year (Feb 29 skips).
                        Some(date) => {
                            *empty_steps = 0;
                            return Some(date.and_time(self.time_of_day).and_utc());
                        }
                        None => {
                            *empty_steps += 1;
                            if *empty_steps > MAX_EMPTY_YEAR_STEPS {
                                self.cursor = Cursor::Done;
                                return None;
                            }
                            continue;
                        }
                    }
                }
            }
        }
    }
}

impl Iterator for OccurrenceSeries {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        loop {
            // Count limits are checked before stepping so an exhausted
            // series never advances its cursor again.
            if let EndCondition::ByCount(n) = self.rule.end {
                if self.emitted >= n {
                    self.cursor = Cursor::Done;
                    return None;
                }
            }
            let candidate = self.step_candidate()?;
            // Week and month blocks can start before the anchor; those
            // instances are not part of the series.
            if candidate < self.anchor {
                continue;
            }
            if let EndCondition::ByDate(bound) = self.rule.end {
                if candidate > bound {
                    self.cursor = Cursor::Done;
                    return None;
                }
            }
            self.emitted += 1;
            return Some(candidate);
        }
    }
}

// =============================================================================
// CALENDAR HELPERS
// =============================================================================

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Days of `(year, month)` selected by the monthly rule, ascending.
///
/// A `Single` day that does not exist in the month selects nothing — the
/// month is skipped outright instead of clamping to its last day, so a
/// day-31 series never drifts onto the 30th.
fn selected_month_days(rule: MonthlyRule, year: i32, month: u32) -> Vec<u32> {
    let last = days_in_month(year, month);
    match rule {
        MonthlyRule::Single(day) => {
            if day <= last {
                vec![day]
            } else {
                Vec::new()
            }
        }
        MonthlyRule::AllDays => (1..=last).collect(),
        MonthlyRule::Weekdays => (1..=last)
            .filter(|&d| {
                NaiveDate::from_ymd_opt(year, month, d)
                    .map(|date| !is_weekend(date.weekday()))
                    .unwrap_or(false)
            })
            .collect(),
        MonthlyRule::Weekends => (1..=last)
            .filter(|&d| {
                NaiveDate::from_ymd_opt(year, month, d)
                    .map(|date| is_weekend(date.weekday()))
                    .unwrap_or(false)
            })
            .collect(),
    }
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}
