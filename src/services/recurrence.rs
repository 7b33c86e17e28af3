//! Recurrence expansion for rotation shifts.
//!
//! Weeks are bucketed by ISO week number into A, B, C, D, repeating:
//! week 1 is A, week 2 is B, ..., week 5 is A again. A recurring definition
//! occurs on its weekday in every week whose bucket equals its rotation
//! week, within its own active range.
//!
//! ```text
//!  ISO week   1  2  3  4  5  6  7  8  9 ...
//!  bucket     A  B  C  D  A  B  C  D  A ...
//! ```
//!
//! Expansion walks the window one week at a time, so its cost is linear in
//! the number of weeks in the window.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{RotationWeek, ShiftDefinition, ShiftKind, ShiftWeekday};

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window; `start` must not be after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::ValidationFailed(format!(
                "min_date {} is after max_date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Intersection with `[from, until]`, where `until = None` is unbounded.
    /// `None` when the two ranges do not overlap.
    pub fn intersect(&self, from: NaiveDate, until: Option<NaiveDate>) -> Option<Self> {
        let start = self.start.max(from);
        let end = until.map_or(self.end, |until| self.end.min(until));
        (start <= end).then_some(Self { start, end })
    }
}

/// Validated recurrence parameters of a recurring shift definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub rotation_week: RotationWeek,
    pub weekday: ShiftWeekday,
    pub starting_date: NaiveDate,
    pub ending_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    /// Extract the rule from a definition. Fails for unique definitions and
    /// for recurring ones missing their rotation week or weekday.
    pub fn from_definition(shift: &ShiftDefinition) -> DomainResult<Self> {
        if shift.kind != ShiftKind::Recurring {
            return Err(DomainError::ValidationFailed(format!(
                "shift {} is not recurring",
                shift.id
            )));
        }

        let rotation_week = shift.rotation_week.ok_or_else(|| {
            DomainError::ValidationFailed(format!("shift {} has no rotation week", shift.id))
        })?;
        let weekday = shift.weekday.ok_or_else(|| {
            DomainError::ValidationFailed(format!("shift {} has no weekday", shift.id))
        })?;

        Ok(Self {
            rotation_week,
            weekday,
            starting_date: shift.starting_date,
            ending_date: shift.ending_date,
        })
    }

    /// Whether `date` falls on the rule's weekday in the rule's rotation
    /// week. Ignores the active range.
    pub fn matches(&self, date: NaiveDate) -> bool {
        date.weekday() == self.weekday.to_chrono()
            && RotationWeek::for_iso_week(date.iso_week().week()) == self.rotation_week
    }

    /// All qualifying dates inside both `window` and the active range, ascending.
    pub fn occurrences(&self, window: &DateWindow) -> Vec<NaiveDate> {
        let Some(effective) = window.intersect(self.starting_date, self.ending_date) else {
            return Vec::new();
        };

        let target = self.weekday.to_chrono().num_days_from_monday();
        let current = effective.start.weekday().num_days_from_monday();
        let offset = (target + 7 - current) % 7;

        let mut dates = Vec::new();
        let mut next = effective.start.checked_add_days(Days::new(u64::from(offset)));
        while let Some(date) = next {
            if date > effective.end {
                break;
            }
            if RotationWeek::for_iso_week(date.iso_week().week()) == self.rotation_week {
                dates.push(date);
            }
            next = date.checked_add_days(Days::new(7));
        }
        dates
    }
}

/// Expand a definition over `window`.
///
/// Unique definitions and recurring definitions with incomplete recurrence
/// parameters expand to nothing; this never fails.
pub fn expand(shift: &ShiftDefinition, window: &DateWindow) -> Vec<NaiveDate> {
    RecurrenceRule::from_definition(shift)
        .map(|rule| rule.occurrences(window))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end).unwrap()
    }

    fn recurring(week: RotationWeek, day: ShiftWeekday, start: NaiveDate) -> ShiftDefinition {
        ShiftDefinition::recurring("Store", week, day, start, 2)
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        assert!(DateWindow::new(date(2023, 2, 28), date(2023, 2, 1)).is_err());
        let single = window(date(2023, 2, 1), date(2023, 2, 1));
        assert_eq!(single.num_days(), 1);
        assert!(single.contains(date(2023, 2, 1)));
    }

    #[test]
    fn test_window_intersection() {
        let w = window(date(2023, 2, 1), date(2023, 2, 28));
        assert_eq!(
            w.intersect(date(2023, 1, 1), None),
            Some(window(date(2023, 2, 1), date(2023, 2, 28)))
        );
        assert_eq!(
            w.intersect(date(2023, 2, 10), Some(date(2023, 2, 20))),
            Some(window(date(2023, 2, 10), date(2023, 2, 20)))
        );
        assert_eq!(w.intersect(date(2023, 3, 1), None), None);
        assert_eq!(w.intersect(date(2022, 1, 1), Some(date(2023, 1, 31))), None);
    }

    #[test]
    fn test_week_c_monday_in_february() {
        let shift = recurring(RotationWeek::C, ShiftWeekday::Monday, date(2023, 1, 1));
        let dates = expand(&shift, &window(date(2023, 2, 1), date(2023, 2, 28)));
        assert_eq!(dates, vec![date(2023, 2, 13)]);
    }

    #[test]
    fn test_week_a_monday_in_january_with_ending_date() {
        let shift = recurring(RotationWeek::A, ShiftWeekday::Monday, date(2023, 1, 1))
            .with_ending_date(date(2023, 10, 8));
        let dates = expand(&shift, &window(date(2023, 1, 1), date(2023, 1, 31)));
        assert_eq!(dates, vec![date(2023, 1, 2), date(2023, 1, 30)]);
    }

    #[test]
    fn test_definition_from_the_past_still_expands() {
        let shift = recurring(RotationWeek::B, ShiftWeekday::Friday, date(2022, 6, 1));
        let dates = expand(&shift, &window(date(2023, 3, 1), date(2023, 3, 31)));
        assert_eq!(dates, vec![date(2023, 3, 10)]);
    }

    #[test]
    fn test_ending_date_truncates() {
        let shift = recurring(RotationWeek::A, ShiftWeekday::Monday, date(2023, 1, 1))
            .with_ending_date(date(2023, 1, 29));
        let dates = expand(&shift, &window(date(2023, 1, 1), date(2023, 1, 31)));
        assert_eq!(dates, vec![date(2023, 1, 2)]);
    }

    #[test]
    fn test_ending_date_is_inclusive() {
        let shift = recurring(RotationWeek::A, ShiftWeekday::Monday, date(2023, 1, 1))
            .with_ending_date(date(2023, 1, 30));
        let dates = expand(&shift, &window(date(2023, 1, 1), date(2023, 1, 31)));
        assert_eq!(dates, vec![date(2023, 1, 2), date(2023, 1, 30)]);
    }

    #[test]
    fn test_empty_when_window_outside_active_range() {
        let shift = recurring(RotationWeek::A, ShiftWeekday::Monday, date(2023, 6, 1))
            .with_ending_date(date(2023, 10, 8));
        assert!(expand(&shift, &window(date(2023, 1, 1), date(2023, 5, 31))).is_empty());
        assert!(expand(&shift, &window(date(2023, 10, 9), date(2023, 12, 31))).is_empty());
    }

    #[test]
    fn test_unique_and_incomplete_definitions_expand_to_nothing() {
        let w = window(date(2023, 1, 1), date(2023, 12, 31));
        let unique = ShiftDefinition::unique("Party", date(2023, 2, 7), 1);
        assert!(expand(&unique, &w).is_empty());

        let mut broken = recurring(RotationWeek::A, ShiftWeekday::Monday, date(2023, 1, 1));
        broken.weekday = None;
        assert!(expand(&broken, &w).is_empty());
        assert!(RecurrenceRule::from_definition(&broken).is_err());
    }

    #[test]
    fn test_year_boundary_follows_iso_week_numbers() {
        // 2020 has 53 ISO weeks; week 53 (Dec 28 - Jan 3) is bucket A,
        // and week 1 of 2021 (from Jan 4) is bucket A as well.
        let shift = recurring(RotationWeek::A, ShiftWeekday::Monday, date(2020, 1, 1));
        let dates = expand(&shift, &window(date(2020, 12, 1), date(2021, 1, 31)));
        assert_eq!(dates, vec![date(2020, 12, 28), date(2021, 1, 4)]);
    }

    #[test]
    fn test_window_of_a_single_matching_day() {
        let shift = recurring(RotationWeek::C, ShiftWeekday::Monday, date(2023, 1, 1));
        let day = date(2023, 2, 13);
        assert_eq!(expand(&shift, &window(day, day)), vec![day]);
        let next = date(2023, 2, 14);
        assert!(expand(&shift, &window(next, next)).is_empty());
    }

    #[test]
    fn test_rule_matches() {
        let shift = recurring(RotationWeek::C, ShiftWeekday::Monday, date(2023, 1, 1));
        let rule = RecurrenceRule::from_definition(&shift).unwrap();
        assert!(rule.matches(date(2023, 2, 13)));
        assert!(!rule.matches(date(2023, 2, 6)));
        assert!(!rule.matches(date(2023, 2, 14)));
    }

    #[test]
    fn test_expansion_is_idempotent_and_strictly_increasing() {
        let shift = recurring(RotationWeek::D, ShiftWeekday::Sunday, date(2021, 3, 1));
        let w = window(date(2022, 1, 1), date(2024, 12, 31));

        let first = expand(&shift, &w);
        let second = expand(&shift, &w);

        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
