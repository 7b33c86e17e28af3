//! Shift definition domain model.
//!
//! A `ShiftDefinition` is the stored template for work the collective has to
//! cover. Unique definitions describe a single dated shift; recurring ones
//! repeat on a weekday within one of the four rotation weeks (A-D).
//! Concrete calendar dates are never stored, they are expanded on demand by
//! the recurrence expander.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Maximum length of a shift title.
pub const MAX_TITLE_LEN: usize = 30;

/// Maximum length of free-text notes on definitions and slots.
pub const MAX_NOTES_LEN: usize = 300;

/// Upper bound on the roster size of one definition.
pub const MAX_REQUIRED_WORKERS: u16 = 255;

/// Whether a shift happens once or repeats on the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftKind {
    /// Happens once, on the definition's starting date.
    Unique,
    /// Repeats every fourth week on a fixed weekday.
    Recurring,
}

impl ShiftKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Recurring => "recurring",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "unique" | "once" => Some(Self::Unique),
            "recurring" | "regular" => Some(Self::Recurring),
            _ => None,
        }
    }
}

/// One of the four repeating week buckets of the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RotationWeek {
    A,
    B,
    C,
    D,
}

impl RotationWeek {
    /// All rotation weeks in bucket order.
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    /// Bucket of an ISO week number: week 1 is A, week 2 is B, and so on,
    /// restarting at A every fourth week.
    pub fn for_iso_week(week: u32) -> Self {
        Self::ALL[(week.saturating_sub(1) % 4) as usize]
    }
}

/// Day of the week a recurring shift takes place on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftWeekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl ShiftWeekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Parse a weekday name. Accepts full names and the usual two and three
    /// letter abbreviations, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" | "mo" => Some(Self::Monday),
            "tuesday" | "tue" | "tu" => Some(Self::Tuesday),
            "wednesday" | "wed" | "we" => Some(Self::Wednesday),
            "thursday" | "thu" | "th" => Some(Self::Thursday),
            "friday" | "fri" | "fr" => Some(Self::Friday),
            "saturday" | "sat" | "sa" => Some(Self::Saturday),
            "sunday" | "sun" | "su" => Some(Self::Sunday),
            _ => None,
        }
    }

    pub const fn to_chrono(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Tuesday => Weekday::Tue,
            Self::Wednesday => Weekday::Wed,
            Self::Thursday => Weekday::Thu,
            Self::Friday => Weekday::Fri,
            Self::Saturday => Weekday::Sat,
            Self::Sunday => Weekday::Sun,
        }
    }

    pub const fn from_chrono(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// A persisted shift template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub id: Uuid,
    pub title: String,
    pub kind: ShiftKind,
    /// The shift's date for unique shifts, the first day of the recurrence otherwise.
    pub starting_date: NaiveDate,
    /// Last day of the recurrence (inclusive). Unused for unique shifts.
    pub ending_date: Option<NaiveDate>,
    /// Required for recurring shifts.
    pub rotation_week: Option<RotationWeek>,
    /// Required for recurring shifts.
    pub weekday: Option<ShiftWeekday>,
    pub starting_time: Option<NaiveTime>,
    pub ending_time: Option<NaiveTime>,
    /// Number of roster seats; fixed once the definition is created.
    pub required_worker_count: u16,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftDefinition {
    /// Create a single-date shift.
    pub fn unique(title: impl Into<String>, date: NaiveDate, required_worker_count: u16) -> Self {
        Self::new(title, ShiftKind::Unique, date, required_worker_count)
    }

    /// Create a shift recurring on `weekday` of every `rotation_week`, starting at `starting_date`.
    pub fn recurring(
        title: impl Into<String>,
        rotation_week: RotationWeek,
        weekday: ShiftWeekday,
        starting_date: NaiveDate,
        required_worker_count: u16,
    ) -> Self {
        let mut shift =
            Self::new(title, ShiftKind::Recurring, starting_date, required_worker_count);
        shift.rotation_week = Some(rotation_week);
        shift.weekday = Some(weekday);
        shift
    }

    fn new(
        title: impl Into<String>,
        kind: ShiftKind,
        starting_date: NaiveDate,
        required_worker_count: u16,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            starting_date,
            ending_date: None,
            rotation_week: None,
            weekday: None,
            starting_time: None,
            ending_time: None,
            required_worker_count,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    // Builder methods
    pub fn with_ending_date(mut self, ending_date: NaiveDate) -> Self {
        self.ending_date = Some(ending_date);
        self
    }

    pub fn with_times(mut self, starting_time: NaiveTime, ending_time: NaiveTime) -> Self {
        self.starting_time = Some(starting_time);
        self.ending_time = Some(ending_time);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.kind == ShiftKind::Recurring
    }

    /// Clear fields that carry no meaning for the definition's kind.
    pub fn normalize(&mut self) {
        if self.kind == ShiftKind::Unique {
            self.ending_date = None;
            self.rotation_week = None;
            self.weekday = None;
        }
    }

    /// Check the definition's invariants.
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::ValidationFailed(format!(
                "title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }

        if self.required_worker_count == 0 {
            return Err(DomainError::ValidationFailed(
                "required_worker_count must be at least 1".to_string(),
            ));
        }

        if self.required_worker_count > MAX_REQUIRED_WORKERS {
            return Err(DomainError::ValidationFailed(format!(
                "required_worker_count must be at most {}",
                MAX_REQUIRED_WORKERS
            )));
        }

        if let Some(ref notes) = self.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(DomainError::ValidationFailed(format!(
                    "notes must be at most {} characters",
                    MAX_NOTES_LEN
                )));
            }
        }

        if self.kind == ShiftKind::Recurring {
            if self.rotation_week.is_none() {
                return Err(DomainError::ValidationFailed(
                    "rotation_week is required for recurring shifts".to_string(),
                ));
            }
            if self.weekday.is_none() {
                return Err(DomainError::ValidationFailed(
                    "weekday is required for recurring shifts".to_string(),
                ));
            }
            if let Some(ending_date) = self.ending_date {
                if ending_date < self.starting_date {
                    return Err(DomainError::ValidationFailed(format!(
                        "ending_date {} is before starting_date {}",
                        ending_date, self.starting_date
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Partial update of a shift definition.
///
/// Has no `required_worker_count`: the roster size of a definition is fixed
/// at creation.
#[derive(Debug, Clone, Default)]
pub struct ShiftUpdate {
    pub title: Option<String>,
    pub kind: Option<ShiftKind>,
    pub starting_date: Option<NaiveDate>,
    pub ending_date: Option<Option<NaiveDate>>,
    pub rotation_week: Option<Option<RotationWeek>>,
    pub weekday: Option<Option<ShiftWeekday>>,
    pub starting_time: Option<Option<NaiveTime>>,
    pub ending_time: Option<Option<NaiveTime>>,
    pub notes: Option<Option<String>>,
}

impl ShiftUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.kind.is_none()
            && self.starting_date.is_none()
            && self.ending_date.is_none()
            && self.rotation_week.is_none()
            && self.weekday.is_none()
            && self.starting_time.is_none()
            && self.ending_time.is_none()
            && self.notes.is_none()
    }

    /// Apply the present fields to `shift`. Does not validate.
    pub fn apply_to(self, shift: &mut ShiftDefinition) {
        if let Some(title) = self.title {
            shift.title = title;
        }
        if let Some(kind) = self.kind {
            shift.kind = kind;
        }
        if let Some(starting_date) = self.starting_date {
            shift.starting_date = starting_date;
        }
        if let Some(ending_date) = self.ending_date {
            shift.ending_date = ending_date;
        }
        if let Some(rotation_week) = self.rotation_week {
            shift.rotation_week = rotation_week;
        }
        if let Some(weekday) = self.weekday {
            shift.weekday = weekday;
        }
        if let Some(starting_time) = self.starting_time {
            shift.starting_time = starting_time;
        }
        if let Some(ending_time) = self.ending_time {
            shift.ending_time = ending_time;
        }
        if let Some(notes) = self.notes {
            shift.notes = notes;
        }
    }
}
