//! Occurrence query parsing and candidate selection.
//!
//! A list query carries a mandatory date window plus optional non-date
//! criteria. The filter parameters are declared once in [`FILTER_FIELDS`].
//! Only the window bounds can make a query invalid: unknown parameters are
//! ignored, and a filter value no stored shift can have matches nothing.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{RotationWeek, ShiftDefinition, ShiftKind, ShiftWeekday};
use crate::domain::ports::{ShiftCriteria, ShiftDefinitionRepository};
use crate::services::recurrence::DateWindow;

/// Lower window bound parameter (inclusive).
pub const MIN_DATE_PARAM: &str = "min_date";

/// Upper window bound parameter (inclusive).
pub const MAX_DATE_PARAM: &str = "max_date";

/// How a filter parameter is compared to the stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Exact,
    /// Case-insensitive substring.
    Contains,
}

/// Field of `ShiftDefinition` a filter parameter constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterTarget {
    Kind,
    Title,
    RotationWeek,
    Weekday,
    StartingTime,
    EndingTime,
    RequiredWorkerCount,
    Notes,
}

/// One accepted query parameter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FilterField {
    pub param: &'static str,
    pub target: FilterTarget,
    pub operator: FilterOperator,
}

/// Every optional filter parameter a list query accepts.
pub const FILTER_FIELDS: &[FilterField] = &[
    FilterField::exact("kind", FilterTarget::Kind),
    FilterField {
        param: "title_contains",
        target: FilterTarget::Title,
        operator: FilterOperator::Contains,
    },
    FilterField::exact("rotation_week", FilterTarget::RotationWeek),
    FilterField::exact("weekday", FilterTarget::Weekday),
    FilterField::exact("starting_time", FilterTarget::StartingTime),
    FilterField::exact("ending_time", FilterTarget::EndingTime),
    FilterField::exact("required_worker_count", FilterTarget::RequiredWorkerCount),
    FilterField::exact("notes", FilterTarget::Notes),
];

impl FilterField {
    const fn exact(param: &'static str, target: FilterTarget) -> Self {
        Self { param, target, operator: FilterOperator::Exact }
    }
}

/// Look up the filter declared for a query parameter.
pub fn filter_field(param: &str) -> Option<&'static FilterField> {
    FILTER_FIELDS.iter().find(|f| f.param == param)
}

fn invalid(param: &str, value: &str, expected: &str) -> DomainError {
    DomainError::ValidationFailed(format!(
        "invalid value '{}' for '{}': expected {}",
        value, param, expected
    ))
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_iso_date(param: &str, value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(param, value, "an ISO date (YYYY-MM-DD)"))
}

/// Parse a wall-clock time as `HH:MM` or `HH:MM:SS`.
pub fn parse_clock_time(param: &str, value: &str) -> DomainResult<NaiveTime> {
    let value_trimmed = value.trim();
    NaiveTime::parse_from_str(value_trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value_trimmed, "%H:%M"))
        .map_err(|_| invalid(param, value, "a time (HH:MM or HH:MM:SS)"))
}

/// A validated occurrence list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftQuery {
    pub window: DateWindow,
    /// Non-date criteria. Date bounds set here are ignored.
    pub criteria: ShiftCriteria,
    /// Set when a filter value cannot equal any stored field, such as
    /// `rotation_week=Q`. Such a query selects nothing.
    pub matches_nothing: bool,
}

impl ShiftQuery {
    /// Query over `window` narrowed by `criteria`.
    pub fn new(window: DateWindow, criteria: ShiftCriteria) -> Self {
        Self {
            window,
            criteria: criteria.without_dates(),
            matches_nothing: false,
        }
    }

    /// Build a query from raw string parameters.
    ///
    /// `min_date` and `max_date` are mandatory and must parse; they are the
    /// only source of errors. Keys outside [`FILTER_FIELDS`] are ignored.
    /// Repeated keys keep the last value.
    pub fn from_params<I, K, V>(params: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut min_date = None;
        let mut max_date = None;
        let mut criteria = ShiftCriteria::default();
        let mut unmatchable = Vec::new();

        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                MIN_DATE_PARAM => min_date = Some(parse_iso_date(key, value)?),
                MAX_DATE_PARAM => max_date = Some(parse_iso_date(key, value)?),
                _ => match filter_field(key) {
                    Some(field) => {
                        if apply_filter(&mut criteria, field, value).is_none() {
                            unmatchable.push(field.param);
                        } else {
                            unmatchable.retain(|param| *param != field.param);
                        }
                    }
                    None => tracing::debug!(param = key, "ignoring unknown query parameter"),
                },
            }
        }

        let min_date = min_date.ok_or_else(|| missing(MIN_DATE_PARAM))?;
        let max_date = max_date.ok_or_else(|| missing(MAX_DATE_PARAM))?;

        let mut query = Self::new(DateWindow::new(min_date, max_date)?, criteria);
        if !unmatchable.is_empty() {
            tracing::debug!(params = ?unmatchable, "filter values match no shift");
            query.matches_nothing = true;
        }
        Ok(query)
    }

    /// Criteria for definitions whose own starting date lies in the window.
    pub fn in_window_criteria(&self) -> ShiftCriteria {
        ShiftCriteria {
            starting_on_or_after: Some(self.window.start),
            starting_on_or_before: Some(self.window.end),
            ..self.criteria.clone()
        }
    }

    /// Criteria for recurring definitions that started before the window.
    /// `None` when the kind filter excludes recurring shifts.
    pub fn carried_over_criteria(&self) -> Option<ShiftCriteria> {
        if matches!(self.criteria.kind, Some(kind) if kind != ShiftKind::Recurring) {
            return None;
        }
        Some(ShiftCriteria {
            kind: Some(ShiftKind::Recurring),
            starting_before: Some(self.window.start),
            ..self.criteria.clone()
        })
    }
}

fn missing(param: &str) -> DomainError {
    DomainError::ValidationFailed(format!("missing required parameter '{}'", param))
}

/// Store `value` in the criterion `field` targets. `None` when the value is
/// outside the field's domain and so cannot equal any stored shift.
fn apply_filter(criteria: &mut ShiftCriteria, field: &FilterField, value: &str) -> Option<()> {
    let param = field.param;
    match field.target {
        FilterTarget::Kind => criteria.kind = Some(ShiftKind::from_str(value)?),
        FilterTarget::Title => criteria.title_contains = Some(value.to_string()),
        FilterTarget::RotationWeek => criteria.rotation_week = Some(RotationWeek::from_str(value)?),
        FilterTarget::Weekday => criteria.weekday = Some(ShiftWeekday::from_str(value)?),
        FilterTarget::StartingTime => {
            criteria.starting_time = Some(parse_clock_time(param, value).ok()?);
        }
        FilterTarget::EndingTime => {
            criteria.ending_time = Some(parse_clock_time(param, value).ok()?);
        }
        FilterTarget::RequiredWorkerCount => {
            criteria.required_worker_count = Some(value.trim().parse().ok()?);
        }
        FilterTarget::Notes => criteria.notes = Some(value.to_string()),
    }
    Some(())
}

/// Definitions selected for a query, before expansion.
#[derive(Debug, Default)]
pub struct Candidates {
    /// Definitions whose starting date lies inside the window.
    pub in_window: Vec<ShiftDefinition>,
    /// Recurring definitions that started before the window.
    pub carried_over: Vec<ShiftDefinition>,
}

impl Candidates {
    pub fn len(&self) -> usize {
        self.in_window.len() + self.carried_over.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Narrows the stored definitions by a query's non-date criteria.
pub struct QueryFilter<S: ShiftDefinitionRepository> {
    shifts: Arc<S>,
}

impl<S: ShiftDefinitionRepository> QueryFilter<S> {
    pub fn new(shifts: Arc<S>) -> Self {
        Self { shifts }
    }

    /// Select candidate definitions for `query`.
    pub async fn candidates(&self, query: &ShiftQuery) -> DomainResult<Candidates> {
        if query.matches_nothing {
            return Ok(Candidates::default());
        }

        let in_window = self.shifts.list(&query.in_window_criteria()).await?;
        let carried_over = match query.carried_over_criteria() {
            Some(criteria) => self.shifts.list(&criteria).await?,
            None => Vec::new(),
        };

        tracing::debug!(
            in_window = in_window.len(),
            carried_over = carried_over.len(),
            "selected candidate shift definitions"
        );
        Ok(Candidates { in_window, carried_over })
    }
}
