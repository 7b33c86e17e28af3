//! Builds the occurrence list for a date window.
//!
//! Candidates come from two selections: definitions starting inside the
//! window, and recurring definitions that started earlier and may still
//! be active. Both are expanded, merged without duplicates, and decorated
//! with the current state of each definition's roster.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Occurrence, ShiftDefinition, ShiftKind, SlotSnapshot};
use crate::domain::ports::{AssignmentSlotRepository, ShiftDefinitionRepository, WorkerRoster};
use crate::services::query_filter::{QueryFilter, ShiftQuery};
use crate::services::recurrence::{DateWindow, RecurrenceRule};

/// Default window length above which a query is logged as unusually large.
pub const DEFAULT_LARGE_WINDOW_DAYS: u32 = 366;

/// Answers occurrence list queries.
///
/// Combines candidate selection, recurrence expansion and roster lookup.
/// Worker names are resolved once per call.
pub struct OccurrenceAssembler<S, L, W>
where
    S: ShiftDefinitionRepository,
    L: AssignmentSlotRepository,
    W: WorkerRoster,
{
    filter: QueryFilter<S>,
    slots: Arc<L>,
    roster: Arc<W>,
    large_window_days: u32,
}

impl<S, L, W> OccurrenceAssembler<S, L, W>
where
    S: ShiftDefinitionRepository,
    L: AssignmentSlotRepository,
    W: WorkerRoster,
{
    /// Create an assembler with the default large-window threshold.
    pub fn new(shifts: Arc<S>, slots: Arc<L>, roster: Arc<W>) -> Self {
        Self {
            filter: QueryFilter::new(shifts),
            slots,
            roster,
            large_window_days: DEFAULT_LARGE_WINDOW_DAYS,
        }
    }

    /// Window length, in days, above which a query is logged as large.
    pub fn with_large_window_days(mut self, days: u32) -> Self {
        self.large_window_days = days;
        self
    }

    /// All occurrences matching `query`, ordered by date then definition id.
    #[instrument(
        skip(self),
        fields(min_date = %query.window.start, max_date = %query.window.end)
    )]
    pub async fn list(&self, query: &ShiftQuery) -> DomainResult<Vec<Occurrence>> {
        let window = query.window;
        if window.num_days() > i64::from(self.large_window_days) {
            tracing::warn!(
                days = window.num_days(),
                threshold = self.large_window_days,
                "large occurrence window requested"
            );
        }

        let candidates = self.filter.candidates(query).await?;

        let mut definitions: HashMap<Uuid, ShiftDefinition> =
            HashMap::with_capacity(candidates.len());
        let mut dates: BTreeSet<(NaiveDate, Uuid)> = BTreeSet::new();

        for shift in candidates.in_window.into_iter().chain(candidates.carried_over) {
            for date in occurrence_dates(&shift, &window) {
                dates.insert((date, shift.id));
            }
            definitions.entry(shift.id).or_insert(shift);
        }

        let mut rosters: HashMap<Uuid, Vec<SlotSnapshot>> = HashMap::new();
        let mut names: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut occurrences = Vec::with_capacity(dates.len());

        for (date, definition_id) in dates {
            let Some(shift) = definitions.get(&definition_id) else {
                continue;
            };

            if !rosters.contains_key(&definition_id) {
                let snapshots = self.snapshot_roster(definition_id, &mut names).await?;
                rosters.insert(definition_id, snapshots);
            }
            let slots = rosters.get(&definition_id).cloned().unwrap_or_default();

            occurrences.push(Occurrence::new(shift, date, slots));
        }

        tracing::debug!(
            definitions = definitions.len(),
            occurrences = occurrences.len(),
            "assembled occurrences"
        );
        Ok(occurrences)
    }

    async fn snapshot_roster(
        &self,
        definition_id: Uuid,
        names: &mut HashMap<Uuid, Option<String>>,
    ) -> DomainResult<Vec<SlotSnapshot>> {
        let slots = self.slots.list_for_shift(definition_id).await?;
        let mut snapshots = Vec::with_capacity(slots.len());

        for slot in &slots {
            let name = match slot.assigned_worker_id {
                Some(worker_id) => self.worker_name(worker_id, names).await?,
                None => None,
            };
            snapshots.push(SlotSnapshot::new(slot, name));
        }

        Ok(snapshots)
    }

    async fn worker_name(
        &self,
        worker_id: Uuid,
        names: &mut HashMap<Uuid, Option<String>>,
    ) -> DomainResult<Option<String>> {
        if let Some(cached) = names.get(&worker_id) {
            return Ok(cached.clone());
        }

        let name = self
            .roster
            .resolve(worker_id)
            .await?
            .map(|worker| worker.display_name);
        if name.is_none() {
            tracing::warn!(%worker_id, "assigned worker is not on the roster");
        }
        names.insert(worker_id, name.clone());
        Ok(name)
    }
}

fn occurrence_dates(shift: &ShiftDefinition, window: &DateWindow) -> Vec<NaiveDate> {
    match shift.kind {
        ShiftKind::Unique => {
            if window.contains(shift.starting_date) {
                vec![shift.starting_date]
            } else {
                Vec::new()
            }
        }
        ShiftKind::Recurring => match RecurrenceRule::from_definition(shift) {
            Ok(rule) => rule.occurrences(window),
            Err(err) => {
                tracing::warn!(
                    shift_id = %shift.id,
                    error = %err,
                    "skipping recurring shift with invalid rule"
                );
                Vec::new()
            }
        },
    }
}
