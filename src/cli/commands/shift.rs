//! Shift CLI commands: definitions and the occurrence list.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::sqlite::{
    SqliteAssignmentSlotRepository, SqliteShiftDefinitionRepository, SqliteWorkerRoster,
};
use crate::cli::id_resolver::resolve_shift_id;
use crate::cli::open_database;
use crate::cli::output::{output, ActionOutput, CommandOutput};
use crate::cli::table::TableFormatter;
use crate::domain::models::{
    AssignmentSlot, Config, Occurrence, RotationWeek, ShiftDefinition, ShiftHistoryEntry, ShiftKind,
    ShiftUpdate, ShiftWeekday,
};
use crate::domain::ports::WorkerRoster;
use crate::services::query_filter::{
    parse_clock_time, parse_iso_date, MAX_DATE_PARAM, MIN_DATE_PARAM,
};
use crate::services::{OccurrenceAssembler, ShiftQuery, ShiftService};

#[derive(Args, Debug)]
pub struct ShiftArgs {
    #[command(subcommand)]
    pub command: ShiftCommands,
}

#[derive(Subcommand, Debug)]
pub enum ShiftCommands {
    /// Create a unique or recurring shift
    Create {
        /// Shift title (at most 30 characters)
        #[arg(long)]
        title: String,

        /// unique or recurring
        #[arg(long, default_value = "unique")]
        kind: String,

        /// Date of a unique shift, first day of a recurring one (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Last day of a recurring shift (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,

        /// Rotation week A-D (recurring only)
        #[arg(long)]
        week: Option<String>,

        /// Weekday (recurring only)
        #[arg(long)]
        weekday: Option<String>,

        /// Start time (HH:MM)
        #[arg(long)]
        start: Option<String>,

        /// End time (HH:MM)
        #[arg(long)]
        end: Option<String>,

        /// Number of workers required
        #[arg(long, default_value = "1")]
        workers: u16,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List occurrences between two dates
    List {
        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Only unique or only recurring shifts
        #[arg(long)]
        kind: Option<String>,

        /// Case-insensitive title substring
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        week: Option<String>,

        #[arg(long)]
        weekday: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        workers: Option<u16>,

        /// Exact notes text
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a shift definition and its roster
    Show {
        /// Shift ID or unique prefix
        id: String,
    },

    /// Edit a shift definition. The number of workers cannot change.
    Update {
        /// Shift ID or unique prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        kind: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long, conflicts_with = "clear_until")]
        until: Option<String>,

        /// Remove the last day of a recurring shift
        #[arg(long)]
        clear_until: bool,

        #[arg(long)]
        week: Option<String>,

        #[arg(long)]
        weekday: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        #[arg(long)]
        clear_notes: bool,
    },

    /// Delete a shift and its roster
    Delete {
        /// Shift ID or unique prefix
        id: String,
    },

    /// Show every recorded state of a shift, including after deletion
    History {
        /// Full shift ID, or a unique prefix of an existing shift
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct OccurrenceListOutput {
    pub occurrences: Vec<Occurrence>,
    pub total: usize,
}

impl CommandOutput for OccurrenceListOutput {
    fn to_human(&self) -> String {
        if self.occurrences.is_empty() {
            return "No shifts in this period.".to_string();
        }
        format!(
            "{} occurrence(s):\n{}",
            self.total,
            TableFormatter::new().format_occurrences(&self.occurrences)
        )
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ShiftDetailOutput {
    pub shift: ShiftDefinition,
    pub slots: Vec<AssignmentSlot>,
    #[serde(skip)]
    pub worker_names: HashMap<uuid::Uuid, String>,
}

impl CommandOutput for ShiftDetailOutput {
    fn to_human(&self) -> String {
        let s = &self.shift;
        let mut lines = vec![
            format!("Shift: {}", s.title),
            format!("ID: {}", s.id),
            format!("Kind: {}", s.kind.as_str()),
        ];

        match s.kind {
            ShiftKind::Unique => lines.push(format!("Date: {}", s.starting_date)),
            ShiftKind::Recurring => {
                lines.push(format!(
                    "Every {} of week {}",
                    s.weekday.map_or("?", |d| d.as_str()),
                    s.rotation_week.map_or("?", |w| w.as_str())
                ));
                lines.push(format!("From: {}", s.starting_date));
                if let Some(until) = s.ending_date {
                    lines.push(format!("Until: {}", until));
                }
            }
        }

        if let (Some(start), Some(end)) = (s.starting_time, s.ending_time) {
            lines.push(format!("Time: {}-{}", start.format("%H:%M"), end.format("%H:%M")));
        }
        lines.push(format!("Workers required: {}", s.required_worker_count));
        if let Some(ref notes) = s.notes {
            lines.push(format!("Notes: {}", notes));
        }

        lines.push(String::new());
        lines.push(TableFormatter::new().format_slots(&self.slots, &self.worker_names));
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ShiftHistoryOutput {
    pub history: Vec<ShiftHistoryEntry>,
}

impl CommandOutput for ShiftHistoryOutput {
    fn to_human(&self) -> String {
        self.history
            .iter()
            .map(|entry| {
                format!(
                    "{}  {:<8} {} ({}, {} worker(s))",
                    entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.change.as_str(),
                    entry.shift.title,
                    entry.shift.starting_date,
                    entry.shift.required_worker_count
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub async fn execute(args: ShiftArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(config).await?;

    let shifts = Arc::new(SqliteShiftDefinitionRepository::new(pool.clone()));
    let slots = Arc::new(SqliteAssignmentSlotRepository::new(pool.clone()));
    let roster = Arc::new(SqliteWorkerRoster::new(pool.clone()));
    let service = ShiftService::new(shifts.clone(), slots.clone());

    match args.command {
        ShiftCommands::Create {
            title,
            kind,
            date,
            until,
            week,
            weekday,
            start,
            end,
            workers,
            notes,
        } => {
            let starting_date = parse_iso_date("date", &date)?;
            let mut shift = match parse_kind(&kind)? {
                ShiftKind::Unique => ShiftDefinition::unique(title, starting_date, workers),
                ShiftKind::Recurring => {
                    let week = week.context("--week is required for recurring shifts")?;
                    let weekday = weekday.context("--weekday is required for recurring shifts")?;
                    let mut shift = ShiftDefinition::recurring(
                        title,
                        parse_week(&week)?,
                        parse_weekday(&weekday)?,
                        starting_date,
                        workers,
                    );
                    if let Some(until) = until {
                        shift = shift.with_ending_date(parse_iso_date("until", &until)?);
                    }
                    shift
                }
            };
            shift.starting_time =
                start.as_deref().map(|t| parse_clock_time("start", t)).transpose()?;
            shift.ending_time = end.as_deref().map(|t| parse_clock_time("end", t)).transpose()?;
            shift.notes = notes;

            let (shift, slots) = service.create_shift(shift).await?;
            let out = ActionOutput::ok(format!(
                "Created {} shift '{}' with {} slot(s)\nID: {}",
                shift.kind.as_str(),
                shift.title,
                slots.len(),
                shift.id
            ));
            output(&out, json_mode);
        }

        ShiftCommands::List {
            from,
            to,
            kind,
            title,
            week,
            weekday,
            start,
            end,
            workers,
            notes,
        } => {
            let mut params = vec![
                (MIN_DATE_PARAM.to_string(), from),
                (MAX_DATE_PARAM.to_string(), to),
            ];
            let optional = [
                ("kind", kind),
                ("title_contains", title),
                ("rotation_week", week),
                ("weekday", weekday),
                ("starting_time", start),
                ("ending_time", end),
                ("required_worker_count", workers.map(|w| w.to_string())),
                ("notes", notes),
            ];
            params.extend(
                optional
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| (key.to_string(), v))),
            );

            let query = ShiftQuery::from_params(params)?;
            let assembler = OccurrenceAssembler::new(shifts, slots, roster)
                .with_large_window_days(config.query.large_window_days);
            let occurrences = assembler.list(&query).await?;

            let out = OccurrenceListOutput {
                total: occurrences.len(),
                occurrences,
            };
            output(&out, json_mode);
        }

        ShiftCommands::Show { id } => {
            let id = resolve_shift_id(&pool, &id).await?;
            let (shift, slots) = service.get_shift(id).await?;

            let mut worker_names = HashMap::new();
            for worker_id in slots
                .iter()
                .flat_map(|s| [s.assigned_worker_id, s.replacement_worker_id])
                .flatten()
            {
                if worker_names.contains_key(&worker_id) {
                    continue;
                }
                if let Some(worker) = roster.resolve(worker_id).await? {
                    worker_names.insert(worker_id, worker.display_name);
                }
            }

            let out = ShiftDetailOutput {
                shift,
                slots,
                worker_names,
            };
            output(&out, json_mode);
        }

        ShiftCommands::Update {
            id,
            title,
            kind,
            date,
            until,
            clear_until,
            week,
            weekday,
            start,
            end,
            notes,
            clear_notes,
        } => {
            let id = resolve_shift_id(&pool, &id).await?;

            let ending_date = match (until, clear_until) {
                (Some(until), _) => Some(Some(parse_iso_date("until", &until)?)),
                (None, true) => Some(None),
                (None, false) => None,
            };
            let notes = match (notes, clear_notes) {
                (Some(notes), _) => Some(Some(notes)),
                (None, true) => Some(None),
                (None, false) => None,
            };

            let update = ShiftUpdate {
                title,
                kind: kind.as_deref().map(parse_kind).transpose()?,
                starting_date: date.as_deref().map(|d| parse_iso_date("date", d)).transpose()?,
                ending_date,
                rotation_week: week.as_deref().map(parse_week).transpose()?.map(Some),
                weekday: weekday.as_deref().map(parse_weekday).transpose()?.map(Some),
                starting_time: start
                    .as_deref()
                    .map(|t| parse_clock_time("start", t))
                    .transpose()?
                    .map(Some),
                ending_time: end
                    .as_deref()
                    .map(|t| parse_clock_time("end", t))
                    .transpose()?
                    .map(Some),
                notes,
            };

            let shift = service.update_shift(id, update).await?;
            output(&ActionOutput::ok(format!("Shift updated: {}", shift.title)), json_mode);
        }

        ShiftCommands::Delete { id } => {
            let id = resolve_shift_id(&pool, &id).await?;
            service.delete_shift(id).await?;
            output(&ActionOutput::ok(format!("Shift deleted: {}", id)), json_mode);
        }

        ShiftCommands::History { id } => {
            // Deleted shifts can only be addressed by their full ID
            let id = match uuid::Uuid::parse_str(&id) {
                Ok(id) => id,
                Err(_) => resolve_shift_id(&pool, &id).await?,
            };
            let history = service.shift_history(id).await?;
            output(&ShiftHistoryOutput { history }, json_mode);
        }
    }

    Ok(())
}

fn parse_kind(value: &str) -> Result<ShiftKind> {
    match ShiftKind::from_str(value) {
        Some(kind) => Ok(kind),
        None => bail!("Invalid kind '{}': expected unique or recurring", value),
    }
}

fn parse_week(value: &str) -> Result<RotationWeek> {
    match RotationWeek::from_str(value) {
        Some(week) => Ok(week),
        None => bail!("Invalid rotation week '{}': expected A, B, C or D", value),
    }
}

fn parse_weekday(value: &str) -> Result<ShiftWeekday> {
    match ShiftWeekday::from_str(value) {
        Some(day) => Ok(day),
        None => bail!("Invalid weekday '{}'", value),
    }
}
