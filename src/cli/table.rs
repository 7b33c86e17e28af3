//! Table output formatting for CLI commands
//!
//! Renders occurrences, rosters, shift definitions and workers with comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::collections::HashMap;
use std::env;
use uuid::Uuid;

use crate::cli::output::{short_id, truncate};
use crate::domain::models::{AssignmentSlot, Occurrence, ShiftDefinition, WorkerIdentity};

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// One row per occurrence with its fill ratio and assigned names.
    pub fn format_occurrences(&self, occurrences: &[Occurrence]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&[
            "Date", "Day", "Week", "Time", "Title", "Filled", "Workers", "Shift",
        ]));

        for occurrence in occurrences {
            let filled = occurrence.filled_count();
            let required = usize::from(occurrence.required_worker_count);
            let filled_cell = Cell::new(format!("{}/{}", filled, required));
            let filled_cell = if self.use_colors {
                filled_cell.fg(fill_color(filled, required))
            } else {
                filled_cell
            };

            let workers: Vec<String> = occurrence
                .slots
                .iter()
                .map(|slot| {
                    let assigned = (slot.assigned_worker_id, slot.assigned_worker_name.as_deref());
                    let name = match assigned {
                        (Some(_), Some(name)) => name.to_string(),
                        (Some(id), None) => short_id(&id),
                        (None, _) => "-".to_string(),
                    };
                    if slot.open_for_replacement {
                        format!("{}*", name)
                    } else {
                        name
                    }
                })
                .collect();

            table.add_row(vec![
                Cell::new(occurrence.date.format("%Y-%m-%d")),
                Cell::new(occurrence.date.format("%a")),
                Cell::new(occurrence.rotation_week.map_or("-", |w| w.as_str())),
                Cell::new(time_range(occurrence.starting_time, occurrence.ending_time)),
                Cell::new(truncate(&occurrence.title, 30)),
                filled_cell,
                Cell::new(workers.join(", ")),
                Cell::new(short_id(&occurrence.definition_id)),
            ]);
        }

        table.to_string()
    }

    pub fn format_shifts(&self, shifts: &[ShiftDefinition]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&[
            "ID", "Title", "Kind", "Starts", "Ends", "Week", "Day", "Workers",
        ]));

        for shift in shifts {
            table.add_row(vec![
                Cell::new(short_id(&shift.id)),
                Cell::new(truncate(&shift.title, 30)),
                Cell::new(shift.kind.as_str()),
                Cell::new(shift.starting_date.format("%Y-%m-%d")),
                Cell::new(
                    shift
                        .ending_date
                        .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string()),
                ),
                Cell::new(shift.rotation_week.map_or("-", |w| w.as_str())),
                Cell::new(shift.weekday.map_or("-", |d| d.as_str())),
                Cell::new(shift.required_worker_count),
            ]);
        }

        table.to_string()
    }

    /// Roster of a single definition. `names` maps worker ids to display names.
    pub fn format_slots(&self, slots: &[AssignmentSlot], names: &HashMap<Uuid, String>) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&[
            "#", "Slot", "Worker", "Open", "Replacement", "Attended", "Notes",
        ]));

        let display = |id: Option<Uuid>| match id {
            Some(id) => names.get(&id).cloned().unwrap_or_else(|| short_id(&id)),
            None => "-".to_string(),
        };

        for slot in slots {
            table.add_row(vec![
                Cell::new(slot.position + 1),
                Cell::new(short_id(&slot.id)),
                Cell::new(display(slot.assigned_worker_id)),
                Cell::new(yes_no(slot.open_for_replacement)),
                Cell::new(display(slot.replacement_worker_id)),
                Cell::new(yes_no(slot.attended)),
                Cell::new(truncate(&slot.notes, 40)),
            ]);
        }

        table.to_string()
    }

    pub fn format_workers(&self, workers: &[WorkerIdentity]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["ID", "Name", "Points"]));

        for worker in workers {
            table.add_row(vec![
                Cell::new(short_id(&worker.id)),
                Cell::new(&worker.display_name),
                Cell::new(worker.participation_points),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.use_colors {
            table.force_no_tty();
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

fn time_range(start: Option<chrono::NaiveTime>, end: Option<chrono::NaiveTime>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
        (Some(start), None) => format!("{}-", start.format("%H:%M")),
        (None, Some(end)) => format!("-{}", end.format("%H:%M")),
        (None, None) => "-".to_string(),
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

const fn fill_color(filled: usize, required: usize) -> Color {
    if filled >= required {
        Color::Green
    } else if filled == 0 {
        Color::Red
    } else {
        Color::Yellow
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}
