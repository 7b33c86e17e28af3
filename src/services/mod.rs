pub mod assignment_service;
pub mod occurrence_assembler;
pub mod query_filter;
pub mod recurrence;
pub mod shift_service;

pub use assignment_service::AssignmentService;
pub use occurrence_assembler::{OccurrenceAssembler, DEFAULT_LARGE_WINDOW_DAYS};
pub use query_filter::{Candidates, FilterField, QueryFilter, ShiftQuery, FILTER_FIELDS};
pub use recurrence::{expand, DateWindow, RecurrenceRule};
pub use shift_service::ShiftService;
