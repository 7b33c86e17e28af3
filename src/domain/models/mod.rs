//! Domain models for the shift rota.

pub mod config;
pub mod history;
pub mod occurrence;
pub mod shift;
pub mod slot;
pub mod worker;

pub use config::{Config, DatabaseConfig, LoggingConfig, QueryConfig};
pub use history::{HistoryChange, ShiftHistoryEntry, SlotHistoryEntry};
pub use occurrence::{Occurrence, SlotSnapshot};
pub use shift::{
    RotationWeek, ShiftDefinition, ShiftKind, ShiftUpdate, ShiftWeekday, MAX_NOTES_LEN,
    MAX_REQUIRED_WORKERS, MAX_TITLE_LEN,
};
pub use slot::{AssignmentSlot, SlotUpdate};
pub use worker::WorkerIdentity;
