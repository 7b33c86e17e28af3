//! Shiftplan - shift rota engine
//!
//! Stores shift definitions, either one-off ("unique") or repeating on a
//! four-week rotation (weeks A to D, bucketed by ISO week number), and
//! expands them into concrete dated occurrences for any window. Each
//! definition owns a fixed roster of assignment slots that workers sit in
//! across all of its occurrences.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, validation and repository ports
//! - **Service Layer** (`services`): Recurrence expansion, query filtering,
//!   occurrence assembly and the edit services
//! - **Adapters** (`adapters`): SQLite implementations of the ports
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use shiftplan::services::ShiftQuery;
//!
//! let query = ShiftQuery::from_params([("min_date", "2023-02-01"), ("max_date", "2023-02-28")])?;
//! let occurrences = assembler.list(&query).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AssignmentSlot, Config, Occurrence, RotationWeek, ShiftDefinition, ShiftKind, ShiftUpdate,
    ShiftWeekday, SlotSnapshot, SlotUpdate, WorkerIdentity,
};
pub use services::{
    expand, AssignmentService, DateWindow, OccurrenceAssembler, RecurrenceRule, ShiftQuery,
    ShiftService,
};
