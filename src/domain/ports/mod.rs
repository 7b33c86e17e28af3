//! Domain ports (interfaces) for the shift rota.
//!
//! Ports define the contracts that adapters must implement.

pub mod shift_repository;
pub mod slot_repository;
pub mod worker_roster;

pub use shift_repository::{ShiftCriteria, ShiftDefinitionRepository};
pub use slot_repository::AssignmentSlotRepository;
pub use worker_roster::WorkerRoster;
