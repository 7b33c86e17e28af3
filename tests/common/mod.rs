//! Common test utilities for integration tests
//!
//! Provides a migrated in-memory rota with every adapter and service wired
//! the way the CLI wires them.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use shiftplan::adapters::sqlite::{
    create_migrated_test_pool, SqliteAssignmentSlotRepository, SqliteShiftDefinitionRepository,
    SqliteWorkerRoster,
};
use shiftplan::domain::models::{AssignmentSlot, ShiftDefinition, WorkerIdentity};
use shiftplan::services::{
    AssignmentService, DateWindow, OccurrenceAssembler, ShiftQuery, ShiftService,
};
use shiftplan::domain::ports::ShiftCriteria;
use sqlx::SqlitePool;

pub struct Rota {
    pub pool: SqlitePool,
    pub shifts: Arc<SqliteShiftDefinitionRepository>,
    pub slots: Arc<SqliteAssignmentSlotRepository>,
    pub roster: Arc<SqliteWorkerRoster>,
    pub shift_service:
        ShiftService<SqliteShiftDefinitionRepository, SqliteAssignmentSlotRepository>,
    pub assignments: AssignmentService<SqliteAssignmentSlotRepository, SqliteWorkerRoster>,
    pub assembler: OccurrenceAssembler<
        SqliteShiftDefinitionRepository,
        SqliteAssignmentSlotRepository,
        SqliteWorkerRoster,
    >,
}

impl Rota {
    pub async fn new() -> Self {
        let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
        let shifts = Arc::new(SqliteShiftDefinitionRepository::new(pool.clone()));
        let slots = Arc::new(SqliteAssignmentSlotRepository::new(pool.clone()));
        let roster = Arc::new(SqliteWorkerRoster::new(pool.clone()));

        Self {
            shift_service: ShiftService::new(shifts.clone(), slots.clone()),
            assignments: AssignmentService::new(slots.clone(), roster.clone()),
            assembler: OccurrenceAssembler::new(shifts.clone(), slots.clone(), roster.clone()),
            pool,
            shifts,
            slots,
            roster,
        }
    }

    /// Create a definition through the service; returns it with its roster.
    pub async fn create(&self, shift: ShiftDefinition) -> (ShiftDefinition, Vec<AssignmentSlot>) {
        self.shift_service.create_shift(shift).await.expect("Failed to create shift")
    }

    pub async fn worker(&self, name: &str) -> WorkerIdentity {
        let worker = WorkerIdentity::new(name);
        self.roster.register(&worker).await.expect("Failed to register worker");
        worker
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Query over `[start, end]` with no other criteria.
pub fn window_query(start: NaiveDate, end: NaiveDate) -> ShiftQuery {
    ShiftQuery::new(DateWindow::new(start, end).expect("valid window"), ShiftCriteria::default())
}
