//! Worker identity as seen by the rota.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member of the collective who can sit in roster seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerIdentity {
    pub id: Uuid,
    pub display_name: String,
    /// Participation-point balance earned by covering shifts.
    pub participation_points: i64,
    pub created_at: DateTime<Utc>,
}

impl WorkerIdentity {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            participation_points: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_points(mut self, points: i64) -> Self {
        self.participation_points = points;
        self
    }
}
