//! Roster edits, persistence and deletion through the services.

mod common;

use common::{date, Rota};
use shiftplan::domain::errors::DomainError;
use shiftplan::domain::models::{
    HistoryChange, RotationWeek, ShiftDefinition, ShiftUpdate, ShiftWeekday, SlotUpdate,
};
use shiftplan::domain::ports::AssignmentSlotRepository;
use uuid::Uuid;

#[tokio::test]
async fn test_assignment_survives_reload() {
    let rota = Rota::new().await;
    let (shift, slots) = rota
        .create(ShiftDefinition::unique("Inventory", date(2023, 2, 7), 3))
        .await;
    let ada = rota.worker("Ada").await;
    let grace = rota.worker("Grace").await;

    let update = SlotUpdate {
        assigned_worker_id: Some(Some(ada.id)),
        open_for_replacement: Some(true),
        replacement_worker_id: Some(Some(grace.id)),
        notes: Some("swap agreed".to_string()),
        ..Default::default()
    };
    rota.assignments.update_slot(slots[2].id, update).await.unwrap();

    let (_, reloaded) = rota.shift_service.get_shift(shift.id).await.unwrap();
    assert_eq!(reloaded.len(), 3);
    let slot = &reloaded[2];
    assert_eq!(slot.position, 2);
    assert_eq!(slot.assigned_worker_id, Some(ada.id));
    assert_eq!(slot.replacement_worker_id, Some(grace.id));
    assert!(slot.open_for_replacement);
    assert!(!slot.attended);
    assert_eq!(slot.notes, "swap agreed");
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields() {
    let rota = Rota::new().await;
    let (_, slots) = rota.create(ShiftDefinition::unique("Inventory", date(2023, 2, 7), 1)).await;
    let ada = rota.worker("Ada").await;

    rota.assignments.assign(slots[0].id, Some(ada.id)).await.unwrap();
    rota.assignments.set_attended(slots[0].id, true).await.unwrap();

    let slot = rota.slots.get(slots[0].id).await.unwrap().unwrap();
    assert_eq!(slot.assigned_worker_id, Some(ada.id));
    assert!(slot.attended);
}

#[tokio::test]
async fn test_unknown_worker_leaves_slot_untouched() {
    let rota = Rota::new().await;
    let (_, slots) = rota.create(ShiftDefinition::unique("Inventory", date(2023, 2, 7), 1)).await;

    let result = rota.assignments.assign(slots[0].id, Some(Uuid::new_v4())).await;
    assert!(matches!(result, Err(DomainError::WorkerNotFound(_))));

    let slot = rota.slots.get(slots[0].id).await.unwrap().unwrap();
    assert_eq!(slot.assigned_worker_id, None);
}

#[tokio::test]
async fn test_definition_update_keeps_roster() {
    let rota = Rota::new().await;
    let (shift, slots) = rota
        .create(ShiftDefinition::recurring(
            "Store",
            RotationWeek::A,
            ShiftWeekday::Monday,
            date(2023, 1, 1),
            2,
        ))
        .await;
    let ada = rota.worker("Ada").await;
    rota.assignments.assign(slots[1].id, Some(ada.id)).await.unwrap();

    let update = ShiftUpdate {
        weekday: Some(Some(ShiftWeekday::Tuesday)),
        ending_date: Some(Some(date(2023, 12, 31))),
        ..Default::default()
    };
    let updated = rota.shift_service.update_shift(shift.id, update).await.unwrap();
    assert_eq!(updated.weekday, Some(ShiftWeekday::Tuesday));
    assert_eq!(updated.required_worker_count, 2);

    let (_, reloaded) = rota.shift_service.get_shift(shift.id).await.unwrap();
    let reloaded_ids: Vec<_> = reloaded.iter().map(|s| s.id).collect();
    let original_ids: Vec<_> = slots.iter().map(|s| s.id).collect();
    assert_eq!(reloaded_ids, original_ids);
    assert_eq!(reloaded[1].assigned_worker_id, Some(ada.id));
}

#[tokio::test]
async fn test_delete_removes_slots() {
    let rota = Rota::new().await;
    let (shift, slots) = rota.create(ShiftDefinition::unique("Party", date(2023, 2, 7), 2)).await;

    rota.shift_service.delete_shift(shift.id).await.unwrap();

    for slot in &slots {
        assert!(rota.slots.get(slot.id).await.unwrap().is_none());
    }
    let result = rota.assignments.set_attended(slots[0].id, true).await;
    assert!(matches!(result, Err(DomainError::SlotNotFound(_))));
}

#[tokio::test]
async fn test_removed_worker_is_cleared_from_slots() {
    let rota = Rota::new().await;
    let (_, slots) = rota.create(ShiftDefinition::unique("Party", date(2023, 2, 7), 1)).await;
    let ada = rota.worker("Ada").await;
    rota.assignments.assign(slots[0].id, Some(ada.id)).await.unwrap();

    sqlx::query("DELETE FROM workers WHERE id = ?")
        .bind(ada.id.to_string())
        .execute(&rota.pool)
        .await
        .unwrap();

    let slot = rota.slots.get(slots[0].id).await.unwrap().unwrap();
    assert_eq!(slot.assigned_worker_id, None);
}

#[tokio::test]
async fn test_roster_history_survives_definition_deletion() {
    let rota = Rota::new().await;
    let (shift, slots) = rota.create(ShiftDefinition::unique("Party", date(2023, 2, 7), 1)).await;
    let ada = rota.worker("Ada").await;
    let grace = rota.worker("Grace").await;

    rota.assignments.assign(slots[0].id, Some(ada.id)).await.unwrap();
    rota.assignments.mark_open_for_replacement(slots[0].id, true).await.unwrap();
    rota.assignments.assign_replacement(slots[0].id, Some(grace.id)).await.unwrap();
    rota.assignments.set_attended(slots[0].id, true).await.unwrap();
    rota.shift_service.delete_shift(shift.id).await.unwrap();

    let history = rota.assignments.slot_history(slots[0].id).await.unwrap();
    assert_eq!(history.len(), 6);
    assert_eq!(history[0].change, HistoryChange::Created);
    assert_eq!(history[5].change, HistoryChange::Deleted);

    let last = &history[5].slot;
    assert_eq!(last.assigned_worker_id, Some(ada.id));
    assert_eq!(last.replacement_worker_id, Some(grace.id));
    assert!(last.open_for_replacement);
    assert!(last.attended);

    let definition = rota.shift_service.shift_history(shift.id).await.unwrap();
    let changes: Vec<_> = definition.iter().map(|h| h.change).collect();
    assert_eq!(changes, vec![HistoryChange::Created, HistoryChange::Deleted]);
}
