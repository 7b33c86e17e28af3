//! End-to-end occurrence listing against a migrated database.

mod common;

use common::{date, window_query, Rota};
use shiftplan::domain::models::{RotationWeek, ShiftDefinition, ShiftKind, ShiftWeekday, SlotUpdate};
use shiftplan::services::ShiftQuery;

#[tokio::test]
async fn test_week_c_monday_in_february() {
    let rota = Rota::new().await;
    let (shift, _) = rota
        .create(ShiftDefinition::recurring(
            "Store",
            RotationWeek::C,
            ShiftWeekday::Monday,
            date(2023, 1, 1),
            4,
        ))
        .await;

    let occurrences = rota
        .assembler
        .list(&window_query(date(2023, 2, 1), date(2023, 2, 28)))
        .await
        .unwrap();

    assert_eq!(occurrences.len(), 1);
    let occurrence = &occurrences[0];
    assert_eq!(occurrence.date, date(2023, 2, 13));
    assert_eq!(occurrence.definition_id, shift.id);
    assert_eq!(occurrence.kind, ShiftKind::Recurring);
    assert_eq!(occurrence.slots.len(), 4);
}

#[tokio::test]
async fn test_unique_shift_in_window() {
    let rota = Rota::new().await;
    let (shift, _) = rota.create(ShiftDefinition::unique("Inventory", date(2023, 2, 7), 1)).await;

    let occurrences = rota
        .assembler
        .list(&window_query(date(2023, 2, 1), date(2023, 2, 28)))
        .await
        .unwrap();

    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].date, date(2023, 2, 7));
    assert_eq!(occurrences[0].definition_id, shift.id);
    assert_eq!(occurrences[0].kind, ShiftKind::Unique);
}

#[tokio::test]
async fn test_week_a_monday_with_ending_date() {
    let rota = Rota::new().await;
    rota.create(
        ShiftDefinition::recurring(
            "Store",
            RotationWeek::A,
            ShiftWeekday::Monday,
            date(2023, 1, 1),
            1,
        )
        .with_ending_date(date(2023, 10, 8)),
    )
    .await;

    let dates: Vec<_> = rota
        .assembler
        .list(&window_query(date(2023, 1, 1), date(2023, 1, 31)))
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.date)
        .collect();

    assert_eq!(dates, vec![date(2023, 1, 2), date(2023, 1, 30)]);
}

#[tokio::test]
async fn test_definition_created_long_before_window() {
    let rota = Rota::new().await;
    rota.create(ShiftDefinition::recurring(
        "Deliveries",
        RotationWeek::B,
        ShiftWeekday::Friday,
        date(2022, 6, 1),
        1,
    ))
    .await;

    let occurrences = rota
        .assembler
        .list(&window_query(date(2023, 3, 1), date(2023, 3, 31)))
        .await
        .unwrap();

    let dates: Vec<_> = occurrences.iter().map(|o| o.date).collect();
    assert_eq!(dates, vec![date(2023, 3, 10)]);
}

#[tokio::test]
async fn test_recurring_definition_ended_before_window() {
    let rota = Rota::new().await;
    rota.create(
        ShiftDefinition::recurring(
            "Store",
            RotationWeek::A,
            ShiftWeekday::Monday,
            date(2022, 1, 1),
            1,
        )
        .with_ending_date(date(2022, 12, 31)),
    )
    .await;

    let occurrences = rota
        .assembler
        .list(&window_query(date(2023, 1, 1), date(2023, 1, 31)))
        .await
        .unwrap();
    assert!(occurrences.is_empty());
}

#[tokio::test]
async fn test_unique_shift_and_mixed_ordering() {
    let rota = Rota::new().await;
    let (party, _) = rota.create(ShiftDefinition::unique("Party", date(2023, 2, 13), 3)).await;
    let (store, _) = rota
        .create(ShiftDefinition::recurring(
            "Store",
            RotationWeek::C,
            ShiftWeekday::Monday,
            date(2023, 1, 1),
            2,
        ))
        .await;
    rota.create(ShiftDefinition::unique("Inventory", date(2023, 2, 2), 1)).await;
    rota.create(ShiftDefinition::unique("Next month", date(2023, 3, 2), 1)).await;

    let occurrences = rota
        .assembler
        .list(&window_query(date(2023, 2, 1), date(2023, 2, 28)))
        .await
        .unwrap();

    let titles: Vec<&str> = occurrences.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles.len(), 3);
    assert_eq!(titles[0], "Inventory");
    assert!(occurrences.windows(2).all(|pair| pair[0].date <= pair[1].date));

    // Same-day occurrences are ordered by definition id
    let same_day: Vec<_> = occurrences.iter().filter(|o| o.date == date(2023, 2, 13)).collect();
    assert_eq!(same_day.len(), 2);
    let mut expected = vec![party.id, store.id];
    expected.sort();
    assert_eq!(same_day.iter().map(|o| o.definition_id).collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn test_recurring_definition_starting_inside_window_is_not_duplicated() {
    let rota = Rota::new().await;
    rota.create(ShiftDefinition::recurring(
        "Store",
        RotationWeek::A,
        ShiftWeekday::Monday,
        date(2023, 1, 2),
        1,
    ))
    .await;

    let occurrences = rota
        .assembler
        .list(&window_query(date(2022, 12, 1), date(2023, 1, 31)))
        .await
        .unwrap();

    let dates: Vec<_> = occurrences.iter().map(|o| o.date).collect();
    assert_eq!(dates, vec![date(2023, 1, 2), date(2023, 1, 30)]);
}

#[tokio::test]
async fn test_filters_from_query_params() {
    let rota = Rota::new().await;
    rota.create(ShiftDefinition::recurring(
        "Store morning",
        RotationWeek::C,
        ShiftWeekday::Monday,
        date(2023, 1, 1),
        2,
    ))
    .await;
    rota.create(ShiftDefinition::recurring(
        "Bakery",
        RotationWeek::C,
        ShiftWeekday::Monday,
        date(2023, 1, 1),
        2,
    ))
    .await;
    rota.create(ShiftDefinition::unique("Store party", date(2023, 2, 20), 4)).await;

    let query = ShiftQuery::from_params([
        ("min_date", "2023-02-01"),
        ("max_date", "2023-02-28"),
        ("title_contains", "STORE"),
    ])
    .unwrap();
    let titles: Vec<String> = rota
        .assembler
        .list(&query)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.title)
        .collect();
    assert_eq!(titles, vec!["Store morning", "Store party"]);

    let query = ShiftQuery::from_params([
        ("min_date", "2023-02-01"),
        ("max_date", "2023-02-28"),
        ("required_worker_count", "4"),
    ])
    .unwrap();
    let occurrences = rota.assembler.list(&query).await.unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].title, "Store party");
}

#[tokio::test]
async fn test_rotation_week_filter_excludes_other_buckets() {
    let rota = Rota::new().await;
    for week in RotationWeek::ALL {
        rota.create(ShiftDefinition::recurring(
            format!("Week {}", week.as_str()),
            week,
            ShiftWeekday::Wednesday,
            date(2023, 1, 1),
            1,
        ))
        .await;
    }

    let query = ShiftQuery::from_params([
        ("min_date", "2023-01-01"),
        ("max_date", "2023-03-31"),
        ("rotation_week", "D"),
    ])
    .unwrap();
    let occurrences = rota.assembler.list(&query).await.unwrap();

    assert!(!occurrences.is_empty());
    assert!(occurrences.iter().all(|o| o.rotation_week == Some(RotationWeek::D)));
}

#[tokio::test]
async fn test_assignments_appear_on_every_occurrence() {
    let rota = Rota::new().await;
    let (_, slots) = rota
        .create(ShiftDefinition::recurring(
            "Store",
            RotationWeek::A,
            ShiftWeekday::Monday,
            date(2023, 1, 1),
            2,
        ))
        .await;
    let ada = rota.worker("Ada").await;

    rota.assignments
        .update_slot(slots[0].id, SlotUpdate::assign(Some(ada.id)))
        .await
        .unwrap();

    let occurrences = rota
        .assembler
        .list(&window_query(date(2023, 1, 1), date(2023, 1, 31)))
        .await
        .unwrap();

    assert_eq!(occurrences.len(), 2);
    for occurrence in &occurrences {
        assert_eq!(occurrence.slots[0].assigned_worker_id, Some(ada.id));
        assert_eq!(occurrence.slots[0].assigned_worker_name.as_deref(), Some("Ada"));
        assert_eq!(occurrence.slots[1].assigned_worker_id, None);
    }
}

#[tokio::test]
async fn test_deleted_definition_disappears_from_listing() {
    let rota = Rota::new().await;
    let (shift, _) = rota.create(ShiftDefinition::unique("Party", date(2023, 2, 7), 1)).await;

    rota.shift_service.delete_shift(shift.id).await.unwrap();

    let occurrences = rota
        .assembler
        .list(&window_query(date(2023, 2, 1), date(2023, 2, 28)))
        .await
        .unwrap();
    assert!(occurrences.is_empty());
}

#[tokio::test]
async fn test_title_filter_matches_umlauts_in_any_case() {
    let rota = Rota::new().await;
    let (apples, _) = rota
        .create(ShiftDefinition::unique("Äpfel sortieren", date(2023, 2, 7), 1))
        .await;
    rota.create(ShiftDefinition::unique("Brot backen", date(2023, 2, 8), 1)).await;

    for needle in ["Äpfel", "äpfel", "ÄPFEL"] {
        let query = ShiftQuery::from_params([
            ("min_date", "2023-02-01"),
            ("max_date", "2023-02-28"),
            ("title_contains", needle),
        ])
        .unwrap();
        let occurrences = rota.assembler.list(&query).await.unwrap();

        assert_eq!(occurrences.len(), 1, "title_contains={}", needle);
        assert_eq!(occurrences[0].definition_id, apples.id);
    }
}

#[tokio::test]
async fn test_unknown_rotation_week_lists_nothing() {
    let rota = Rota::new().await;
    for week in RotationWeek::ALL {
        rota.create(ShiftDefinition::recurring(
            "Store",
            week,
            ShiftWeekday::Monday,
            date(2023, 1, 1),
            1,
        ))
        .await;
    }

    let query = ShiftQuery::from_params([
        ("min_date", "2023-02-01"),
        ("max_date", "2023-02-28"),
        ("rotation_week", "Q"),
        ("colour", "red"),
    ])
    .unwrap();

    assert!(rota.assembler.list(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupted_recurrence_columns_are_skipped() {
    let rota = Rota::new().await;
    let (store, _) = rota
        .create(ShiftDefinition::recurring(
            "Store",
            RotationWeek::C,
            ShiftWeekday::Monday,
            date(2023, 1, 1),
            1,
        ))
        .await;
    let mut broken = Vec::new();
    for column in ["rotation_week", "weekday"] {
        let (shift, _) = rota
            .create(ShiftDefinition::recurring(
                format!("Broken {}", column),
                RotationWeek::C,
                ShiftWeekday::Monday,
                date(2023, 1, 1),
                1,
            ))
            .await;
        sqlx::query(&format!(
            "UPDATE shift_definitions SET {} = 'garbage' WHERE id = ?",
            column
        ))
        .bind(shift.id.to_string())
        .execute(&rota.pool)
        .await
        .unwrap();
        broken.push(shift.id);
    }

    let occurrences = rota
        .assembler
        .list(&window_query(date(2023, 2, 1), date(2023, 2, 28)))
        .await
        .unwrap();

    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].definition_id, store.id);
    assert_eq!(occurrences[0].date, date(2023, 2, 13));
    assert!(occurrences.iter().all(|o| !broken.contains(&o.definition_id)));
}
