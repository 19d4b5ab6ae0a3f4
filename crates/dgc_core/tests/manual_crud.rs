use chrono::Utc;
use dgc_core::db::open_db_in_memory;
use dgc_core::{
    MainPoint, Manual, ManualPatch, ManualRepository, ManualService, ManualServiceError, Month,
    NewManual, RepoError, SqliteManualRepository,
};
use rusqlite::Connection;

fn new_manual(title: &str, month: &str, order: i64) -> NewManual {
    NewManual {
        title: Some(title.to_string()),
        month: Some(month.to_string()),
        order: Some(order),
        ..NewManual::default()
    }
}

fn service(conn: &Connection) -> ManualService<SqliteManualRepository<'_>> {
    ManualService::new(SqliteManualRepository::try_new(conn).unwrap())
}

#[test]
fn insert_and_get_roundtrip_preserves_main_points() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManualRepository::try_new(&conn).unwrap();

    let mut manual = Manual::new(
        "jan_2026_01",
        "Jesus as the Door of the Sheep",
        Month::January,
        1,
        Utc::now(),
    );
    manual.memory_verse = Some("John 10:9".to_string());
    manual.main_points = vec![MainPoint {
        title: "Jesus is the only way to the father".to_string(),
        description: "Every other portal is a lie.".to_string(),
        references: vec!["John 14:6".to_string(), "Hebrews 7:25".to_string()],
    }];
    repo.insert_manual(&manual).unwrap();

    let loaded = repo.get_manual("jan_2026_01").unwrap().unwrap();
    assert_eq!(loaded.main_points, manual.main_points);
    assert_eq!(loaded.memory_verse.as_deref(), Some("John 10:9"));
    assert_eq!(
        loaded.created_at.timestamp_millis(),
        manual.created_at.timestamp_millis()
    );
}

#[test]
fn insert_duplicate_id_returns_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManualRepository::try_new(&conn).unwrap();
    let manual = Manual::new("dup", "First", Month::March, 1, Utc::now());
    repo.insert_manual(&manual).unwrap();

    let err = repo.insert_manual(&manual).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(id) if id == "dup"));
}

#[test]
fn list_by_month_orders_by_order_and_keeps_insertion_order_for_ties() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManualRepository::try_new(&conn).unwrap();
    for (id, order) in [("c", 3), ("a", 1), ("b1", 2), ("b2", 2)] {
        repo.insert_manual(&Manual::new(id, id, Month::April, order, Utc::now()))
            .unwrap();
    }
    repo.insert_manual(&Manual::new("other", "other", Month::May, 0, Utc::now()))
        .unwrap();

    let listed: Vec<String> = repo
        .list_by_month(Month::April, None)
        .unwrap()
        .into_iter()
        .map(|manual| manual.id)
        .collect();
    assert_eq!(listed, vec!["a", "b1", "b2", "c"]);

    let limited = repo.list_by_month(Month::April, Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
}

#[test]
fn list_all_orders_by_calendar_month_then_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManualRepository::try_new(&conn).unwrap();
    repo.insert_manual(&Manual::new("dec1", "d", Month::December, 1, Utc::now()))
        .unwrap();
    repo.insert_manual(&Manual::new("jan2", "j", Month::January, 2, Utc::now()))
        .unwrap();
    repo.insert_manual(&Manual::new("jan1", "j", Month::January, 1, Utc::now()))
        .unwrap();

    let ids: Vec<String> = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|manual| manual.id)
        .collect();
    assert_eq!(ids, vec!["jan1", "jan2", "dec1"]);
}

#[test]
fn create_requires_title_month_and_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for input in [
        NewManual {
            title: None,
            ..new_manual("", "January", 1)
        },
        NewManual {
            title: Some("   ".to_string()),
            ..new_manual("", "January", 1)
        },
        NewManual {
            month: None,
            ..new_manual("Title", "January", 1)
        },
        NewManual {
            order: None,
            ..new_manual("Title", "January", 1)
        },
    ] {
        let err = service.create_manual(input).unwrap_err();
        assert!(
            matches!(&err, ManualServiceError::Validation(message) if message == "Title, month, and order are required"),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn create_rejects_month_not_in_canonical_spelling() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .create_manual(new_manual("Title", "january", 1))
        .unwrap_err();
    assert!(matches!(err, ManualServiceError::Validation(message) if message == "Invalid month"));
}

#[test]
fn create_generates_id_from_month_and_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create_manual(new_manual("The Cost of our Salvation", "January", 2))
        .unwrap();
    assert!(created.id.starts_with("january_2_"));
    assert_eq!(created.created_at, created.updated_at);
    assert!(created.main_points.is_empty());
}

#[test]
fn create_then_list_by_lowercase_month_returns_manual() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create_manual(new_manual("Week five", "January", 5))
        .unwrap();

    let listing = service.manuals_for_month("january").unwrap();
    assert_eq!(listing.month, Month::January);
    assert_eq!(listing.manuals.len(), 1);
    assert_eq!(listing.manuals[0].id, created.id);
}

#[test]
fn manuals_for_month_rejects_unknown_month() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.manuals_for_month("jan").unwrap_err();
    assert!(matches!(err, ManualServiceError::Validation(_)));
}

#[test]
fn create_with_existing_id_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let input = NewManual {
        id: Some("jan_2026_01".to_string()),
        ..new_manual("Title", "January", 1)
    };
    service.create_manual(input.clone()).unwrap();

    let err = service.create_manual(input).unwrap_err();
    assert!(matches!(err, ManualServiceError::Validation(_)));
}

#[test]
fn update_applies_partial_fields_and_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create_manual(NewManual {
            theme: Some("Jesus, The Great Shepherd".to_string()),
            ..new_manual("Draft", "January", 1)
        })
        .unwrap();

    let updated = service
        .update_manual(
            &created.id,
            ManualPatch {
                title: Some("Final".to_string()),
                month: Some("February".to_string()),
                ..ManualPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.month, Month::February);
    assert_eq!(updated.theme.as_deref(), Some("Jesus, The Great Shepherd"));
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn update_with_explicit_null_clears_optional_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create_manual(NewManual {
            image_url: Some("/public/images/january/king.png".to_string()),
            conclusion: Some("We have entered in by the Door.".to_string()),
            ..new_manual("Door of the sheep", "January", 1)
        })
        .unwrap();

    let patch: ManualPatch = serde_json::from_str(r#"{"imageUrl": null}"#).unwrap();
    let updated = service.update_manual(&created.id, patch).unwrap();

    assert_eq!(updated.image_url, None);
    assert_eq!(
        updated.conclusion.as_deref(),
        Some("We have entered in by the Door.")
    );
    let stored = service.get_manual(&created.id).unwrap();
    assert_eq!(stored.image_url, None);
}

#[test]
fn update_rejects_invalid_month_and_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service.create_manual(new_manual("Title", "May", 1)).unwrap();

    let err = service
        .update_manual(
            &created.id,
            ManualPatch {
                month: Some("Mayday".to_string()),
                ..ManualPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ManualServiceError::Validation(_)));

    let err = service
        .update_manual(
            &created.id,
            ManualPatch {
                title: Some(String::new()),
                ..ManualPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ManualServiceError::Validation(_)));
}

#[test]
fn update_missing_manual_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .update_manual("missing", ManualPatch::default())
        .unwrap_err();
    assert!(matches!(err, ManualServiceError::NotFound(id) if id == "missing"));
}

#[test]
fn delete_returns_removed_manual_and_missing_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service.create_manual(new_manual("Title", "June", 1)).unwrap();

    let deleted = service.delete_manual(&created.id).unwrap();
    assert_eq!(deleted.id, created.id);

    let err = service.delete_manual(&created.id).unwrap_err();
    assert!(matches!(err, ManualServiceError::NotFound(_)));
    let err = service.get_manual(&created.id).unwrap_err();
    assert!(matches!(err, ManualServiceError::NotFound(_)));
}

#[test]
fn grouped_listing_has_all_months_and_total() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.create_manual(new_manual("a", "January", 2)).unwrap();
    service.create_manual(new_manual("b", "January", 1)).unwrap();
    service.create_manual(new_manual("c", "October", 1)).unwrap();

    let grouped = service.manuals_grouped_by_month().unwrap();
    assert_eq!(grouped.total, 3);
    assert_eq!(grouped.by_month.len(), 12);
    let january: Vec<&str> = grouped.by_month[&Month::January]
        .iter()
        .map(|manual| manual.title.as_str())
        .collect();
    assert_eq!(january, vec!["b", "a"]);
    assert!(grouped.by_month[&Month::July].is_empty());
    assert_eq!(
        grouped.by_month.keys().copied().collect::<Vec<_>>(),
        Month::ALL.to_vec()
    );
}

#[test]
fn clear_all_reports_deleted_count() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    for order in 1..=3 {
        service
            .create_manual(new_manual("t", "August", order))
            .unwrap();
    }

    assert_eq!(service.clear_all().unwrap(), 3);
    assert_eq!(service.count().unwrap(), 0);
    assert_eq!(service.clear_all().unwrap(), 0);
}

#[test]
fn set_image_url_targets_first_manual_with_month_and_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let first = service
        .create_manual(NewManual {
            id: Some("jan_first".to_string()),
            ..new_manual("one", "January", 1)
        })
        .unwrap();
    let second = service
        .create_manual(NewManual {
            id: Some("jan_second".to_string()),
            ..new_manual("two", "January", 1)
        })
        .unwrap();

    let updated = service
        .set_image_url(Month::January, 1, "/public/images/january/king.png")
        .unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(
        updated.image_url.as_deref(),
        Some("/public/images/january/king.png")
    );
    assert_eq!(service.get_manual(&second.id).unwrap().image_url, None);

    let err = service
        .set_image_url(Month::January, 9, "x.png")
        .unwrap_err();
    assert!(matches!(err, ManualServiceError::NotFound(_)));
}
