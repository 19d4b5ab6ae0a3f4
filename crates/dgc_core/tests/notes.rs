use chrono::NaiveDate;
use dgc_core::db::open_db_in_memory;
use dgc_core::{NoteService, NoteServiceError, SqliteNoteRepository};
use uuid::Uuid;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
}

#[test]
fn autosave_without_id_skips_blank_titles() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let saved = service.autosave(None, "   ", "body only", today()).unwrap();
    assert!(saved.is_none());
    assert!(service.list_notes().unwrap().is_empty());
}

#[test]
fn autosave_creates_then_replaces_existing_note() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let created = service
        .autosave(None, "Sermon", "The door of the sheep", today())
        .unwrap()
        .unwrap();
    assert_eq!(created.date, "Jan 4, 2026");

    let later = NaiveDate::from_ymd_opt(2026, 1, 11).unwrap();
    let updated = service
        .autosave(Some(created.id), "Sermon notes", "• John 10:9", later)
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.date, "Jan 11, 2026");

    let notes = service.list_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Sermon notes");
    assert_eq!(notes[0].content, "• John 10:9");
}

#[test]
fn autosave_with_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let err = service
        .autosave(Some(Uuid::new_v4()), "Title", "", today())
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(_)));
}

#[test]
fn list_keeps_creation_order_and_delete_removes() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let first = service.autosave(None, "first", "", today()).unwrap().unwrap();
    let second = service.autosave(None, "second", "", today()).unwrap().unwrap();

    let titles: Vec<String> = service
        .list_notes()
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, vec!["first", "second"]);

    service.delete_note(first.id).unwrap();
    assert_eq!(service.get_note(second.id).unwrap().title, "second");
    let err = service.delete_note(first.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(id) if id == first.id));
}
