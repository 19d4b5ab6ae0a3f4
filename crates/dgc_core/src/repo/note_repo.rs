//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide key-value style persistence for device-local notes.
//!
//! # Invariants
//! - `put_note` inserts or fully replaces the row keyed by note id.
//! - Listing returns notes in creation order.

use crate::model::note::{Note, NoteId};
use crate::repo::manual_repo::{table_exists, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Storage interface for notes.
pub trait NoteRepository {
    /// Inserts the note, or replaces title/content/date when the id exists.
    fn put_note(&self, note: &Note) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "notes")? {
            return Err(RepoError::InvalidData(
                "notes table missing; open the database with open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn put_note(&self, note: &Note) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO notes (id, title, content, display_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                display_date = excluded.display_date;",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.date.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, display_date
             FROM notes
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, display_date
             FROM notes
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id")))?;
    Ok(Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        date: row.get("display_date")?,
    })
}
